//! End-to-end backend flows against the in-memory engine.
//!
//! Exercises the public API only: index lifecycle, bulk indexing with
//! rejections, searches, hooks and lifecycle notifications.
//!
//! Run with: `cargo test --test backend_flow`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use search_bridge::hooks::{Hooks, IndexLifecycle, Pipeline};
use search_bridge::item::IndexItem;
use search_bridge::schema::{FieldDescriptor, FieldType, IndexDefinition, PropertyDescriptor};
use search_bridge::search::{ConditionGroup, Operator, QuerySpec, ResultSet, SortDirection};
use search_bridge::transport::InMemoryTransport;
use search_bridge::{BackendError, BridgeConfig, CompiledRequest, IndexState, Operation, SearchBackend};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct Notifications {
    created: AtomicUsize,
    reindex: AtomicUsize,
}

impl IndexLifecycle for Notifications {
    fn index_created(&self, _: &IndexDefinition) {
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn reindex_required(&self, _: &IndexDefinition) {
        self.reindex.fetch_add(1, Ordering::SeqCst);
    }
}

fn config() -> BridgeConfig {
    BridgeConfig {
        index_prefix: "test_".into(),
        ..Default::default()
    }
}

fn products() -> IndexDefinition {
    IndexDefinition::new("products")
        .field(FieldDescriptor::new("title", FieldType::Text).with_boost(3.0))
        .field(FieldDescriptor::new("sku", FieldType::Ngram))
        .field(FieldDescriptor::new("price", FieldType::Decimal))
        .field(FieldDescriptor::new("published", FieldType::Boolean))
}

fn product(id: &str, title: &str, price: f64) -> IndexItem {
    IndexItem::new(format!("entity:product/{id}:en"), "entity:product", "en")
        .field("title", FieldType::Text, vec![json!(title)])
        .field("sku", FieldType::Ngram, vec![json!(format!("SKU-{id}"))])
        .field("price", FieldType::Decimal, vec![json!(price)])
        .field("published", FieldType::Boolean, vec![json!(1)])
}

/// Route backend logs through the test harness. Set `RUST_LOG` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (Arc<InMemoryTransport>, Arc<Notifications>, SearchBackend) {
    init_tracing();
    let engine = Arc::new(InMemoryTransport::new());
    let notifications = Arc::new(Notifications::default());
    let backend = SearchBackend::with_transport(config(), engine.clone()).with_lifecycle(notifications.clone());
    (engine, notifications, backend)
}

// =============================================================================
// Index lifecycle
// =============================================================================

#[tokio::test]
async fn happy_index_lifecycle_uses_prefixed_name() {
    let (engine, notifications, backend) = setup();

    backend.update_index(&products()).await.unwrap();
    assert!(engine.has_index("test_products"));
    assert!(engine.is_open("test_products"));
    assert_eq!(backend.index_state(&products()), IndexState::Ready);
    assert_eq!(notifications.created.load(Ordering::SeqCst), 1);

    let properties = engine.properties("test_products").unwrap();
    assert_eq!(properties["id"], json!({"type": "keyword", "index": "true"}));
    assert_eq!(properties["sku"]["analyzer"], "ngram_analyzer");
    assert_eq!(properties["sku"]["fields"]["keyword"]["type"], "keyword");
    assert_eq!(properties["search_api_boost"]["type"], "rank_feature");

    let settings = engine.settings("test_products").unwrap();
    assert!(settings["analysis"]["analyzer"].get("ngram_analyzer").is_some());

    backend.remove_index(&products()).await.unwrap();
    assert!(!engine.has_index("test_products"));
    assert_eq!(backend.index_state(&products()), IndexState::Uninitialized);
}

#[tokio::test]
async fn happy_add_index_twice_keeps_existing_index() {
    let (engine, notifications, backend) = setup();
    backend.index_items(&products(), &[product("1", "Desk", 120.0)]).await.unwrap();

    backend.add_index(&products()).await.unwrap();
    backend.add_index(&products()).await.unwrap();

    assert_eq!(engine.document_count("test_products"), 1);
    assert_eq!(notifications.created.load(Ordering::SeqCst), 1);
    assert_eq!(backend.index_state(&products()), IndexState::Ready);
}

#[tokio::test]
async fn happy_adding_a_field_keeps_documents() {
    let (engine, notifications, backend) = setup();
    backend.index_items(&products(), &[product("1", "Desk", 120.0)]).await.unwrap();

    let grown = products().field(FieldDescriptor::new("colour", FieldType::String));
    backend.update_index(&grown).await.unwrap();

    assert_eq!(engine.document_count("test_products"), 1);
    assert_eq!(engine.properties("test_products").unwrap()["colour"]["type"], "keyword");
    assert_eq!(notifications.reindex.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn happy_changing_a_field_type_recreates_index() {
    let (engine, notifications, backend) = setup();
    backend.index_items(&products(), &[product("1", "Desk", 120.0)]).await.unwrap();

    let changed = IndexDefinition::new("products")
        .field(FieldDescriptor::new("title", FieldType::Text))
        .field(FieldDescriptor::new("sku", FieldType::String));
    backend.update_index(&changed).await.unwrap();

    assert_eq!(engine.document_count("test_products"), 0);
    assert_eq!(engine.properties("test_products").unwrap()["sku"]["type"], "keyword");
    assert_eq!(notifications.created.load(Ordering::SeqCst), 2);
    assert_eq!(notifications.reindex.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn happy_clear_index_drops_documents() {
    let (engine, _, backend) = setup();
    backend
        .index_items(&products(), &[product("1", "Desk", 120.0), product("2", "Chair", 45.0)])
        .await
        .unwrap();
    backend.clear_index(&products()).await.unwrap();
    assert!(engine.has_index("test_products"));
    assert_eq!(engine.document_count("test_products"), 0);
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn happy_documents_carry_synthetic_fields() {
    let (engine, _, backend) = setup();
    let ids = backend
        .index_items(&products(), &[product("1", "Desk", 120.0).with_boost(0.0)])
        .await
        .unwrap();
    assert_eq!(ids, vec!["entity:product/1:en"]);

    let doc = engine.document("test_products", "entity:product/1:en").unwrap();
    assert_eq!(doc["published"], json!([true]));
    assert_eq!(doc["search_api_id"], json!(["entity:product/1:en"]));
    assert_eq!(doc["search_api_datasource"], json!(["entity:product"]));
    assert_eq!(doc["search_api_language"], json!(["en"]));
    assert_eq!(doc["search_api_boost"], json!([0.1]));
}

#[tokio::test]
async fn failure_rejected_items_are_reported_individually() {
    let (engine, _, backend) = setup();
    engine.reject_document("entity:product/2:en");

    let err = backend
        .index_items(&products(), &[product("1", "Desk", 120.0), product("2", "Chair", 45.0)])
        .await
        .unwrap_err();

    let BackendError::BulkFailures { failures, submitted, index, .. } = &err else {
        panic!("expected bulk failures, got {err}");
    };
    assert_eq!(index, "test_products");
    assert_eq!(submitted.len(), 2);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].id, "entity:product/2:en");
    assert_eq!(err.to_string(), "1 of 2 items failed indexing items in index test_products");
    assert_eq!(engine.document_count("test_products"), 1);
}

#[tokio::test]
async fn failure_engine_down_names_operation_and_index() {
    let (engine, _, backend) = setup();
    engine.set_available(false);

    let err = backend.index_items(&products(), &[product("1", "Desk", 1.0)]).await.unwrap_err();
    assert_eq!(err.operation(), Operation::CheckExists);
    assert_eq!(err.index(), "test_products");
    assert!(!backend.is_available().await);
}

#[tokio::test]
async fn happy_delete_items() {
    let (engine, _, backend) = setup();
    backend
        .index_items(&products(), &[product("1", "Desk", 120.0), product("2", "Chair", 45.0)])
        .await
        .unwrap();
    backend
        .delete_items(&products(), &["entity:product/1:en".to_string()])
        .await
        .unwrap();
    assert_eq!(engine.document_count("test_products"), 1);
    assert!(engine.document("test_products", "entity:product/2:en").is_some());
}

// =============================================================================
// Searching
// =============================================================================

#[tokio::test]
async fn happy_search_returns_items_and_total() {
    let (_, _, backend) = setup();
    backend
        .index_items(&products(), &[product("1", "Desk", 120.0), product("2", "Chair", 45.0)])
        .await
        .unwrap();

    let result = backend.search(&products(), &QuerySpec::new()).await.unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.items[0].id, "entity:product/1:en");
    assert_eq!(result.items[0].fields["title"], vec![json!("Desk")]);
}

#[tokio::test]
async fn happy_compiled_search_body() {
    let (_, _, backend) = setup();
    let query = QuerySpec::new()
        .keys(["desk"])
        .condition("price", json!([10, 200]), Operator::Between)
        .group(
            ConditionGroup::or()
                .condition("published", json!(true), Operator::Eq)
                .condition("sku", Value::Null, Operator::NotEq),
        )
        .sort("title", SortDirection::Desc)
        .sort("search_api_relevance", SortDirection::Desc)
        .language("en")
        .range(20, 5);

    let request = backend.compiler().compile_search_params(&products(), &query);
    assert_eq!(request.index, "test_products");

    let body = &request.body;
    assert_eq!(body["from"], 20);
    assert_eq!(body["size"], 5);
    assert_eq!(body["sort"], json!([{"title.keyword": "desc"}, {"_score": "desc"}]));

    let fulltext = &body["query"]["bool"]["must"][0]["multi_match"];
    assert_eq!(fulltext["query"], "desk");
    assert_eq!(fulltext["fields"], json!(["title^3", "sku"]));

    let filters = &body["query"]["bool"]["filter"][0]["bool"]["must"];
    assert_eq!(
        filters[0],
        json!({"range": {"price": {"from": 10, "to": 200, "include_lower": false, "include_upper": false}}})
    );
    assert_eq!(
        filters[1],
        json!({"bool": {"should": [{"term": {"published": true}}, {"exists": {"field": "sku"}}], "minimum_should_match": 1}})
    );
    assert_eq!(filters[2], json!({"terms": {"search_api_language": ["en"]}}));
}

#[tokio::test]
async fn happy_search_on_missing_index_is_empty() {
    let (engine, _, backend) = setup();
    let result = backend.search(&products(), &QuerySpec::new().keys(["desk"])).await.unwrap();
    assert_eq!(result.total, 0);
    assert!(!engine.has_index("test_products"));
}

// =============================================================================
// Hooks
// =============================================================================

#[tokio::test]
async fn happy_hooks_rewrite_every_artifact() {
    init_tracing();
    let engine = Arc::new(InMemoryTransport::new());
    let hooks = Hooks {
        field_mapping: Pipeline::new().stage(|field: &FieldDescriptor, mut property: PropertyDescriptor| {
            if field.id == "title" {
                property.insert("copy_to".into(), json!("all_text"));
            }
            property
        }),
        settings: Pipeline::new().stage(|_: &BridgeConfig, mut settings: Value| {
            settings["refresh_interval"] = json!("5s");
            settings
        }),
        search_params: Pipeline::new().stage(|_: &QuerySpec, mut request: CompiledRequest| {
            request.body["track_scores"] = json!(true);
            request
        }),
        results: Pipeline::new().stage(|_: &QuerySpec, mut result: ResultSet| {
            result.items.retain(|item| item.id != "hidden");
            result
        }),
        ..Default::default()
    };
    let backend = SearchBackend::with_transport(config(), engine.clone()).with_hooks(hooks);

    backend
        .index_items(&products(), &[product("1", "Desk", 1.0), IndexItem::new("hidden", "entity:product", "en")])
        .await
        .unwrap();

    let properties: Map<String, Value> = engine.properties("test_products").unwrap();
    assert_eq!(properties["title"]["copy_to"], "all_text");
    assert_eq!(engine.settings("test_products").unwrap()["refresh_interval"], "5s");

    let request = backend.compiler().compile_search_params(&products(), &QuerySpec::new());
    assert_eq!(request.body["track_scores"], true);

    let result = backend.search(&products(), &QuerySpec::new()).await.unwrap();
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn happy_synonyms_reach_engine_settings() {
    init_tracing();
    let engine = Arc::new(InMemoryTransport::new());
    let config = BridgeConfig {
        synonyms: vec!["sofa, couch".into(), "   ".into()],
        ..config()
    };
    let backend = SearchBackend::with_transport(config, engine.clone());
    backend.add_index(&products()).await.unwrap();

    let settings = engine.settings("test_products").unwrap();
    assert_eq!(settings["analysis"]["filter"]["synonyms"]["type"], "synonym_graph");
    assert_eq!(settings["analysis"]["filter"]["synonyms"]["synonyms"], json!(["sofa, couch"]));
    assert_eq!(
        settings["analysis"]["analyzer"]["default"]["filter"],
        json!(["lowercase", "asciifolding", "synonyms"])
    );
}

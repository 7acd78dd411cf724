//! Property-based tests (fuzzing) for the request compiler.
//!
//! Uses proptest to generate random queries, index definitions and engine
//! responses and verify the compiler never panics and keeps its shape
//! guarantees.
//!
//! Run with: `cargo test --test proptest_fuzz`

use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use search_bridge::schema::{needs_full_clear, FieldDescriptor, FieldType, IndexDefinition};
use search_bridge::search::{
    compile_condition, compile_facets, parse_facets, parse_response, parse_spellcheck, Condition, FacetRequest,
    Operator, QuerySpec, DEFAULT_FACET_SIZE, UNLIMITED_FACET_SIZE,
};
use search_bridge::{BridgeConfig, RequestCompiler};

// =============================================================================
// Strategies for generating test data
// =============================================================================

fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::Text),
        Just(FieldType::String),
        Just(FieldType::Integer),
        Just(FieldType::Decimal),
        Just(FieldType::Date),
        Just(FieldType::Boolean),
        Just(FieldType::Ngram),
        Just(FieldType::EdgeNgram),
    ]
}

fn index_strategy() -> impl Strategy<Value = IndexDefinition> {
    prop::collection::vec(("[a-z]{1,8}", field_type_strategy()), 0..8).prop_map(|fields| {
        fields
            .into_iter()
            .fold(IndexDefinition::new("fuzz"), |index, (id, field_type)| {
                index.field(FieldDescriptor::new(id, field_type))
            })
    })
}

/// Generate arbitrary JSON values (including invalid structures)
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,   // depth
        64,  // max nodes
        10,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..10).prop_map(Value::Array),
                prop::collection::hash_map(".*", inner, 0..10)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

fn suggest_response(options: &[(String, f64, u64)]) -> Value {
    let options: Vec<Value> = options
        .iter()
        .map(|(text, score, freq)| json!({"text": text, "score": score, "freq": freq}))
        .collect();
    json!({"spellcheck": [{"text": "typo", "options": options}]})
}

/// Answer compiled aggregations the way the engine does: terms aggregations
/// get `buckets`, global containers keep their nested aggregation names.
fn engine_aggregations(compiled: &Map<String, Value>, buckets: &[Value]) -> Value {
    let answered: Map<String, Value> = compiled
        .iter()
        .map(|(name, aggregation)| {
            let answer = if aggregation.get("global").is_some() {
                let inner = aggregation
                    .get("aggs")
                    .and_then(Value::as_object)
                    .map(|nested| engine_aggregations(nested, buckets))
                    .unwrap_or_else(|| json!({}));
                let mut answer = inner.as_object().cloned().unwrap_or_default();
                answer.insert("doc_count".into(), json!(buckets.len()));
                Value::Object(answer)
            } else {
                json!({"buckets": buckets})
            };
            (name.clone(), answer)
        })
        .collect();
    Value::Object(answered)
}

fn string_fields() -> IndexMap<String, FieldDescriptor> {
    IndexDefinition::new("fuzz")
        .field(FieldDescriptor::new("tags", FieldType::String))
        .query_fields()
}

// =============================================================================
// Robustness
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn fuzz_parse_response_never_panics(response in arbitrary_json_strategy()) {
        let query = QuerySpec::new().facet("tags", FacetRequest::and("tags"));
        let _ = parse_response(&query, response, &string_fields());
    }

    #[test]
    fn fuzz_condition_values_never_panic(value in arbitrary_json_strategy(), op in 0usize..10) {
        let operators = [
            Operator::Eq, Operator::NotEq, Operator::Gt, Operator::Gte, Operator::Lt,
            Operator::Lte, Operator::In, Operator::NotIn, Operator::Between, Operator::NotBetween,
        ];
        let condition = Condition::new("tags", value, operators[op]);
        let _ = compile_condition(&condition, &string_fields());
    }

    #[test]
    fn fuzz_compile_search_for_random_index(index in index_strategy(), keys in prop::collection::vec("[a-z]{1,6}", 0..4)) {
        let compiler = RequestCompiler::new(BridgeConfig::default());
        let mut query = QuerySpec::new().keys(keys.clone());
        for field in index.fields.keys() {
            query = query.facet(field.clone(), FacetRequest::or(field.clone()));
        }
        let request = compiler.compile_search_params(&index, &query);
        prop_assert!(request.body.get("from").is_some());
        prop_assert!(request.body.get("size").is_some());
        prop_assert!(request.body.get("query").is_some());
    }
}

// =============================================================================
// Filter semantics
// =============================================================================

proptest! {
    #[test]
    fn prop_null_equality_is_existence(field in "[a-z]{1,8}") {
        let fields = IndexDefinition::new("fuzz")
            .field(FieldDescriptor::new(field.clone(), FieldType::String))
            .query_fields();

        let eq = compile_condition(&Condition::new(field.clone(), Value::Null, Operator::Eq), &fields);
        prop_assert_eq!(eq, Some(json!({"bool": {"must_not": {"exists": {"field": field.clone()}}}})));

        let ne = compile_condition(&Condition::new(field.clone(), Value::Null, Operator::NotEq), &fields);
        prop_assert_eq!(ne, Some(json!({"exists": {"field": field}})));
    }

    #[test]
    fn prop_unknown_field_is_skipped(field in "[A-Z]{1,8}", value in any::<i64>()) {
        let condition = Condition::new(field, json!(value), Operator::Eq);
        prop_assert_eq!(compile_condition(&condition, &string_fields()), None);
    }
}

// =============================================================================
// Facets
// =============================================================================

proptest! {
    #[test]
    fn prop_facet_size_rules(limit in prop::option::of(0usize..500)) {
        let mut facet = FacetRequest::and("tags");
        if let Some(limit) = limit {
            facet = facet.limit(limit);
        }
        let mut facets = IndexMap::new();
        facets.insert("tags".to_string(), facet);

        let aggs = compile_facets(&facets, &string_fields());
        let terms = &aggs["tags"]["terms"];
        prop_assert_eq!(terms["field"].as_str(), Some("tags"));

        let size = terms.get("size").and_then(Value::as_u64);
        match limit {
            None => prop_assert_eq!(size, None),
            Some(0) => prop_assert_eq!(size, Some(UNLIMITED_FACET_SIZE as u64)),
            Some(n) if n == DEFAULT_FACET_SIZE => prop_assert_eq!(size, None),
            Some(n) => prop_assert_eq!(size, Some(n as u64)),
        }
    }

    #[test]
    fn prop_facet_buckets_round_trip(buckets in prop::collection::vec(("[a-z]{1,8}", 0u64..1000), 0..20), or in any::<bool>()) {
        let facet = if or { FacetRequest::or("tags") } else { FacetRequest::and("tags") };
        let mut facets = IndexMap::new();
        facets.insert("tags".to_string(), facet);

        let compiled = compile_facets(&facets, &string_fields());
        let expected_key = if or { "tags_global" } else { "tags" };
        prop_assert_eq!(compiled.keys().map(String::as_str).collect::<Vec<_>>(), vec![expected_key]);

        let terms: Vec<Value> = buckets.iter().map(|(key, count)| json!({"key": key, "doc_count": count})).collect();
        let aggregations = engine_aggregations(&compiled, &terms);

        let parsed = parse_facets(&facets, &aggregations, &string_fields());
        let values = &parsed["tags"];
        prop_assert_eq!(values.len(), buckets.len());
        for (value, (key, count)) in values.iter().zip(&buckets) {
            prop_assert_eq!(value.count, *count);
            prop_assert_eq!(&value.filter, &format!("\"{key}\""));
        }
    }
}

// =============================================================================
// Spellcheck
// =============================================================================

proptest! {
    #[test]
    fn prop_spellcheck_is_order_invariant(
        mut options in prop::collection::vec(("[a-z]{1,6}", 0u32..100, 0u64..50), 0..12),
        count in prop::option::of(1usize..6),
    ) {
        let options: Vec<(String, f64, u64)> = options
            .drain(..)
            .map(|(text, score, freq)| (text, f64::from(score) / 100.0, freq))
            .collect();
        let mut reversed = options.clone();
        reversed.reverse();

        let forward = parse_spellcheck(&suggest_response(&options), count);
        let backward = parse_spellcheck(&suggest_response(&reversed), count);

        let forward_words = forward.get("typo").cloned().unwrap_or_default();
        let backward_words = backward.get("typo").cloned().unwrap_or_default();

        // Ties on score and frequency may order either way; the set is fixed
        let mut a = forward_words.clone();
        let mut b = backward_words.clone();
        a.sort();
        b.sort();
        if options.iter().all(|(t, s, f)| options.iter().filter(|(_, s2, f2)| s2 == s && f2 == f).all(|(t2, _, _)| t2 == t)) {
            prop_assert_eq!(&forward_words, &backward_words);
        }
        if count.is_none() {
            prop_assert_eq!(a, b);
        }

        let mut unique = forward_words.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), forward_words.len());
        if let Some(count) = count {
            prop_assert!(forward_words.len() <= count);
        }
    }
}

// =============================================================================
// Mapping diff
// =============================================================================

proptest! {
    #[test]
    fn prop_new_field_never_clears(index in index_strategy(), extra in "[A-Z]{1,8}", extra_type in field_type_strategy()) {
        let compiler = RequestCompiler::new(BridgeConfig::default());
        let live = compiler.properties(&index);
        let grown = index.clone().field(FieldDescriptor::new(extra, extra_type));
        let desired = compiler.properties(&grown);

        prop_assert!(!needs_full_clear(&desired, Some(&live)));
        prop_assert!(!needs_full_clear(&desired, None));
    }

    #[test]
    fn prop_type_change_clears(field in "[a-z]{1,8}") {
        let compiler = RequestCompiler::new(BridgeConfig::default());
        let before = IndexDefinition::new("fuzz").field(FieldDescriptor::new(field.clone(), FieldType::Integer));
        let after = IndexDefinition::new("fuzz").field(FieldDescriptor::new(field, FieldType::String));

        let live: Map<String, Value> = compiler.properties(&before);
        prop_assert!(needs_full_clear(&compiler.properties(&after), Some(&live)));
    }
}

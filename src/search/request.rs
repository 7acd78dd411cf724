//! Search body assembly.
//!
//! ```text
//! {
//!   "from": offset, "size": limit,
//!   "sort": [...],
//!   "query": {"bool": {"must": [fulltext, mlt], "filter": [root group]}} | {"match_all": {}},
//!   "aggs": {...},
//!   "suggest": {...},
//!   "_source": {"excludes": [...]}
//! }
//! ```

use serde_json::{json, Map, Value};

use crate::config::BridgeConfig;
use crate::schema::{IndexDefinition, SEARCH_API_LANGUAGE};

use super::facet::compile_facets;
use super::filter::compile_group;
use super::fulltext::{compile_fulltext, searched_fields};
use super::more_like_this::{compile_more_like_this, ItemIdResolver};
use super::query::{ConditionGroup, ConditionValue, Conjunction, Operator, QuerySpec};
use super::sort::compile_sorts;
use super::spellcheck::compile_spellcheck;

/// Offset used when the query sets none.
pub const DEFAULT_OFFSET: usize = 0;
/// Page size used when the query sets none.
pub const DEFAULT_LIMIT: usize = 10;

/// Root filter group with the language restriction applied.
///
/// The query's own group is left untouched.
pub fn effective_filter(query: &QuerySpec) -> ConditionGroup {
    if query.languages.is_empty() {
        return query.filter.clone();
    }

    let languages = ConditionValue::List(query.languages.iter().map(|l| json!(l)).collect());
    match query.filter.conjunction {
        Conjunction::And if !query.filter.negated => {
            query
                .filter
                .clone()
                .condition(SEARCH_API_LANGUAGE, languages, Operator::In)
        }
        _ => ConditionGroup::and()
            .group(query.filter.clone())
            .condition(SEARCH_API_LANGUAGE, languages, Operator::In),
    }
}

/// Build the search request body for `query` against `index`.
pub fn build_search_body(
    query: &QuerySpec,
    index: &IndexDefinition,
    config: &BridgeConfig,
    resolver: &dyn ItemIdResolver,
) -> Value {
    let fields = index.query_fields();
    let searched = searched_fields(query, index);
    let mut body = Map::new();

    body.insert("from".into(), json!(query.offset.unwrap_or(DEFAULT_OFFSET)));
    body.insert("size".into(), json!(query.limit.unwrap_or(DEFAULT_LIMIT)));

    let sorts = compile_sorts(query, &fields);
    if !sorts.is_empty() {
        body.insert("sort".into(), Value::Array(sorts));
    }

    let filter = compile_group(&effective_filter(query), &fields);

    let mut must: Vec<Value> = Vec::new();
    if let Some(fulltext) = compile_fulltext(query, &searched, &fields, config.fuzziness()) {
        must.push(fulltext);
    }
    if let Some(mlt) = query
        .more_like_this
        .as_ref()
        .and_then(|options| compile_more_like_this(options, &query.languages, index, resolver))
    {
        must.push(mlt);
    }

    let query_clause = if must.is_empty() && filter.is_none() {
        json!({"match_all": {}})
    } else {
        let mut bool_clause = Map::new();
        if !must.is_empty() {
            bool_clause.insert("must".into(), Value::Array(must));
        }
        if let Some(filter) = filter {
            bool_clause.insert("filter".into(), json!([filter]));
        }
        json!({"bool": bool_clause})
    };
    body.insert("query".into(), query_clause);

    let aggs = compile_facets(&query.facets, &fields);
    if !aggs.is_empty() {
        body.insert("aggs".into(), Value::Object(aggs));
    }

    if let Some(options) = &query.spellcheck {
        let suggest = compile_spellcheck(options, &searched);
        if !suggest.is_empty() {
            body.insert("suggest".into(), Value::Object(suggest));
        }
    }

    if !query.excluded_source_fields.is_empty() {
        body.insert(
            "_source".into(),
            json!({"excludes": query.excluded_source_fields}),
        );
    }

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Datasource, FieldDescriptor, FieldType};
    use crate::search::more_like_this::CombinedIdResolver;
    use crate::search::query::{FacetRequest, MoreLikeThisOptions, SortDirection, SpellcheckOptions};

    fn index() -> IndexDefinition {
        IndexDefinition::new("content")
            .field(FieldDescriptor::new("title", FieldType::Text))
            .field(FieldDescriptor::new("status", FieldType::Boolean))
            .field(FieldDescriptor::new("tags", FieldType::String))
            .datasource(Datasource::entity("entity:node", "node"))
    }

    fn build(query: &QuerySpec) -> Value {
        build_search_body(query, &index(), &BridgeConfig::default(), &CombinedIdResolver)
    }

    #[test]
    fn test_empty_query_is_match_all() {
        assert_eq!(
            build(&QuerySpec::new()),
            json!({"from": 0, "size": 10, "query": {"match_all": {}}})
        );
    }

    #[test]
    fn test_filters_only() {
        let body = build(&QuerySpec::new().condition("status", json!(true), Operator::Eq).range(5, 20));
        assert_eq!(body["from"], 5);
        assert_eq!(body["size"], 20);
        assert_eq!(
            body["query"],
            json!({"bool": {"filter": [{"bool": {"must": [{"term": {"status": true}}]}}]}})
        );
    }

    #[test]
    fn test_keys_filters_facets_suggest_in_order() {
        let query = QuerySpec::new()
            .keys(["hello"])
            .condition("status", json!(true), Operator::Eq)
            .sort("title", SortDirection::Asc)
            .facet("tags", FacetRequest::or("tags"))
            .spellcheck(SpellcheckOptions { keys: vec!["hello".into()], count: Some(2) })
            .exclude_source_field("body");
        let body = build(&query);

        let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["from", "size", "sort", "query", "aggs", "suggest", "_source"]);
        assert_eq!(body["sort"], json!([{"title.keyword": "asc"}]));
        assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["query"], "hello");
        assert!(body["query"]["bool"]["filter"].is_array());
        assert!(body["aggs"].get("tags_global").is_some());
        assert_eq!(body["suggest"]["title"]["term"]["size"], 2);
        assert_eq!(body["_source"], json!({"excludes": ["body"]}));
    }

    #[test]
    fn test_languages_added_to_copy_of_root_group() {
        let query = QuerySpec::new()
            .condition("status", json!(true), Operator::Eq)
            .language("en")
            .language("de");
        let body = build(&query);
        assert_eq!(
            body["query"]["bool"]["filter"][0],
            json!({"bool": {"must": [
                {"term": {"status": true}},
                {"terms": {"search_api_language": ["en", "de"]}}
            ]}})
        );
        assert_eq!(query.filter.children.len(), 1);
    }

    #[test]
    fn test_languages_with_or_root_keep_or_semantics() {
        let query = QuerySpec::new()
            .filter(
                ConditionGroup::or()
                    .condition("tags", json!("a"), Operator::Eq)
                    .condition("tags", json!("b"), Operator::Eq),
            )
            .language("en");
        let filter = effective_filter(&query);
        assert_eq!(filter.conjunction, Conjunction::And);
        assert_eq!(filter.children.len(), 2);
    }

    #[test]
    fn test_mlt_appended_to_must() {
        let query = QuerySpec::new().more_like_this(MoreLikeThisOptions::new("3", vec!["title".into()]));
        let body = build(&query);
        assert_eq!(
            body["query"]["bool"]["must"][0]["more_like_this"]["like"],
            json!([{"_id": "entity:node/3"}])
        );
    }

    #[test]
    fn test_mlt_seed_is_language_qualified() {
        let query = QuerySpec::new()
            .language("en")
            .more_like_this(MoreLikeThisOptions::new("3", vec!["title".into()]));
        let body = build(&query);
        assert_eq!(
            body["query"]["bool"]["must"][0]["more_like_this"]["like"],
            json!([{"_id": "entity:node/3:en"}])
        );
    }

    #[test]
    fn test_incomplete_mlt_degrades_to_match_all() {
        let query = QuerySpec::new().more_like_this(MoreLikeThisOptions::default());
        assert_eq!(build(&query)["query"], json!({"match_all": {}}));
    }
}

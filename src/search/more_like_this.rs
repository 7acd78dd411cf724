//! More-like-this clause.

use serde_json::{json, Value};
use tracing::warn;

use crate::metrics;
use crate::schema::{Datasource, IndexDefinition};

use super::query::MoreLikeThisOptions;

/// Resolves a seed identifier to the combined item id a datasource indexes
/// it under.
pub trait ItemIdResolver: Send + Sync {
    /// `None` when the seed cannot be resolved for this datasource.
    ///
    /// `language` is one of the query's languages, or `None` when the query
    /// is not restricted to any.
    fn combined_id(&self, datasource: &Datasource, seed: &str, language: Option<&str>) -> Option<String>;
}

/// `"<datasource>/<seed>:<language>"` for entity-backed datasources,
/// matching the ids items are indexed under.
///
/// Without a language the id is `"<datasource>/<seed>"`, which only matches
/// hosts that index unqualified ids. Hosts that need the seed's own language
/// in that case supply their own resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct CombinedIdResolver;

impl ItemIdResolver for CombinedIdResolver {
    fn combined_id(&self, datasource: &Datasource, seed: &str, language: Option<&str>) -> Option<String> {
        Some(match language {
            Some(language) => format!("{}/{}:{}", datasource.id, seed, language),
            None => format!("{}/{}", datasource.id, seed),
        })
    }
}

/// Build a `more_like_this` clause.
///
/// Entity datasources get one `like` entry per language in `languages`.
/// Returns `None` (after logging the missing keys) unless both `id` and
/// `fields` are present.
pub fn compile_more_like_this(
    options: &MoreLikeThisOptions,
    languages: &[String],
    index: &IndexDefinition,
    resolver: &dyn ItemIdResolver,
) -> Option<Value> {
    let (id, fields) = match (&options.id, &options.fields) {
        (Some(id), Some(fields)) => (id, fields),
        (id, fields) => {
            let missing: Vec<&str> = [("id", id.is_none()), ("fields", fields.is_none())]
                .into_iter()
                .filter_map(|(key, missing)| missing.then_some(key))
                .collect();
            warn!(keys = %missing.join(","), "Missing required more-like-this keys");
            metrics::record_validation_warning("mlt_missing_keys");
            return None;
        }
    };

    let languages: Vec<Option<&str>> = if languages.is_empty() {
        vec![None]
    } else {
        languages.iter().map(|l| Some(l.as_str())).collect()
    };

    let mut like: Vec<Value> = Vec::new();
    for datasource in &index.datasources {
        if datasource.entity_type.is_none() {
            like.push(json!({"_id": id}));
            continue;
        }
        for language in &languages {
            let resolved = resolver.combined_id(datasource, id, *language).unwrap_or_else(|| {
                warn!(datasource = %datasource.id, seed = %id, "Could not resolve seed item, using raw id");
                id.clone()
            });
            let entry = json!({"_id": resolved});
            if !like.contains(&entry) {
                like.push(entry);
            }
        }
    }

    Some(json!({
        "more_like_this": {
            "like": like,
            "fields": fields,
            "max_query_terms": 1,
            "min_doc_freq": 1,
            "min_term_freq": 1
        }
    }))
}

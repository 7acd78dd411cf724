//! Spellcheck: term suggesters out, ranked corrections back in.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use super::query::SpellcheckOptions;

/// Build the `suggest` object: one term suggester per full-text field.
///
/// Nothing is built unless both keys and a count are given.
pub fn compile_spellcheck(options: &SpellcheckOptions, fulltext_fields: &[String]) -> Map<String, Value> {
    let mut suggest = Map::new();
    let Some(count) = options.count else {
        return suggest;
    };
    if options.keys.is_empty() {
        return suggest;
    }

    let text = options.keys.join(" ");
    for field in fulltext_fields {
        suggest.insert(
            field.clone(),
            json!({
                "text": text,
                "term": {"field": field, "size": count}
            }),
        );
    }
    suggest
}

#[derive(Debug, Clone)]
struct Candidate {
    text: String,
    score: f64,
    freq: u64,
}

/// Parse a `suggest` response object.
///
/// Suggestions for the same input term are merged across fields, ordered by
/// score then frequency (both descending), deduplicated and truncated to
/// `count` when given.
pub fn parse_spellcheck(suggest: &Value, count: Option<usize>) -> IndexMap<String, Vec<String>> {
    let mut candidates: IndexMap<String, Vec<Candidate>> = IndexMap::new();

    let per_field = suggest.as_object().into_iter().flat_map(|m| m.values());
    for entries in per_field.filter_map(Value::as_array) {
        for entry in entries {
            let Some(term) = entry.get("text").and_then(Value::as_str) else {
                continue;
            };
            let bucket = candidates.entry(term.to_string()).or_default();
            let options = entry.get("options").and_then(Value::as_array);
            for option in options.into_iter().flatten() {
                let Some(text) = option.get("text").and_then(Value::as_str) else {
                    continue;
                };
                bucket.push(Candidate {
                    text: text.to_string(),
                    score: option.get("score").and_then(Value::as_f64).unwrap_or(0.0),
                    freq: option.get("freq").and_then(Value::as_u64).unwrap_or(0),
                });
            }
        }
    }

    candidates
        .into_iter()
        .map(|(term, mut list)| {
            list.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| b.freq.cmp(&a.freq))
            });
            let mut suggestions: Vec<String> = Vec::with_capacity(list.len());
            for candidate in list {
                if !suggestions.contains(&candidate.text) {
                    suggestions.push(candidate.text);
                }
            }
            if let Some(count) = count {
                suggestions.truncate(count);
            }
            (term, suggestions)
        })
        .collect()
}

//! Analysis settings for the analyzers the field mapper references.

use serde_json::{json, Map, Value};

use crate::config::BridgeConfig;

/// Custom analyzers the bridge knows how to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyser {
    Ngram,
    EdgeNgram,
}

impl Analyser {
    /// Look up an analyzer by the name used in a property descriptor.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "ngram_analyzer" => Some(Self::Ngram),
            "edge_ngram_analyzer" => Some(Self::EdgeNgram),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Ngram => "ngram_analyzer",
            Self::EdgeNgram => "edge_ngram_analyzer",
        }
    }

    fn filter_id(self) -> &'static str {
        match self {
            Self::Ngram => "ngram_filter",
            Self::EdgeNgram => "edge_ngram_filter",
        }
    }

    fn filter_type(self) -> &'static str {
        match self {
            Self::Ngram => "ngram",
            Self::EdgeNgram => "edge_ngram",
        }
    }

    /// Index settings fragment defining this analyzer and its token filter.
    pub fn settings(self) -> Value {
        json!({
            "analysis": {
                "filter": {
                    self.filter_id(): {
                        "type": self.filter_type(),
                        "min_gram": 1,
                        "max_gram": 20
                    }
                },
                "analyzer": {
                    self.id(): {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "asciifolding", self.filter_id()]
                    }
                }
            }
        })
    }
}

/// Recursively merge `source` into `target`. Objects merge key by key,
/// anything else in `source` replaces what `target` held.
pub fn merge_deep(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_deep(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Index settings for a mapping `properties` object.
///
/// Every analyzer referenced by a property contributes its analysis
/// settings once; `max_ngram_diff` is always set.
pub fn index_settings(properties: &Map<String, Value>, config: &BridgeConfig) -> Value {
    let mut settings = Value::Object(Map::new());
    let mut seen: Vec<Analyser> = Vec::new();

    for property in properties.values() {
        let Some(analyser) = property
            .get("analyzer")
            .and_then(Value::as_str)
            .and_then(Analyser::from_id)
        else {
            continue;
        };
        if seen.contains(&analyser) {
            continue;
        }
        seen.push(analyser);
        merge_deep(&mut settings, analyser.settings());
    }

    merge_deep(&mut settings, json!({"max_ngram_diff": config.max_ngram_diff}));
    settings
}

/// Settings stage adding a synonym filter and a synonym-aware default
/// analyzer when synonyms are configured.
pub fn synonyms_stage(config: &BridgeConfig, mut settings: Value) -> Value {
    let synonyms: Vec<&str> = config
        .synonyms
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();
    if synonyms.is_empty() {
        return settings;
    }

    merge_deep(
        &mut settings,
        json!({
            "analysis": {
                "filter": {
                    "synonyms": {
                        "type": "synonym_graph",
                        "lenient": true,
                        "synonyms": synonyms
                    }
                },
                "analyzer": {
                    "default": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "asciifolding", "synonyms"]
                    }
                }
            }
        }),
    );
    settings
}

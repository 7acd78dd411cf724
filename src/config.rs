//! Configuration for the search bridge.
//!
//! # Example
//!
//! ```
//! use search_bridge::BridgeConfig;
//!
//! // Minimal config (uses defaults)
//! let config = BridgeConfig::default();
//! assert_eq!(config.url, "http://localhost:9200");
//! assert_eq!(config.index_name("articles"), "articles");
//!
//! // Shared cluster with a per-environment prefix
//! let config = BridgeConfig {
//!     index_prefix: "staging_".into(),
//!     fuzziness: "2".into(),
//!     ..Default::default()
//! };
//! assert_eq!(config.index_name("articles"), "staging_articles");
//! ```

use serde::Deserialize;

/// Configuration for the search bridge.
///
/// All fields have sensible defaults. At minimum, you should configure
/// `url` for anything other than a local engine.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Engine base URL (e.g., "https://search.internal:9200")
    #[serde(default = "default_url")]
    pub url: String,

    /// Prepended to every index id to form the engine index name
    #[serde(default)]
    pub index_prefix: String,

    /// Full-text fuzziness: "auto", "0" (disabled) or an edit distance "1".."5"
    #[serde(default = "default_fuzziness")]
    pub fuzziness: String,

    /// Synonym lines in Solr synonyms.txt format
    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Maximum allowed difference between min_gram and max_gram
    #[serde(default = "default_max_ngram_diff")]
    pub max_ngram_diff: u32,

    /// Per-request timeout for the HTTP transport
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_url() -> String { "http://localhost:9200".to_string() }
fn default_fuzziness() -> String { "auto".to_string() }
fn default_max_ngram_diff() -> u32 { 1 }
fn default_request_timeout_secs() -> u64 { 30 }

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index_prefix: String::new(),
            fuzziness: default_fuzziness(),
            synonyms: Vec::new(),
            max_ngram_diff: default_max_ngram_diff(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BridgeConfig {
    /// Engine index name for an index id.
    #[must_use]
    pub fn index_name(&self, index_id: &str) -> String {
        format!("{}{}", self.index_prefix, index_id)
    }

    /// Fuzziness value for full-text clauses, `None` when disabled.
    #[must_use]
    pub fn fuzziness(&self) -> Option<&str> {
        match self.fuzziness.trim() {
            "" | "0" => None,
            other => Some(other),
        }
    }
}

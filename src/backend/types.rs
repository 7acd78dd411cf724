//! Public types for the search backend.

/// Per-index lifecycle state.
///
/// ```text
/// Uninitialized → SchemaVerified → Ready
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexState {
    /// Not seen on the engine yet (or removed)
    #[default]
    Uninitialized,
    /// Existence checked, settings and mapping not yet confirmed
    SchemaVerified,
    /// Settings and mapping applied, accepting items and searches
    Ready,
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::SchemaVerified => write!(f, "SchemaVerified"),
            Self::Ready => write!(f, "Ready"),
        }
    }
}

/// Features the backend supports on top of plain searching.
pub const SUPPORTED_FEATURES: [&str; 4] = [
    "search_api_facets",
    "search_api_facets_operator_or",
    "search_api_mlt",
    "search_api_spellcheck",
];

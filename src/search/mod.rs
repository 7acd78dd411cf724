// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search request compilation and response parsing
//!
//! # Architecture
//!
//! ```text
//! QuerySpec
//!     ↓
//!     ├─→ sort        → "sort"
//!     ├─→ fulltext    → "query.bool.must"
//!     ├─→ filter      → "query.bool.filter"
//!     ├─→ more_like_this → "query.bool.must"
//!     ├─→ facet       → "aggs"
//!     └─→ spellcheck  → "suggest"
//!
//! engine response
//!     ↓
//!     result ─→ hits, facet buckets, spellcheck suggestions
//! ```

mod facet;
mod filter;
mod fulltext;
mod more_like_this;
mod query;
mod request;
mod result;
mod sort;
mod spellcheck;

pub use facet::{compile_facets, global_key, parse_facets, DEFAULT_FACET_SIZE, UNLIMITED_FACET_SIZE};
pub use filter::{compile_condition, compile_group};
pub use fulltext::{compile_fulltext, searched_fields};
pub use more_like_this::{compile_more_like_this, CombinedIdResolver, ItemIdResolver};
pub use query::{
    Condition, ConditionGroup, ConditionValue, Conjunction, FacetOperator, FacetRequest,
    FilterNode, MoreLikeThisOptions, Operator, QuerySpec, SortDirection, SpellcheckOptions,
};
pub use request::{build_search_body, effective_filter, DEFAULT_LIMIT, DEFAULT_OFFSET};
pub use result::{parse_response, FacetValue, ResultItem, ResultSet};
pub use sort::compile_sorts;
pub use spellcheck::{compile_spellcheck, parse_spellcheck};

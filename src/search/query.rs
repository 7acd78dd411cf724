// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query model - the backend-agnostic description of one search request
//!
//! # Example
//!
//! ```rust
//! use search_bridge::search::{ConditionGroup, FacetRequest, Operator, QuerySpec, SortDirection};
//! use serde_json::json;
//!
//! let query = QuerySpec::new()
//!     .keys(["red", "shoes"])
//!     .condition("status", json!(true), Operator::Eq)
//!     .group(
//!         ConditionGroup::or()
//!             .condition("color", json!("red"), Operator::Eq)
//!             .condition("color", json!("blue"), Operator::Eq),
//!     )
//!     .sort("created", SortDirection::Desc)
//!     .facet("colors", FacetRequest::or("color"))
//!     .range(20, 10);
//!
//! assert_eq!(query.filter.children.len(), 2);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
    #[serde(rename = "BETWEEN")]
    Between,
    #[serde(rename = "NOT BETWEEN")]
    NotBetween,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ConditionValue {
    Null,
    Single(Value),
    List(Vec<Value>),
}

impl From<Value> for ConditionValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Array(items) => Self::List(items),
            other => Self::Single(other),
        }
    }
}

impl From<ConditionValue> for Value {
    fn from(value: ConditionValue) -> Self {
        match value {
            ConditionValue::Null => Value::Null,
            ConditionValue::Single(v) => v,
            ConditionValue::List(items) => Value::Array(items),
        }
    }
}

/// One `field <operator> value` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub value: ConditionValue,
    pub operator: Operator,
}

impl Condition {
    pub fn new(field: impl Into<String>, value: impl Into<ConditionValue>, operator: Operator) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator,
        }
    }
}

/// How sibling clauses combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Child of a condition group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Condition(Condition),
    Group(ConditionGroup),
}

/// Ordered conditions and sub-groups under one explicit conjunction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub conjunction: Conjunction,
    #[serde(default)]
    pub negated: bool,
    #[serde(default)]
    pub children: Vec<FilterNode>,
}

impl ConditionGroup {
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            negated: false,
            children: Vec::new(),
        }
    }

    /// Empty AND group.
    pub fn and() -> Self {
        Self::new(Conjunction::And)
    }

    /// Empty OR group.
    pub fn or() -> Self {
        Self::new(Conjunction::Or)
    }

    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, value: impl Into<ConditionValue>, operator: Operator) -> Self {
        self.children.push(FilterNode::Condition(Condition::new(field, value, operator)));
        self
    }

    #[must_use]
    pub fn group(mut self, group: ConditionGroup) -> Self {
        self.children.push(FilterNode::Group(group));
        self
    }

    /// Negate the whole group.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// How a facet's selected values combine with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetOperator {
    #[default]
    And,
    Or,
}

/// A requested aggregation over one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetRequest {
    pub field: String,
    #[serde(default)]
    pub operator: FacetOperator,
    /// Bucket count; `None` uses the default, `Some(0)` means unlimited
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FacetRequest {
    pub fn and(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FacetOperator::And,
            limit: None,
        }
    }

    pub fn or(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FacetOperator::Or,
            limit: None,
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellcheckOptions {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// More-like-this options. Both keys are required for a clause to be built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoreLikeThisOptions {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl MoreLikeThisOptions {
    pub fn new(id: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            id: Some(id.into()),
            fields: Some(fields),
        }
    }
}

/// Everything the host asks of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Free-text search keys
    #[serde(default)]
    pub keys: Vec<String>,
    /// How the keys combine
    #[serde(default = "default_keys_conjunction")]
    pub keys_conjunction: Conjunction,
    /// Full-text fields to search; `None` searches every full-text field
    #[serde(default)]
    pub fulltext_fields: Option<Vec<String>>,
    /// Root condition group. Hosts must name its conjunction, even when empty.
    pub filter: ConditionGroup,
    #[serde(default)]
    pub sorts: IndexMap<String, SortDirection>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Language codes; empty means all languages
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub facets: IndexMap<String, FacetRequest>,
    #[serde(default)]
    pub spellcheck: Option<SpellcheckOptions>,
    #[serde(default)]
    pub more_like_this: Option<MoreLikeThisOptions>,
    /// Source fields the engine should not return
    #[serde(default)]
    pub excluded_source_fields: Vec<String>,
}

fn default_keys_conjunction() -> Conjunction { Conjunction::And }

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            keys_conjunction: default_keys_conjunction(),
            fulltext_fields: None,
            filter: ConditionGroup::and(),
            sorts: IndexMap::new(),
            offset: None,
            limit: None,
            languages: Vec::new(),
            facets: IndexMap::new(),
            spellcheck: None,
            more_like_this: None,
            excluded_source_fields: Vec::new(),
        }
    }
}

impl QuerySpec {
    /// Empty query with an empty AND root group.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn keys_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.keys_conjunction = conjunction;
        self
    }

    #[must_use]
    pub fn fulltext_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fulltext_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the root condition group.
    #[must_use]
    pub fn filter(mut self, group: ConditionGroup) -> Self {
        self.filter = group;
        self
    }

    /// Add a condition to the root group.
    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, value: impl Into<ConditionValue>, operator: Operator) -> Self {
        self.filter = self.filter.condition(field, value, operator);
        self
    }

    /// Add a sub-group to the root group.
    #[must_use]
    pub fn group(mut self, group: ConditionGroup) -> Self {
        self.filter = self.filter.group(group);
        self
    }

    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sorts.insert(field.into(), direction);
        self
    }

    #[must_use]
    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    /// Add a facet. A later facet with the same id replaces the earlier one.
    #[must_use]
    pub fn facet(mut self, id: impl Into<String>, facet: FacetRequest) -> Self {
        self.facets.insert(id.into(), facet);
        self
    }

    #[must_use]
    pub fn spellcheck(mut self, options: SpellcheckOptions) -> Self {
        self.spellcheck = Some(options);
        self
    }

    #[must_use]
    pub fn more_like_this(mut self, options: MoreLikeThisOptions) -> Self {
        self.more_like_this = Some(options);
        self
    }

    #[must_use]
    pub fn exclude_source_field(mut self, field: impl Into<String>) -> Self {
        self.excluded_source_fields.push(field.into());
        self
    }

    /// Whether any non-blank search key is present.
    pub fn has_keys(&self) -> bool {
        self.keys.iter().any(|k| !k.trim().is_empty())
    }
}

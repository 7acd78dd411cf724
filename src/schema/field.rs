// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Abstract field metadata handed over by the host indexing framework.

use serde::{Deserialize, Serialize};

/// Semantic field types understood by the field mapper.
///
/// The set is closed; anything the host sends that is not listed here lands
/// in [`FieldType::Unsupported`] and compiles to an empty mapping so a
/// field-mapping hook can still fill it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Analyzed full-text
    Text,
    /// Exact-match string (also `keyword`)
    String,
    /// URI, stored as keyword
    Uri,
    /// Token, stored as keyword
    Token,
    Integer,
    /// Duration in seconds, stored as integer
    Duration,
    Boolean,
    Decimal,
    /// ISO-8601 or epoch seconds
    Date,
    /// Nested object
    Object,
    /// Latitude/longitude pair
    Location,
    /// Numeric relevance signal
    RankFeature,
    /// Text analyzed with the n-gram analyzer
    Ngram,
    /// Text analyzed with the edge n-gram analyzer
    EdgeNgram,
    /// `{gte, lte}` date interval
    DateRange,
    SearchAsYouType,
    Attachment,
    /// Any type name outside the closed set
    Unsupported(std::string::String),
}

impl FieldType {
    /// Parse a host type name.
    pub fn parse(name: &str) -> Self {
        match name {
            "text" => Self::Text,
            "string" | "keyword" => Self::String,
            "uri" => Self::Uri,
            "token" => Self::Token,
            "integer" => Self::Integer,
            "duration" => Self::Duration,
            "boolean" => Self::Boolean,
            "decimal" => Self::Decimal,
            "date" => Self::Date,
            "object" => Self::Object,
            "location" | "geo_point" => Self::Location,
            "rank_feature" => Self::RankFeature,
            "ngram" => Self::Ngram,
            "edge_ngram" => Self::EdgeNgram,
            "date_range" => Self::DateRange,
            "search_as_you_type" => Self::SearchAsYouType,
            "attachment" => Self::Attachment,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Host type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::String => "string",
            Self::Uri => "uri",
            Self::Token => "token",
            Self::Integer => "integer",
            Self::Duration => "duration",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Object => "object",
            Self::Location => "location",
            Self::RankFeature => "rank_feature",
            Self::Ngram => "ngram",
            Self::EdgeNgram => "edge_ngram",
            Self::DateRange => "date_range",
            Self::SearchAsYouType => "search_as_you_type",
            Self::Attachment => "attachment",
            Self::Unsupported(name) => name,
        }
    }

    /// Whether free-text keys are matched against this field.
    #[must_use]
    pub fn is_fulltext(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Ngram | Self::EdgeNgram | Self::SearchAsYouType
        )
    }

    /// Whether values are stored as plain strings.
    #[must_use]
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Uri | Self::Token)
    }
}

impl From<std::string::String> for FieldType {
    fn from(name: std::string::String) -> Self {
        Self::parse(&name)
    }
}

impl From<FieldType> for std::string::String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier, unique per index
    pub id: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Relevance weight for full-text matching
    #[serde(default = "default_boost")]
    pub boost: f64,
}

fn default_boost() -> f64 { 1.0 }

impl FieldDescriptor {
    /// Create a field with the default boost.
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            boost: default_boost(),
        }
    }

    /// Set the boost weight.
    #[must_use]
    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(FieldType::parse("keyword"), FieldType::String);
        assert_eq!(FieldType::parse("geo_point"), FieldType::Location);
        assert_eq!(
            FieldType::parse("polygon"),
            FieldType::Unsupported("polygon".into())
        );
    }

    #[test]
    fn test_type_name_roundtrip_through_serde() {
        let field: FieldDescriptor =
            serde_json::from_str(r#"{"id": "title", "type": "text"}"#).unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.boost, 1.0);

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "text");
    }

    #[test]
    fn test_fulltext_types() {
        assert!(FieldType::Text.is_fulltext());
        assert!(FieldType::Ngram.is_fulltext());
        assert!(FieldType::EdgeNgram.is_fulltext());
        assert!(FieldType::SearchAsYouType.is_fulltext());
        assert!(!FieldType::String.is_fulltext());
    }
}

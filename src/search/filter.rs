//! Filter Compiler - condition trees to boolean filter clauses
//!
//! # Mapping
//!
//! ```text
//! field = null          → {"bool":{"must_not":{"exists":{"field":f}}}}
//! field <> null         → {"exists":{"field":f}}
//! field = v             → {"term":{f:v}}
//! field <> v            → {"bool":{"must_not":{"term":{f:v}}}}
//! field IN [..]         → {"terms":{f:[..]}}
//! field NOT IN [..]     → {"bool":{"must_not":{"terms":{f:[..]}}}}
//! field > v             → {"range":{f:{"from":v,"to":null,"include_lower":false,"include_upper":false}}}
//! field BETWEEN [a, b]  → {"range":{f:{"from":a,"to":b,"include_lower":false,"include_upper":false}}}
//! AND group             → {"bool":{"must":[..]}}
//! OR group              → {"bool":{"should":[..],"minimum_should_match":1}}
//! negated group         → {"bool":{"must_not":<group clause>}}
//! ```
//!
//! Conditions whose operator cannot take their value (e.g. `>` with a list)
//! and conditions on unknown fields are logged and skipped.

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::warn;

use crate::metrics;
use crate::schema::FieldDescriptor;

use super::query::{Condition, ConditionGroup, ConditionValue, Conjunction, FilterNode, Operator};

/// Compile a condition group.
///
/// Returns `None` when nothing in the group compiled to a clause.
pub fn compile_group(group: &ConditionGroup, fields: &IndexMap<String, FieldDescriptor>) -> Option<Value> {
    let clauses: Vec<Value> = group
        .children
        .iter()
        .filter_map(|child| match child {
            FilterNode::Condition(condition) => compile_condition(condition, fields),
            FilterNode::Group(sub) => compile_group(sub, fields),
        })
        .collect();

    if clauses.is_empty() {
        return None;
    }

    let clause = match group.conjunction {
        Conjunction::And => json!({"bool": {"must": clauses}}),
        Conjunction::Or => json!({"bool": {"should": clauses, "minimum_should_match": 1}}),
    };

    Some(if group.negated { negate(clause) } else { clause })
}

/// Compile a single condition.
pub fn compile_condition(condition: &Condition, fields: &IndexMap<String, FieldDescriptor>) -> Option<Value> {
    let field = condition.field.as_str();
    if !fields.contains_key(field) {
        warn!(field, "Unknown filter field");
        metrics::record_validation_warning("unknown_filter_field");
        return None;
    }

    let clause = match (condition.operator, &condition.value) {
        (Operator::Eq, ConditionValue::Null) => negate(exists(field)),
        (Operator::NotEq, ConditionValue::Null) => exists(field),
        (Operator::Eq, ConditionValue::Single(v)) => term(field, v),
        (Operator::NotEq, ConditionValue::Single(v)) => negate(term(field, v)),

        (Operator::In, value) => terms(field, value)?,
        (Operator::NotIn, value) => negate(terms(field, value)?),

        (Operator::Gt, ConditionValue::Single(v)) => range(field, v, &Value::Null, false, false),
        (Operator::Gte, ConditionValue::Single(v)) => range(field, v, &Value::Null, true, false),
        (Operator::Lt, ConditionValue::Single(v)) => range(field, &Value::Null, v, false, false),
        (Operator::Lte, ConditionValue::Single(v)) => range(field, &Value::Null, v, false, true),

        (Operator::Between, ConditionValue::List(bounds)) if bounds.len() == 2 => {
            range(field, &bounds[0], &bounds[1], false, false)
        }
        (Operator::NotBetween, ConditionValue::List(bounds)) if bounds.len() == 2 => {
            negate(range(field, &bounds[0], &bounds[1], false, false))
        }

        (operator, value) => {
            warn!(field, %operator, value = ?value, "Unsupported operator/value combination");
            metrics::record_validation_warning("invalid_condition");
            return None;
        }
    };

    Some(clause)
}

fn negate(clause: Value) -> Value {
    json!({"bool": {"must_not": clause}})
}

fn exists(field: &str) -> Value {
    json!({"exists": {"field": field}})
}

fn term(field: &str, value: &Value) -> Value {
    json!({"term": {field: value}})
}

fn terms(field: &str, value: &ConditionValue) -> Option<Value> {
    let values = match value {
        ConditionValue::List(values) => values.clone(),
        ConditionValue::Single(v) => vec![v.clone()],
        ConditionValue::Null => {
            warn!(field, "IN condition without values");
            metrics::record_validation_warning("invalid_condition");
            return None;
        }
    };
    Some(json!({"terms": {field: values}}))
}

fn range(field: &str, from: &Value, to: &Value, include_lower: bool, include_upper: bool) -> Value {
    json!({
        "range": {
            field: {
                "from": from,
                "to": to,
                "include_lower": include_lower,
                "include_upper": include_upper
            }
        }
    })
}

//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and the JSON
//! items produced by `UnitRecord::to_item`. These are testable in isolation without
//! DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Number, Value};

use units_core::pagination::{KeyAttribute, PageKey};
use units_core::storage::RepositoryError;
use units_core::unit::Item;

pub type AttributeMap = HashMap<String, AttributeValue>;

// ============================================================================
// JSON <-> AttributeValue
// ============================================================================

/// Convert a JSON value to an attribute value.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Convert an attribute value to JSON. Binary attributes are not supported.
pub fn attribute_to_json(value: &AttributeValue) -> Result<Value, RepositoryError> {
    Ok(match value {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(attribute_to_json)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), attribute_to_json(v)?)))
                .collect::<Result<Map<_, _>, RepositoryError>>()?,
        ),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(RepositoryError::InvalidData(format!(
                "unsupported attribute type: {other:?}"
            )))
        }
    })
}

fn parse_number(n: &str) -> Result<Number, RepositoryError> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Number::from(u));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| RepositoryError::InvalidData(format!("invalid number attribute: {n}")))
}

// ============================================================================
// Item conversions
// ============================================================================

/// Convert a unit item to a DynamoDB item.
pub fn item_to_attributes(item: &Item) -> AttributeMap {
    item.iter()
        .map(|(k, v)| (k.clone(), json_to_attribute(v)))
        .collect()
}

/// Convert a DynamoDB item to a unit item.
pub fn attributes_to_item(attributes: &AttributeMap) -> Result<Item, RepositoryError> {
    attributes
        .iter()
        .map(|(k, v)| Ok((k.clone(), attribute_to_json(v)?)))
        .collect()
}

// ============================================================================
// Pagination key conversions
// ============================================================================

/// Convert a decoded page key to an exclusive start key.
pub fn page_key_to_attributes(key: &PageKey) -> AttributeMap {
    key.iter()
        .map(|(name, value)| {
            let value = match value {
                KeyAttribute::S(s) => AttributeValue::S(s.clone()),
                KeyAttribute::N(n) => AttributeValue::N(n.clone()),
            };
            (name.clone(), value)
        })
        .collect()
}

/// Convert a last evaluated key to a page key. Only string and number keys exist.
pub fn attributes_to_page_key(attributes: &AttributeMap) -> Result<PageKey, RepositoryError> {
    attributes
        .iter()
        .map(|(name, value)| {
            let value = match value {
                AttributeValue::S(s) => KeyAttribute::S(s.clone()),
                AttributeValue::N(n) => KeyAttribute::N(n.clone()),
                other => {
                    return Err(RepositoryError::InvalidData(format!(
                        "unsupported key attribute {name}: {other:?}"
                    )))
                }
            };
            Ok((name.clone(), value))
        })
        .collect()
}

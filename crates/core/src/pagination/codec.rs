//! Opaque pagination tokens.
//!
//! A token is standard base64 over the compact JSON form of the store's last
//! evaluated key. Each attribute is written with its store type
//! (`{"pk":{"S":"acct-1"},"createdAt":{"N":"1700000000"}}`) so decoding never has to
//! guess. Tokens carrying bare values are still accepted: `pk`, `sk` and `id` are read
//! as strings, numeric-looking strings and JSON numbers as numbers.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::error::PaginationError;
use crate::unit::{ID_ATTRIBUTE, PARTITION_KEY, SORT_KEY};

/// Attributes always decoded as strings from bare token values.
pub const STRING_KEY_FIELDS: &[&str] = &[PARTITION_KEY, SORT_KEY, ID_ATTRIBUTE];

/// A typed scalar of a continuation key. Numbers keep their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAttribute {
    S(String),
    N(String),
}

/// Store-native "continue from here" key.
pub type PageKey = BTreeMap<String, KeyAttribute>;

/// Encodes `key` as an opaque token. An absent or empty key encodes to `""`.
pub fn encode_token(key: Option<&PageKey>) -> Result<String, PaginationError> {
    let Some(key) = key.filter(|key| !key.is_empty()) else {
        return Ok(String::new());
    };
    let json = serde_json::to_vec(key).map_err(|e| PaginationError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// Decodes a token produced by [`encode_token`]. `""` decodes to `None`.
pub fn decode_token(token: &str) -> Result<Option<PageKey>, PaginationError> {
    if token.is_empty() {
        return Ok(None);
    }

    let bytes = STANDARD
        .decode(token)
        .map_err(|e| PaginationError::InvalidEncoding(e.to_string()))?;
    let fields: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|e| PaginationError::InvalidFormat(e.to_string()))?;

    let key = fields
        .into_iter()
        .map(|(name, value)| {
            let attribute = decode_attribute(&name, value)?;
            Ok((name, attribute))
        })
        .collect::<Result<PageKey, PaginationError>>()?;

    Ok(Some(key))
}

fn decode_attribute(name: &str, value: Value) -> Result<KeyAttribute, PaginationError> {
    let invalid = |value: &Value| PaginationError::InvalidAttribute {
        name: name.to_string(),
        value: value.to_string(),
    };

    match value {
        Value::Object(_) => serde_json::from_value(value.clone()).map_err(|_| invalid(&value)),
        Value::String(s) if STRING_KEY_FIELDS.contains(&name) => Ok(KeyAttribute::S(s)),
        Value::String(s) if is_numeric_text(&s) => Ok(KeyAttribute::N(s)),
        Value::String(s) => Ok(KeyAttribute::S(s)),
        Value::Number(ref n) => integer_text(n)
            .map(KeyAttribute::N)
            .ok_or_else(|| invalid(&value)),
        other => Err(invalid(&other)),
    }
}

fn is_numeric_text(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        && s.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Renders a JSON number without a fractional part.
fn integer_text(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return Some(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    n.as_f64()
        .filter(|f| f.is_finite())
        .map(|f| format!("{f:.0}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(&str, KeyAttribute)]) -> PageKey {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn legacy_token(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn test_absent_key_is_empty_token() {
        assert_eq!(encode_token(None).unwrap(), "");
        assert_eq!(encode_token(Some(&PageKey::new())).unwrap(), "");
        assert_eq!(decode_token("").unwrap(), None);
    }

    #[test]
    fn test_round_trip() {
        let original = key(&[
            ("pk", KeyAttribute::S("acct-1".into())),
            ("sk", KeyAttribute::S("commercialVehicleType#abc".into())),
            ("createdAt", KeyAttribute::N("1700000000".into())),
        ]);
        let token = encode_token(Some(&original)).unwrap();
        assert!(!token.is_empty());
        assert_eq!(decode_token(&token).unwrap(), Some(original));
    }

    #[test]
    fn test_numeric_looking_string_keeps_its_type() {
        // A digits-only identifier outside pk/sk/id must survive as a string
        let original = key(&[
            ("pk", KeyAttribute::S("12345".into())),
            ("locationRef", KeyAttribute::S("0042".into())),
        ]);
        let token = encode_token(Some(&original)).unwrap();
        assert_eq!(decode_token(&token).unwrap(), Some(original));
    }

    #[test]
    fn test_token_is_base64_json() {
        let original = key(&[("pk", KeyAttribute::S("acct-1".into()))]);
        let token = encode_token(Some(&original)).unwrap();
        let json = String::from_utf8(STANDARD.decode(token).unwrap()).unwrap();
        assert_eq!(json, r#"{"pk":{"S":"acct-1"}}"#);
    }

    #[test]
    fn test_legacy_bare_values() {
        let token = legacy_token(
            r#"{"pk":"acct-1","sk":"commercialVehicleType#1","id":"123","createdAt":1700000000,"rank":"17"}"#,
        );
        let decoded = decode_token(&token).unwrap().unwrap();
        assert_eq!(decoded["pk"], KeyAttribute::S("acct-1".into()));
        assert_eq!(decoded["sk"], KeyAttribute::S("commercialVehicleType#1".into()));
        assert_eq!(decoded["id"], KeyAttribute::S("123".into()));
        assert_eq!(decoded["createdAt"], KeyAttribute::N("1700000000".into()));
        assert_eq!(decoded["rank"], KeyAttribute::N("17".into()));
    }

    #[test]
    fn test_legacy_float_is_rendered_as_integer() {
        let token = legacy_token(r#"{"createdAt":1.7e9}"#);
        let decoded = decode_token(&token).unwrap().unwrap();
        assert_eq!(decoded["createdAt"], KeyAttribute::N("1700000000".into()));
    }

    #[test]
    fn test_legacy_non_numeric_string_stays_string() {
        let token = legacy_token(r#"{"status":"infinity","label":"12ab"}"#);
        let decoded = decode_token(&token).unwrap().unwrap();
        assert_eq!(decoded["status"], KeyAttribute::S("infinity".into()));
        assert_eq!(decoded["label"], KeyAttribute::S("12ab".into()));
    }

    #[test]
    fn test_malformed_base64() {
        assert!(matches!(
            decode_token("not base64!!"),
            Err(PaginationError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            decode_token(&legacy_token("{not json")),
            Err(PaginationError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_token(&legacy_token("[1, 2]")),
            Err(PaginationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unsupported_attribute_values() {
        assert!(matches!(
            decode_token(&legacy_token(r#"{"flag":true}"#)),
            Err(PaginationError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            decode_token(&legacy_token(r#"{"pk":{"B":"AAAA"}}"#)),
            Err(PaginationError::InvalidAttribute { .. })
        ));
    }
}

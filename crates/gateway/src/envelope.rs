//! Response body normalization.
//!
//! Some endpoints wrap their payload as `{"data": T, ...}` and some return `T`
//! directly. Everything above the client sees `T`.

use serde_json::Value;

/// Strip a `{"data": ...}` envelope when present.
///
/// Only objects carrying a `data` key are unwrapped; any other shape,
/// including arrays and scalars, is returned unchanged.
pub fn normalize(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Flatten a normalized list payload.
///
/// Paginated endpoints answer `{"content": [...]}`, others a bare array, and
/// an empty result may come back as `null`.
pub fn into_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("content") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// `{"message": "..."}` from an error body.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let message = value.get("message")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_data_envelope() {
        assert_eq!(normalize(json!({"data": {"id": 5}})), json!({"id": 5}));
        assert_eq!(
            normalize(json!({"success": true, "message": "ok", "data": [1, 2]})),
            json!([1, 2])
        );
    }

    #[test]
    fn bare_bodies_pass_through() {
        assert_eq!(normalize(json!({"id": 5})), json!({"id": 5}));
        assert_eq!(normalize(json!([{"data": 1}])), json!([{"data": 1}]));
        assert_eq!(normalize(Value::Null), Value::Null);
    }

    #[test]
    fn explicit_null_data_is_unwrapped() {
        assert_eq!(normalize(json!({"data": null, "message": "gone"})), Value::Null);
    }

    #[test]
    fn lists_accept_paginated_and_bare_shapes() {
        assert_eq!(
            into_list(json!({"content": [1, 2], "totalPages": 1})),
            vec![json!(1), json!(2)]
        );
        assert_eq!(into_list(json!([3])), vec![json!(3)]);
        assert!(into_list(Value::Null).is_empty());
        assert!(into_list(json!({"totalPages": 0})).is_empty());
    }

    #[test]
    fn extracts_error_message() {
        assert_eq!(
            error_message(br#"{"message":"Email already registered"}"#).as_deref(),
            Some("Email already registered")
        );
        assert_eq!(error_message(b"<html>"), None);
        assert_eq!(error_message(br#"{"message":""}"#), None);
    }
}

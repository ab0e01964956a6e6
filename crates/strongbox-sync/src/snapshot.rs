// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud payload construction and normalization.

use chrono::{DateTime, Utc};
use serde_json::Value;
use strongbox_core::types::SNAPSHOT_VERSION;
use strongbox_core::{CloudSnapshot, StrongboxError};

/// Wrap persisted envelopes for upload.
pub fn build_snapshot(envelopes: Vec<Value>, now: DateTime<Utc>) -> CloudSnapshot {
    CloudSnapshot {
        version: SNAPSHOT_VERSION.to_string(),
        timestamp: now.timestamp_millis(),
        data: envelopes,
    }
}

/// Extract the envelope batch from a downloaded payload.
///
/// Accepts a snapshot object with a `data` array, a bare array, or either of
/// those serialized once more as a JSON string. Anything else is a format
/// error. Elements are not validated here.
pub fn normalize_payload(bytes: &[u8]) -> Result<Vec<Value>, StrongboxError> {
    let mut value: Value = serde_json::from_slice(bytes)
        .map_err(|e| StrongboxError::SyncFormat(format!("payload is not JSON: {e}")))?;
    if let Value::String(inner) = &value {
        value = serde_json::from_str(inner).map_err(|e| {
            StrongboxError::SyncFormat(format!("string payload is not JSON: {e}"))
        })?;
    }

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(StrongboxError::SyncFormat(
                "`data` is not an array".to_string(),
            )),
            None => Err(StrongboxError::SyncFormat(
                "object payload has no `data` field".to_string(),
            )),
        },
        other => Err(StrongboxError::SyncFormat(format!(
            "unexpected payload type: {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn snapshot_shape() {
        let now = Utc.timestamp_millis_opt(1_714_557_600_123).unwrap();
        let snapshot = build_snapshot(vec![json!({"encrypted": [1]})], now);
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["timestamp"], 1_714_557_600_123_i64);
        assert_eq!(value["data"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn accepts_snapshot_object() {
        let bytes = br#"{"version":"1.0","timestamp":1,"data":[{"a":1},{"b":2}]}"#;
        assert_eq!(normalize_payload(bytes).unwrap().len(), 2);
    }

    #[test]
    fn accepts_legacy_bare_array() {
        assert_eq!(normalize_payload(br#"[{"a":1}]"#).unwrap().len(), 1);
    }

    #[test]
    fn accepts_json_string_payload() {
        let inner = json!({"data": [1, 2, 3]}).to_string();
        let bytes = serde_json::to_vec(&Value::String(inner)).unwrap();
        assert_eq!(normalize_payload(&bytes).unwrap().len(), 3);
    }

    #[test]
    fn rejects_other_shapes() {
        let payloads: [&[u8]; 5] = [
            b"not json",
            br#"{"items":[]}"#,
            br#"{"data":{}}"#,
            b"42",
            br#""still not json""#,
        ];
        for bytes in payloads {
            assert!(
                matches!(normalize_payload(bytes), Err(StrongboxError::SyncFormat(_))),
                "payload {:?} should be rejected",
                String::from_utf8_lossy(bytes)
            );
        }
    }
}

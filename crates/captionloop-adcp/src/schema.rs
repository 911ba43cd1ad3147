//! Boundary checks for the report JSON.
//!
//! Both reports are checked field by field before they are printed. A
//! failure means the projection code produced the wrong shape, so callers
//! treat it as fatal.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{ADCP_VERSION, ASSET_TYPE, LOG_TASK, PAYLOAD_TASK};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("field `{path}` must be {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("field `{path}` must be {expected:?}, found {found:?}")]
    UnexpectedValue {
        path: String,
        expected: String,
        found: String,
    },

    #[error("metadata `{field}` is not an integer: {value:?}")]
    InvalidMetadata { field: String, value: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn field<'v>(obj: &'v Map<String, Value>, key: &str, path: &str) -> Result<&'v Value, SchemaError> {
    obj.get(key)
        .ok_or_else(|| SchemaError::MissingField(join(path, key)))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn as_object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::WrongType {
        path: path.to_string(),
        expected: "an object",
    })
}

fn str_field<'v>(obj: &'v Map<String, Value>, key: &str, path: &str) -> Result<&'v str, SchemaError> {
    field(obj, key, path)?
        .as_str()
        .ok_or_else(|| SchemaError::WrongType {
            path: join(path, key),
            expected: "a string",
        })
}

fn int_field(obj: &Map<String, Value>, key: &str, path: &str) -> Result<i64, SchemaError> {
    field(obj, key, path)?
        .as_i64()
        .ok_or_else(|| SchemaError::WrongType {
            path: join(path, key),
            expected: "an integer",
        })
}

fn array_field<'v>(
    obj: &'v Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'v Vec<Value>, SchemaError> {
    field(obj, key, path)?
        .as_array()
        .ok_or_else(|| SchemaError::WrongType {
            path: join(path, key),
            expected: "an array",
        })
}

fn const_field(
    obj: &Map<String, Value>,
    key: &str,
    expected: &str,
    path: &str,
) -> Result<(), SchemaError> {
    let found = str_field(obj, key, path)?;
    if found != expected {
        return Err(SchemaError::UnexpectedValue {
            path: join(path, key),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

/// Check an attempt log document
pub fn validate_attempt_log(value: &Value) -> Result<(), SchemaError> {
    let root = as_object(value, "")?;
    const_field(root, "adcp_version", ADCP_VERSION, "")?;
    const_field(root, "task", LOG_TASK, "")?;

    for (idx, entry) in array_field(root, "attempts", "")?.iter().enumerate() {
        let path = format!("attempts[{}]", idx);
        let entry = as_object(entry, &path)?;

        let sequence = int_field(entry, "sequence", &path)?;
        if sequence != idx as i64 + 1 {
            return Err(SchemaError::UnexpectedValue {
                path: join(&path, "sequence"),
                expected: (idx + 1).to_string(),
                found: sequence.to_string(),
            });
        }
        const_field(entry, "type", ASSET_TYPE, &path)?;
        str_field(entry, "content", &path)?;
        str_field(entry, "status", &path)?;
        str_field(entry, "feedback", &path)?;
    }
    Ok(())
}

/// Check a final payload document
pub fn validate_final_payload(value: &Value) -> Result<(), SchemaError> {
    let root = as_object(value, "")?;
    const_field(root, "adcp_version", ADCP_VERSION, "")?;
    const_field(root, "task", PAYLOAD_TASK, "")?;

    let payload = as_object(field(root, "payload", "")?, "payload")?;
    str_field(payload, "target_audience", "payload")?;
    str_field(payload, "product", "payload")?;

    let assets = array_field(payload, "creative_assets", "payload")?;
    if assets.len() != 1 {
        return Err(SchemaError::UnexpectedValue {
            path: "payload.creative_assets".to_string(),
            expected: "exactly one asset".to_string(),
            found: format!("{} assets", assets.len()),
        });
    }
    let asset = as_object(&assets[0], "payload.creative_assets[0]")?;
    const_field(asset, "type", ASSET_TYPE, "payload.creative_assets[0]")?;
    str_field(asset, "content", "payload.creative_assets[0]")?;

    let metadata = as_object(field(root, "metadata", "")?, "metadata")?;
    int_field(metadata, "length", "metadata")?;
    int_field(metadata, "word_count", "metadata")?;
    str_field(metadata, "sentiment", "metadata")?;
    str_field(metadata, "brand_safety_check", "metadata")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn good_log() -> Value {
        json!({
            "adcp_version": "1.0",
            "task": "creative_generation_log",
            "attempts": [
                {"sequence": 1, "type": "text_ad", "content": "a", "status": "rejected", "feedback": "x"},
                {"sequence": 2, "type": "text_ad", "content": "b", "status": "approved", "feedback": "Approved"}
            ]
        })
    }

    fn good_payload() -> Value {
        json!({
            "adcp_version": "1.0",
            "task": "creative_generation",
            "payload": {
                "target_audience": "QA",
                "creative_assets": [{"type": "text_ad", "content": "Prod rocks ⚡"}],
                "product": "Prod"
            },
            "metadata": {
                "length": 12,
                "word_count": 3,
                "sentiment": "energetic",
                "brand_safety_check": "passed"
            }
        })
    }

    #[test]
    fn test_valid_documents_pass() {
        validate_attempt_log(&good_log()).unwrap();
        validate_final_payload(&good_payload()).unwrap();
    }

    #[test]
    fn test_empty_attempt_list_is_valid() {
        let mut log = good_log();
        log["attempts"] = json!([]);
        validate_attempt_log(&log).unwrap();
    }

    #[test]
    fn test_missing_field_reports_path() {
        let mut log = good_log();
        log["attempts"][1].as_object_mut().unwrap().remove("feedback");
        let err = validate_attempt_log(&log).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField(ref p) if p == "attempts[1].feedback"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut payload = good_payload();
        payload["metadata"]["length"] = json!("12");
        let err = validate_final_payload(&payload).unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { ref path, .. } if path == "metadata.length"));
    }

    #[test]
    fn test_wrong_task_rejected() {
        let mut payload = good_payload();
        payload["task"] = json!("creative_generation_log");
        assert!(matches!(
            validate_final_payload(&payload),
            Err(SchemaError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_sequence_must_be_one_based_and_ordered() {
        let mut log = good_log();
        log["attempts"][0]["sequence"] = json!(0);
        assert!(matches!(
            validate_attempt_log(&log),
            Err(SchemaError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_assets_must_be_singleton() {
        let mut payload = good_payload();
        payload["payload"]["creative_assets"] = json!([]);
        assert!(validate_final_payload(&payload).is_err());
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(matches!(
            validate_attempt_log(&json!([])),
            Err(SchemaError::WrongType { .. })
        ));
    }
}

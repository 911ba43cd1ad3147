use captionloop_agent::caption::{char_length, word_count};
use captionloop_core::Attempt;
use captionloop_critic::verdict::{BRAND_SAFETY_CHECK, BRAND_SAFETY_UNKNOWN, LENGTH, WORD_COUNT};
use captionloop_critic::Attributes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{validate_attempt_log, validate_final_payload, SchemaError};
use crate::{ADCP_VERSION, ASSET_TYPE, LOG_TASK, PAYLOAD_TASK, SENTIMENT};

/// Ordered record of every attempt in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptLog {
    pub adcp_version: String,
    pub task: String,
    pub attempts: Vec<AttemptEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptEntry {
    /// 1-based position in the run
    pub sequence: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub status: String,
    pub feedback: String,
}

impl AttemptLog {
    pub fn from_history(history: &[Attempt]) -> Self {
        let attempts = history
            .iter()
            .enumerate()
            .map(|(idx, attempt)| AttemptEntry {
                sequence: idx as i64 + 1,
                kind: ASSET_TYPE.to_string(),
                content: attempt.candidate.clone(),
                status: attempt.verdict.status().to_string(),
                feedback: attempt.verdict.reasons().to_string(),
            })
            .collect();

        Self {
            adcp_version: ADCP_VERSION.to_string(),
            task: LOG_TASK.to_string(),
            attempts,
        }
    }

    /// Serialize and check against the schema
    pub fn to_validated_json(&self) -> Result<Value, SchemaError> {
        let value = serde_json::to_value(self)?;
        validate_attempt_log(&value)?;
        Ok(value)
    }

    /// Check a JSON document and read it back
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        validate_attempt_log(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// The final creative envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPayload {
    pub adcp_version: String,
    pub task: String,
    pub payload: PayloadBody,
    pub metadata: PayloadMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBody {
    pub target_audience: String,
    pub creative_assets: Vec<CreativeAsset>,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeAsset {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMetadata {
    pub length: i64,
    pub word_count: i64,
    pub sentiment: String,
    pub brand_safety_check: String,
}

/// Integer attribute, or `fallback` when absent. A present but
/// non-numeric value is a shape fault.
fn int_attribute(attributes: &Attributes, key: &str, fallback: usize) -> Result<i64, SchemaError> {
    match attributes.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| SchemaError::InvalidMetadata {
                field: key.to_string(),
                value: raw.clone(),
            }),
        None => Ok(fallback as i64),
    }
}

impl FinalPayload {
    /// Build the envelope for a (possibly unapproved) caption.
    ///
    /// `length` and `word_count` come from the attributes when present and
    /// are recomputed from the caption otherwise.
    pub fn build(
        product: &str,
        audience: &str,
        caption: &str,
        attributes: &Attributes,
    ) -> Result<Self, SchemaError> {
        let metadata = PayloadMetadata {
            length: int_attribute(attributes, LENGTH, char_length(caption))?,
            word_count: int_attribute(attributes, WORD_COUNT, word_count(caption))?,
            sentiment: SENTIMENT.to_string(),
            brand_safety_check: attributes
                .get(BRAND_SAFETY_CHECK)
                .cloned()
                .unwrap_or_else(|| BRAND_SAFETY_UNKNOWN.to_string()),
        };

        Ok(Self {
            adcp_version: ADCP_VERSION.to_string(),
            task: PAYLOAD_TASK.to_string(),
            payload: PayloadBody {
                target_audience: audience.to_string(),
                creative_assets: vec![CreativeAsset {
                    kind: ASSET_TYPE.to_string(),
                    content: caption.to_string(),
                }],
                product: product.to_string(),
            },
            metadata,
        })
    }

    /// Serialize and check against the schema
    pub fn to_validated_json(&self) -> Result<Value, SchemaError> {
        let value = serde_json::to_value(self)?;
        validate_final_payload(&value)?;
        Ok(value)
    }

    /// Check a JSON document and read it back
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        validate_final_payload(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

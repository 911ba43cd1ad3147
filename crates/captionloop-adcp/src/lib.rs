//! # captionloop-adcp
//!
//! Shapes a finished run into AdCP-style JSON: an attempt log and a final
//! creative payload. Both are pure functions of the run's output and are
//! schema-checked before they leave this crate.

mod report;
pub mod schema;

pub use report::{AttemptEntry, AttemptLog, CreativeAsset, FinalPayload, PayloadBody, PayloadMetadata};
pub use schema::{validate_attempt_log, validate_final_payload, SchemaError};

pub const ADCP_VERSION: &str = "1.0";
pub const LOG_TASK: &str = "creative_generation_log";
pub const PAYLOAD_TASK: &str = "creative_generation";
pub const ASSET_TYPE: &str = "text_ad";
pub const SENTIMENT: &str = "energetic";

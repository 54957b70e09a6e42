//! Document validation against the Swagger 2.0 meta-schema.
//!
//! Findings never stop a comparison: a structurally invalid document is
//! still diffed on a best-effort basis, and callers decide how loudly to
//! report what this module returns.

use std::sync::OnceLock;

use serde_json::Value;

use crate::error::SchemaError;

/// Condensed Swagger 2.0 meta-schema (draft-04, no external references).
const SWAGGER_META_SCHEMA: &str = include_str!("../schemas/swagger-2.0.json");

/// Check a document against the Swagger 2.0 meta-schema.
///
/// Returns every finding; an empty list means the document is valid.
pub fn validate(document: &Value) -> Vec<SchemaError> {
    let validator = match meta_validator() {
        Ok(validator) => validator,
        Err(message) => {
            return vec![SchemaError {
                path: String::new(),
                message: format!("meta-schema unavailable: {}", message),
            }]
        }
    };

    validator
        .iter_errors(document)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}

fn meta_validator() -> Result<&'static jsonschema::Validator, &'static str> {
    static VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

    VALIDATOR
        .get_or_init(|| {
            let schema: Value =
                serde_json::from_str(SWAGGER_META_SCHEMA).map_err(|e| e.to_string())?;
            jsonschema::validator_for(&schema).map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(String::as_str)
}

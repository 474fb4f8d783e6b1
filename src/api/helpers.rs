//! Shared helpers for WASM API operations
//!
//! Conversion between JavaScript values and crate types, plus the argument
//! parsing every export does before reaching the pure Rust core.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::errors::AppError;
use crate::models::{Key, NotationFormat};

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize a value to a plain JavaScript object.
///
/// Maps become objects rather than `Map` instances so metadata reads the
/// same as it would through `JSON.parse`.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

// ============================================================================
// Argument Parsing
// ============================================================================

pub fn parse_format(name: &str) -> Result<NotationFormat, AppError> {
    name.parse::<NotationFormat>()
        .map_err(|e| AppError::format(e).with_code("UNSUPPORTED_FORMAT"))
}

pub fn parse_key(name: &str) -> Result<Key, AppError> {
    name.parse::<Key>().map_err(AppError::from)
}

/// Treat `undefined`, `null` and blank strings from JavaScript alike
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Result Conversion Helpers
// ============================================================================

/// Convert an `AppError` into a structured JavaScript error object
pub fn app_error(error: AppError) -> JsValue {
    log::error!("{}", error);
    serialize(&error, "Failed to serialize error").unwrap_or_else(|fallback| fallback)
}

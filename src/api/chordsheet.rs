//! WASM exports for chord sheet detection, conversion and transposition
//!
//! Every function takes plain strings or JSON-compatible values and returns
//! JSON-compatible values. Failures come back as serialized `AppError`
//! objects, except `convertChordsheet`, which reports them inside its result.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::RwLock;
use wasm_bindgen::prelude::*;

use super::helpers::{app_error, deserialize, non_blank, parse_format, parse_key, serialize};
use crate::config::EngineConfig;
use crate::converters::ConversionEngine;
use crate::detection::{detect_format as detect_source_format, detect_key as detect_sheet_key};
use crate::errors::AppError;
use crate::models::{Chordsheet, NotationFormat};
use crate::transposition::{key_distance as distance_between, transpose_symbol};

// Engine shared by all exports; replaced wholesale by `configureEngine`
static ENGINE: Lazy<RwLock<ConversionEngine>> = Lazy::new(|| RwLock::new(ConversionEngine::default()));

fn with_engine<T>(f: impl FnOnce(&ConversionEngine) -> Result<T, AppError>) -> Result<T, JsValue> {
    let engine = ENGINE
        .read()
        .map_err(|_| app_error(AppError::conversion("Conversion engine is unavailable")))?;
    f(&*engine).map_err(app_error)
}

#[derive(Serialize)]
struct FormatInfo {
    id: &'static str,
    name: &'static str,
}

/// Replace the engine configuration. Accepts JSON or YAML.
#[wasm_bindgen(js_name = configureEngine)]
pub fn configure_engine(source: &str) -> Result<(), JsValue> {
    let config = if source.trim_start().starts_with('{') {
        EngineConfig::from_json(source)
    } else {
        EngineConfig::from_yaml(source)
    }
    .map_err(app_error)?;

    let mut engine = ENGINE
        .write()
        .map_err(|_| app_error(AppError::conversion("Conversion engine is unavailable")))?;
    *engine = ConversionEngine::with_config(config);
    log::info!("configureEngine: engine reconfigured");
    Ok(())
}

/// Guess the notation of `text`: `{ format, confidence, indicators }`
#[wasm_bindgen(js_name = detectFormat)]
pub fn detect_format(text: &str) -> Result<JsValue, JsValue> {
    let result = detect_source_format(text);
    log::debug!("detectFormat: {} ({:.2})", result.format, result.confidence);
    serialize(&result, "Failed to serialize format detection")
}

/// Guess the key of `text` written in `format`
#[wasm_bindgen(js_name = detectKey)]
pub fn detect_key(text: &str, format: &str) -> Result<JsValue, JsValue> {
    let format = parse_format(format).map_err(app_error)?;
    let result = detect_sheet_key(text, format);
    log::debug!("detectKey: {} ({:.2})", result.key, result.confidence);
    serialize(&result, "Failed to serialize key detection")
}

/// Full pipeline: detect, parse, transpose, render.
///
/// Always resolves to a `ConversionResult`; check its `success` flag.
#[wasm_bindgen(js_name = convertChordsheet)]
pub fn convert_chordsheet(
    input: &str,
    source_format: Option<String>,
    target_format: &str,
    source_key: Option<String>,
    target_key: Option<String>,
) -> Result<JsValue, JsValue> {
    let source_format = non_blank(source_format);
    let source_key = non_blank(source_key);
    let target_key = non_blank(target_key);

    let result = with_engine(|engine| {
        Ok(engine.convert_named(
            input,
            source_format.as_deref(),
            target_format,
            source_key.as_deref(),
            target_key.as_deref(),
        ))
    })?;
    log::info!(
        "convertChordsheet: success={} warnings={} errors={}",
        result.success,
        result.warnings.len(),
        result.errors.len()
    );
    serialize(&result, "Failed to serialize conversion result")
}

/// Parse `text` as `format`: `{ sheet, warnings }`
#[wasm_bindgen(js_name = parseChordsheet)]
pub fn parse_chordsheet(text: &str, format: &str) -> Result<JsValue, JsValue> {
    let format = parse_format(format).map_err(app_error)?;
    let outcome = with_engine(|engine| engine.handler(format)?.parse(text))?;
    serialize(&outcome, "Failed to serialize parsed chord sheet")
}

/// Render a chord sheet object (as returned by `parseChordsheet`) in
/// `format`: `{ text, warnings }`
#[wasm_bindgen(js_name = renderChordsheet)]
pub fn render_chordsheet(sheet: JsValue, format: &str) -> Result<JsValue, JsValue> {
    let sheet: Chordsheet = deserialize(sheet, "Invalid chord sheet")?;
    let format = parse_format(format).map_err(app_error)?;
    let outcome = with_engine(|engine| engine.handler(format)?.render(&sheet))?;
    serialize(&outcome, "Failed to serialize rendered chord sheet")
}

/// Transpose one chord symbol, spelling the result for `target_key` when
/// given
#[wasm_bindgen(js_name = transposeChord)]
pub fn transpose_chord(symbol: &str, semitones: i32, target_key: Option<String>) -> Result<String, JsValue> {
    let key = non_blank(target_key)
        .map(|name| parse_key(&name))
        .transpose()
        .map_err(app_error)?;
    transpose_symbol(symbol, semitones, key.as_ref()).map_err(app_error)
}

/// Signed semitone distance between two keys, in -5..=6
#[wasm_bindgen(js_name = keyDistance)]
pub fn key_distance(from: &str, to: &str) -> Result<i32, JsValue> {
    let from = parse_key(from).map_err(app_error)?;
    let to = parse_key(to).map_err(app_error)?;
    Ok(distance_between(&from, &to))
}

/// Registered formats as `[{ id, name }]` in detection priority order
#[wasm_bindgen(js_name = listFormats)]
pub fn list_formats() -> Result<JsValue, JsValue> {
    let formats: Vec<FormatInfo> = with_engine(|engine| {
        Ok(engine
            .registry()
            .formats()
            .into_iter()
            .map(|format: NotationFormat| FormatInfo { id: format.as_str(), name: format.display_name() })
            .collect())
    })?;
    serialize(&formats, "Failed to serialize format list")
}

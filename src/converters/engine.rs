//! Conversion pipeline
//!
//! # Architecture
//!
//! ```text
//! text ─ Detect (no source format) ─ Parse ─ Transpose (target key) ─ Render ─ result
//! ```
//!
//! Every stage can add warnings. A stage error stops the pipeline and the
//! result comes back with `success == false`; nothing in here panics on user
//! input.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::detection::{detect_format, detect_key_from_chords, FormatDetectionResult, KeyDetectionResult};
use crate::errors::AppError;
use crate::formats::{FormatHandler, FormatRegistry};
use crate::models::{Chord, Chordsheet, Key, NotationFormat};
use crate::transposition::{key_distance, transpose_sheet};

/// What to convert and where to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub input: String,
    /// Detected when absent
    pub source_format: Option<NotationFormat>,
    pub target_format: NotationFormat,
    /// Overrides the key stated in the document
    pub source_key: Option<Key>,
    /// Transpose into this key
    pub target_key: Option<Key>,
}

impl ConversionRequest {
    pub fn new(input: impl Into<String>, target_format: NotationFormat) -> Self {
        Self {
            input: input.into(),
            source_format: None,
            target_format,
            source_key: None,
            target_key: None,
        }
    }

    pub fn from_format(mut self, format: NotationFormat) -> Self {
        self.source_format = Some(format);
        self
    }

    pub fn from_key(mut self, key: Key) -> Self {
        self.source_key = Some(key);
        self
    }

    pub fn to_key(mut self, key: Key) -> Self {
        self.target_key = Some(key);
        self
    }
}

/// What happened along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub source_format: Option<NotationFormat>,
    pub target_format: Option<NotationFormat>,
    /// Present when the source format was detected
    pub format_detection: Option<FormatDetectionResult>,
    /// Present when the source key was detected
    pub key_detection: Option<KeyDetectionResult>,
    pub source_key: Option<Key>,
    pub target_key: Option<Key>,
    /// Semitones applied, when the sheet was transposed
    pub transposed_by: Option<i32>,
    pub section_count: usize,
    pub chord_count: usize,
    /// Chords respelled into canonical form ("C6/9 -> C6add9")
    pub normalized_chords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    pub output: String,
    pub errors: Vec<AppError>,
    pub warnings: Vec<String>,
    pub metadata: ConversionMetadata,
}

impl ConversionResult {
    fn failed(error: AppError) -> Self {
        log::error!("conversion failed: {}", error);
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }
}

/// Chords whose written form differs from the canonical symbol, in
/// document order without repeats. Nashville numbers are left out since
/// they are always written differently from their letter chord.
fn normalized_chords(sheet: &Chordsheet) -> Vec<String> {
    let mut seen = Vec::new();
    for chord in sheet.chords().filter(|c| c.nashville_number().is_none()) {
        let symbol = chord.symbol();
        if chord.original_notation() != symbol {
            let entry = format!("{} -> {}", chord.original_notation(), symbol);
            if !seen.contains(&entry) {
                seen.push(entry);
            }
        }
    }
    seen
}

pub struct ConversionEngine {
    registry: FormatRegistry,
    config: EngineConfig,
}

impl ConversionEngine {
    pub fn new(registry: FormatRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Engine with every built-in format
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(FormatRegistry::with_defaults(&config), config)
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered handler for `format`, or an UNSUPPORTED_FORMAT error
    pub fn handler(&self, format: NotationFormat) -> Result<&dyn FormatHandler, AppError> {
        self.registry.get(format).ok_or_else(|| {
            AppError::format(format!("Unsupported format: {}", format.display_name())).with_code("UNSUPPORTED_FORMAT")
        })
    }

    /// Run the whole pipeline. Always returns a result; failures are in
    /// `errors` with `success == false`.
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        let mut result = ConversionResult::default();
        result.metadata.target_format = Some(request.target_format);

        match self.run(request, &mut result) {
            Ok(output) => {
                result.output = output;
                result.success = true;
            }
            Err(error) => {
                log::error!("conversion failed: {}", error);
                result.errors.push(error);
            }
        }
        result
    }

    /// Convert with formats and keys given by name ("chordpro", "F#m").
    /// Names that do not resolve fail the conversion before it starts.
    pub fn convert_named(
        &self,
        input: &str,
        source_format: Option<&str>,
        target_format: &str,
        source_key: Option<&str>,
        target_key: Option<&str>,
    ) -> ConversionResult {
        match Self::request_from_names(input, source_format, target_format, source_key, target_key) {
            Ok(request) => self.convert(&request),
            Err(error) => ConversionResult::failed(error),
        }
    }

    fn request_from_names(
        input: &str,
        source_format: Option<&str>,
        target_format: &str,
        source_key: Option<&str>,
        target_key: Option<&str>,
    ) -> Result<ConversionRequest, AppError> {
        let parse_format = |name: &str| {
            name.parse::<NotationFormat>()
                .map_err(|e| AppError::format(e).with_code("UNSUPPORTED_FORMAT"))
        };
        let parse_key = |name: &str| name.parse::<Key>().map_err(AppError::from);

        Ok(ConversionRequest {
            input: input.to_string(),
            source_format: source_format.map(parse_format).transpose()?,
            target_format: parse_format(target_format)?,
            source_key: source_key.map(parse_key).transpose()?,
            target_key: target_key.map(parse_key).transpose()?,
        })
    }

    fn run(&self, request: &ConversionRequest, result: &mut ConversionResult) -> Result<String, AppError> {
        let renderer = self.handler(request.target_format)?;

        // Detect
        let source_format = match request.source_format {
            Some(format) => format,
            None => {
                let detection = detect_format(&request.input);
                log::debug!("convert: detected {} ({:.2})", detection.format, detection.confidence);
                if detection.confidence < self.config.detection.confidence_floor {
                    result.warnings.push(format!(
                        "Source format guessed as {} with low confidence ({:.0}%)",
                        detection.format.display_name(),
                        detection.confidence * 100.0
                    ));
                }
                let format = detection.format;
                result.metadata.format_detection = Some(detection);
                format
            }
        };
        result.metadata.source_format = Some(source_format);

        // Parse
        let parsed = self.handler(source_format)?.parse(&request.input)?;
        result.warnings.extend(parsed.warnings);
        if parsed.sheet.is_empty() {
            return Err(AppError::parse(format!(
                "No chord sheet content found in {} input",
                source_format.display_name()
            ))
            .with_code("NO_CONTENT")
            .with_context(source_format.as_str()));
        }
        let mut sheet = parsed.sheet;
        result.metadata.normalized_chords = normalized_chords(&sheet);
        if let Some(key) = request.source_key {
            sheet.original_key = Some(key);
        }

        // Transpose
        if let Some(target_key) = request.target_key {
            sheet = self.transpose(sheet, target_key, result);
        }
        result.metadata.source_key = result.metadata.source_key.or(sheet.original_key);

        // Render
        let rendered = renderer.render(&sheet)?;
        result.warnings.extend(rendered.warnings);

        result.metadata.section_count = sheet.sections.len();
        result.metadata.chord_count = sheet.chord_count();
        log::debug!(
            "convert: {} -> {}, {} sections, {} chords",
            source_format,
            request.target_format,
            result.metadata.section_count,
            result.metadata.chord_count
        );
        Ok(rendered.text)
    }

    /// Move the sheet into `target`. The source key is the sheet's own key,
    /// or else detected from its chords. The tonic moves to `target`'s tonic
    /// and the song keeps its own mode. Without a source key the sheet comes
    /// back as it was.
    fn transpose(&self, sheet: Chordsheet, target: Key, result: &mut ConversionResult) -> Chordsheet {
        let source = match sheet.original_key {
            Some(key) => Some(key),
            None => {
                let chords: Vec<&Chord> = sheet.chords().collect();
                let detection = detect_key_from_chords(&chords);
                let key = if detection.confidence > 0.0 && detection.analysis.diatonic_fit > 0.0 {
                    if detection.confidence < self.config.detection.confidence_floor {
                        result.warnings.push(format!(
                            "Source key guessed as {} with low confidence ({:.0}%)",
                            detection.key,
                            detection.confidence * 100.0
                        ));
                    }
                    Some(detection.key)
                } else {
                    None
                };
                result.metadata.key_detection = Some(detection);
                key
            }
        };

        match source {
            Some(from) => {
                result.metadata.source_key = Some(from);
                let written = Key { tonic: target.tonic, is_minor: from.is_minor };
                if written != target {
                    result.warnings.push(format!(
                        "Song is in {} but {} was requested; writing {} to keep the mode",
                        from, target, written
                    ));
                }
                result.metadata.target_key = Some(written);
                if from == written {
                    return sheet;
                }
                let semitones = key_distance(&from, &written);
                log::debug!("convert: transposing {} -> {} ({:+})", from, written, semitones);
                result.metadata.transposed_by = Some(semitones);
                transpose_sheet(&sheet, &from, &written)
            }
            None => {
                if sheet.chord_count() > 0 {
                    result
                        .warnings
                        .push(format!("Cannot determine the source key; not transposing to {}", target));
                }
                sheet
            }
        }
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorType;

    fn key(name: &str) -> Key {
        name.parse().unwrap()
    }

    #[test]
    fn test_chordpro_to_onsong() {
        let engine = ConversionEngine::default();
        let result = engine.convert_named("{title: Amazing Grace}\n[C]Amazing [F]grace", Some("chordpro"), "onsong", None, None);
        assert!(result.success, "errors: {:?}", result.errors);
        assert!(result.output.lines().any(|l| l == "Amazing Grace"));
        assert!(result.output.contains("[C]Amazing [F]grace"));
        assert_eq!(result.metadata.chord_count, 2);
    }

    #[test]
    fn test_detects_source_format() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("{title: Song}\n{soc}\n[G]Hi\n{eoc}\n", NotationFormat::PlanningCenter);
        let result = engine.convert(&request);
        assert!(result.success);
        assert_eq!(result.metadata.source_format, Some(NotationFormat::ChordPro));
        assert!(result.metadata.format_detection.is_some());
        assert!(result.output.contains("CHORUS"));
    }

    #[test]
    fn test_transpose_with_stated_key() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("{key: C}\n[C]One [F]two [G]three", NotationFormat::ChordPro)
            .from_format(NotationFormat::ChordPro)
            .to_key(key("D"));
        let result = engine.convert(&request);
        assert!(result.success);
        assert!(result.output.contains("{key: D}"));
        assert!(result.output.contains("[D]One [G]two [A]three"));
        assert_eq!(result.metadata.transposed_by, Some(2));
    }

    #[test]
    fn test_transpose_with_detected_key() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("[G]One [C]two [D]three [G]four", NotationFormat::ChordPro)
            .from_format(NotationFormat::ChordPro)
            .to_key(key("F"));
        let result = engine.convert(&request);
        assert!(result.success);
        assert_eq!(result.metadata.key_detection.as_ref().map(|d| d.key.name()), Some("G".to_string()));
        assert!(result.output.contains("[F]One [Bb]two [C]three"));
        assert_eq!(result.metadata.transposed_by, Some(-2));
    }

    #[test]
    fn test_invalid_names_fail() {
        let engine = ConversionEngine::default();
        let result = engine.convert_named("[C]Hi", None, "musicxml", None, None);
        assert!(!result.success);
        assert_eq!(result.errors[0].error_type, ErrorType::FormatError);

        let result = engine.convert_named("[C]Hi", None, "onsong", None, Some("H#"));
        assert!(!result.success);
        assert_eq!(result.errors[0].error_type, ErrorType::ValidationError);
    }

    #[test]
    fn test_unregistered_target_is_fatal() {
        let engine = ConversionEngine::new(FormatRegistry::new(), EngineConfig::default());
        let result = engine.convert(&ConversionRequest::new("[C]Hi", NotationFormat::OnSong));
        assert!(!result.success);
        assert_eq!(result.errors[0].code.as_deref(), Some("UNSUPPORTED_FORMAT"));
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("   \n", NotationFormat::OnSong).from_format(NotationFormat::ChordPro);
        let result = engine.convert(&request);
        assert!(!result.success);
        assert_eq!(result.errors[0].error_type, ErrorType::ParseError);
    }

    #[test]
    fn test_sheet_without_content_is_fatal() {
        let engine = ConversionEngine::default();
        for input in ["# only a comment\n", "{new_page}\n"] {
            let request = ConversionRequest::new(input, NotationFormat::OnSong).from_format(NotationFormat::ChordPro);
            let result = engine.convert(&request);
            assert!(!result.success, "converted {:?}", input);
            assert!(result.output.is_empty());
            assert_eq!(result.errors[0].error_type, ErrorType::ParseError);
            assert_eq!(result.errors[0].code.as_deref(), Some("NO_CONTENT"));
            assert!(!result.errors[0].recoverable);
        }
    }

    #[test]
    fn test_unknown_source_key_leaves_sheet_alone() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("[Caug]One [Faug]two", NotationFormat::ChordPro)
            .from_format(NotationFormat::ChordPro)
            .to_key(key("D"));
        let result = engine.convert(&request);
        assert!(result.success);
        assert!(result.warnings.iter().any(|w| w.contains("Cannot determine the source key")));
        assert!(!result.output.contains("{key:"));
        assert!(result.output.contains("[Caug]One [Faug]two"));
        assert_eq!(result.metadata.transposed_by, None);
        assert_eq!(result.metadata.target_key, None);
    }

    #[test]
    fn test_transpose_keeps_source_mode() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("{key: Am}\n[Am]One [Dm]two [E]three", NotationFormat::ChordPro)
            .from_format(NotationFormat::ChordPro)
            .to_key(key("C"));
        let result = engine.convert(&request);
        assert!(result.success);
        assert!(result.output.contains("{key: Cm}"));
        assert!(!result.output.contains("{key: C}"));
        assert!(result.output.contains("[Cm]One [Fm]two [Ab]three"), "output:\n{}", result.output);
        assert_eq!(result.metadata.target_key, Some(key("Cm")));
        assert_eq!(result.metadata.transposed_by, Some(3));
        assert!(result.warnings.iter().any(|w| w.contains("keep the mode")));
    }

    #[test]
    fn test_warnings_collected() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("[X]Test [C]chord", NotationFormat::OnSong).from_format(NotationFormat::ChordPro);
        let result = engine.convert(&request);
        assert!(result.success);
        assert_eq!(result.warnings, vec!["Line 1: Skipping invalid chord: \"X\"".to_string()]);
    }

    #[test]
    fn test_normalized_chords_reported() {
        let engine = ConversionEngine::default();
        let request = ConversionRequest::new("[C6/9]Hi [Dsus]there", NotationFormat::ChordPro).from_format(NotationFormat::ChordPro);
        let result = engine.convert(&request);
        assert_eq!(result.metadata.normalized_chords, vec!["C6/9 -> C6add9", "Dsus -> Dsus4"]);
    }
}

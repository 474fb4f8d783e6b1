//! Error types for chord sheet processing
//!
//! `AppError` is the error value handed to callers (and serialized across the
//! WASM boundary). Token-level failures use the smaller `ChordParseError` and
//! `KeyParseError` enums, which parsers turn into recoverable warnings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error category, serialized in SCREAMING_SNAKE_CASE (`PARSE_ERROR`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    ParseError,
    ConversionError,
    TransposeError,
    FormatError,
    ValidationError,
    /// Raised by storage collaborators, never by the core itself
    FileError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ParseError => "PARSE_ERROR",
            ErrorType::ConversionError => "CONVERSION_ERROR",
            ErrorType::TransposeError => "TRANSPOSE_ERROR",
            ErrorType::FormatError => "FORMAT_ERROR",
            ErrorType::ValidationError => "VALIDATION_ERROR",
            ErrorType::FileError => "FILE_ERROR",
        }
    }
}

/// Error reported to callers of the conversion pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{}: {message}", error_type.as_str())]
pub struct AppError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
    pub context: Option<String>,
    pub recoverable: bool,
    pub code: Option<String>,
}

impl AppError {
    /// Create a fatal (non-recoverable) error
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
            recoverable: false,
            code: None,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorType::ParseError, message)
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorType::ConversionError, message)
    }

    pub fn transpose(message: impl Into<String>) -> Self {
        Self::new(ErrorType::TransposeError, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorType::FormatError, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::ValidationError, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }
}

/// Failure to read a single chord token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordParseError {
    #[error("empty chord token")]
    Empty,

    /// First character is not a note letter A-G
    #[error("invalid chord root in \"{0}\"")]
    InvalidRoot(String),

    /// Text after the slash is not a note
    #[error("invalid bass note in \"{0}\"")]
    InvalidBass(String),

    /// Nashville number outside 1-7
    #[error("invalid scale degree in \"{0}\"")]
    InvalidDegree(String),
}

/// Failure to read a key name such as "F#m"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid key: '{0}'. Expected a note name with optional 'm' (e.g. C, F#, Bbm)")]
pub struct KeyParseError(pub String);

impl From<ChordParseError> for AppError {
    fn from(err: ChordParseError) -> Self {
        AppError::parse(err.to_string()).recoverable()
    }
}

impl From<KeyParseError> for AppError {
    fn from(err: KeyParseError) -> Self {
        AppError::validation(err.to_string()).with_code("INVALID_KEY")
    }
}

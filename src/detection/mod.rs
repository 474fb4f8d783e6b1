//! Format and key detection
//!
//! Both detectors always return a best guess with a confidence in 0..=1;
//! deciding what a low confidence means is left to the caller.

pub mod format;
pub mod key;

// Re-export commonly used types
pub use format::{detect_format, FormatDetectionResult};
pub use key::{detect_key, detect_key_from_chords, KeyAnalysis, KeyDetectionResult};

//! Format converters
//!
//! The conversion engine ties detection, parsing, transposition and
//! rendering together behind one call.

pub mod engine;

// Re-export for convenience
pub use engine::{ConversionEngine, ConversionMetadata, ConversionRequest, ConversionResult};

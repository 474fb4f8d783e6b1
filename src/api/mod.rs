//! Chord sheet WASM API
//!
//! JavaScript-facing surface over the pure Rust core.
//!
//! # Module Structure
//!
//! - `helpers`: serialization, argument parsing and error conversion
//! - `chordsheet`: the exported functions (`detectFormat`, `convertChordsheet`, ...)

pub mod helpers;
pub mod chordsheet;

pub use chordsheet::{
    configure_engine, convert_chordsheet, detect_format, detect_key, key_distance, list_formats,
    parse_chordsheet, render_chordsheet, transpose_chord,
};

//! Chord Sheet WASM Module
//!
//! Converts chord sheets between ChordPro, OnSong, Songbook Pro, Planning
//! Center, guitar tab and Nashville Number System notation, transposing on
//! the way. Every notation is parsed into one canonical `Chordsheet` and
//! rendered back out from it.

pub mod errors;
pub mod config;
pub mod diagnostics;
pub mod models;
pub mod parse;
pub mod transposition;
pub mod detection;
pub mod formats;
pub mod converters;
pub mod api;

// Re-export commonly used types
pub use config::EngineConfig;
pub use converters::{ConversionEngine, ConversionMetadata, ConversionRequest, ConversionResult};
pub use detection::{detect_format, detect_key, FormatDetectionResult, KeyDetectionResult};
pub use errors::{AppError, ErrorType};
pub use formats::{FormatHandler, FormatRegistry, ParseOutcome, RenderOutcome};
pub use models::{Chord, Chordsheet, Key, NotationFormat};
pub use transposition::{key_distance, transpose_chord};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only when a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Chord sheet WASM module initialized");
}

//! Format parsers and renderers
//!
//! Each notation implements `FormatHandler`: raw text to `Chordsheet` and
//! back. The `FormatRegistry` maps a `NotationFormat` to its handler, so
//! adding a notation means registering one more handler.
//!
//! # Basic Usage
//!
//! ```ignore
//! use chordsheet_wasm::formats::FormatRegistry;
//! use chordsheet_wasm::models::NotationFormat;
//!
//! let registry = FormatRegistry::with_defaults(&Default::default());
//! let chordpro = registry.get(NotationFormat::ChordPro).unwrap();
//! let parsed = chordpro.parse("{title: Song}\n[C]Hello")?;
//! let onsong = registry.get(NotationFormat::OnSong).unwrap();
//! println!("{}", onsong.render(&parsed.sheet)?.text);
//! ```

pub mod layout;
pub mod metadata;
pub mod chordpro;
pub mod onsong;
pub mod songbook_pro;
pub mod nashville;
pub mod guitar_tabs;
pub mod planning_center;

use serde::Serialize;
use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::models::{Chordsheet, NotationFormat};

pub use chordpro::ChordProFormat;
pub use guitar_tabs::GuitarTabsFormat;
pub use nashville::NashvilleFormat;
pub use onsong::OnSongFormat;
pub use planning_center::PlanningCenterFormat;
pub use songbook_pro::SongbookProFormat;

/// Parsed document plus recoverable problems met on the way
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub sheet: Chordsheet,
    pub warnings: Vec<String>,
}

/// Rendered text plus anything the target could not represent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutcome {
    pub text: String,
    pub warnings: Vec<String>,
}

/// One notation's parse/render pair
pub trait FormatHandler: Send + Sync {
    fn format(&self) -> NotationFormat;

    /// Raw text to canonical document. Fails only when nothing at all can be
    /// recognized; token-level problems become warnings.
    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError>;

    /// Canonical document to raw text
    fn render(&self, sheet: &Chordsheet) -> Result<RenderOutcome, AppError>;
}

/// Reject input with no content before any format-specific work
pub(crate) fn ensure_not_blank(text: &str, format: NotationFormat) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::parse(format!("Cannot parse empty {} input", format.display_name()))
            .with_code("EMPTY_INPUT"));
    }
    Ok(())
}

/// Lookup table from format to handler
pub struct FormatRegistry {
    handlers: HashMap<NotationFormat, Box<dyn FormatHandler>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Registry with every built-in notation
    pub fn with_defaults(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        let spacing = &config.spacing;
        registry.register(Box::new(ChordProFormat::new(spacing.rules_for(NotationFormat::ChordPro))));
        registry.register(Box::new(OnSongFormat::new(spacing.rules_for(NotationFormat::OnSong))));
        registry.register(Box::new(SongbookProFormat::new(spacing.rules_for(NotationFormat::SongbookPro))));
        registry.register(Box::new(PlanningCenterFormat::new(spacing.rules_for(NotationFormat::PlanningCenter))));
        registry.register(Box::new(GuitarTabsFormat::new(spacing.rules_for(NotationFormat::GuitarTabs))));
        registry.register(Box::new(NashvilleFormat::new(
            spacing.rules_for(NotationFormat::Nashville),
            config.default_key,
        )));
        registry
    }

    /// Add or replace the handler for its format
    pub fn register(&mut self, handler: Box<dyn FormatHandler>) {
        self.handlers.insert(handler.format(), handler);
    }

    pub fn get(&self, format: NotationFormat) -> Option<&dyn FormatHandler> {
        self.handlers.get(&format).map(|h| h.as_ref())
    }

    /// Registered formats in priority order
    pub fn formats(&self) -> Vec<NotationFormat> {
        NotationFormat::ALL
            .into_iter()
            .filter(|f| self.handlers.contains_key(f))
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_all_formats() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.formats(), NotationFormat::ALL.to_vec());
        for format in NotationFormat::ALL {
            assert_eq!(registry.get(format).unwrap().format(), format);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = FormatRegistry::new();
        assert!(registry.get(NotationFormat::OnSong).is_none());
        assert!(registry.formats().is_empty());
    }

    #[test]
    fn test_blank_input_rejected() {
        let registry = FormatRegistry::default();
        for format in NotationFormat::ALL {
            let err = registry.get(format).unwrap().parse("  \n\n ").unwrap_err();
            assert_eq!(err.error_type, crate::errors::ErrorType::ParseError);
            assert!(!err.recoverable);
        }
    }
}

//! Engine configuration
//!
//! Everything tunable lives here so renderers and detectors read one table
//! instead of hard-coding constants. Loadable from JSON or YAML; every field
//! has a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::models::{Key, NotationFormat};

/// Blank lines a renderer emits at section boundaries.
///
/// Counts are empty lines, not newline characters. A gap of `n` puts
/// `n + 1` newlines between the last line of one section and the header of
/// the next: `1` yields `"...grace\n\nChorus:"`, `2` yields
/// `"...grace\n\n\nChorus:"`. Zero runs the sections together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacingRules {
    /// Empty lines between two ordinary sections
    pub between_sections: usize,
    /// Empty lines when an annotation line touches the boundary
    pub around_annotations: usize,
}

impl SpacingRules {
    pub const fn new(between_sections: usize, around_annotations: usize) -> Self {
        Self { between_sections, around_annotations }
    }

    /// Blank lines between `prev` and `next`
    pub fn gap(&self, prev_ends_with_annotation: bool, next_starts_with_annotation: bool) -> usize {
        if prev_ends_with_annotation || next_starts_with_annotation {
            self.around_annotations
        } else {
            self.between_sections
        }
    }
}

impl Default for SpacingRules {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

/// Per-format spacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpacingTable(BTreeMap<NotationFormat, SpacingRules>);

impl SpacingTable {
    pub fn rules_for(&self, format: NotationFormat) -> SpacingRules {
        self.0.get(&format).copied().unwrap_or_default()
    }

    pub fn set(&mut self, format: NotationFormat, rules: SpacingRules) {
        self.0.insert(format, rules);
    }
}

impl Default for SpacingTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        // Environments already delimit ChordPro sections
        table.insert(NotationFormat::ChordPro, SpacingRules::new(1, 1));
        table.insert(NotationFormat::OnSong, SpacingRules::new(1, 2));
        table.insert(NotationFormat::SongbookPro, SpacingRules::new(1, 2));
        table.insert(NotationFormat::PlanningCenter, SpacingRules::new(1, 2));
        table.insert(NotationFormat::GuitarTabs, SpacingRules::new(1, 2));
        table.insert(NotationFormat::Nashville, SpacingRules::new(1, 2));
        Self(table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionConfig {
    /// Below this the engine warns that the detected format is a guess
    pub confidence_floor: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { confidence_floor: 0.3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub spacing: SpacingTable,
    /// Key assumed for Nashville charts that do not state one
    pub default_key: Key,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            spacing: SpacingTable::default(),
            default_key: Key::c_major(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(source: &str) -> Result<Self, AppError> {
        serde_json::from_str(source)
            .map_err(|e| AppError::validation(format!("Invalid engine config: {}", e)).with_code("CONFIG_JSON"))
    }

    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        serde_yaml::from_str(source)
            .map_err(|e| AppError::validation(format!("Invalid engine config: {}", e)).with_code("CONFIG_YAML"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.spacing.rules_for(NotationFormat::OnSong).gap(false, false), 1);
        assert_eq!(config.spacing.rules_for(NotationFormat::OnSong).gap(true, false), 2);
        assert_eq!(config.spacing.rules_for(NotationFormat::ChordPro).gap(false, true), 1);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(
            r#"{"detection": {"confidenceFloor": 0.5}, "spacing": {"onsong": {"betweenSections": 2}}}"#,
        )
        .unwrap();
        assert_eq!(config.detection.confidence_floor, 0.5);
        let rules = config.spacing.rules_for(NotationFormat::OnSong);
        assert_eq!(rules.between_sections, 2);
        assert_eq!(rules.around_annotations, 2);
        // Formats missing from a replaced table fall back to the defaults
        assert_eq!(config.spacing.rules_for(NotationFormat::Nashville), SpacingRules::default());
    }

    #[test]
    fn test_from_yaml() {
        let config = EngineConfig::from_yaml("defaultKey: G\ndetection:\n  confidenceFloor: 0.25\n").unwrap();
        assert_eq!(config.default_key.name(), "G");
        assert_eq!(config.detection.confidence_floor, 0.25);
    }

    #[test]
    fn test_invalid_config() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.error_type, crate::errors::ErrorType::ValidationError);
    }
}

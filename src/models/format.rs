//! Supported chord sheet notations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotationFormat {
    #[serde(rename = "chordpro")]
    ChordPro,
    #[serde(rename = "onsong")]
    OnSong,
    #[serde(rename = "songbook_pro")]
    SongbookPro,
    PlanningCenter,
    GuitarTabs,
    Nashville,
}

impl NotationFormat {
    /// All formats in detection tie-break priority order
    pub const ALL: [NotationFormat; 6] = [
        NotationFormat::ChordPro,
        NotationFormat::OnSong,
        NotationFormat::SongbookPro,
        NotationFormat::PlanningCenter,
        NotationFormat::GuitarTabs,
        NotationFormat::Nashville,
    ];

    /// Identifier used in serialized requests ("chordpro", "guitar_tabs", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            NotationFormat::ChordPro => "chordpro",
            NotationFormat::OnSong => "onsong",
            NotationFormat::SongbookPro => "songbook_pro",
            NotationFormat::PlanningCenter => "planning_center",
            NotationFormat::GuitarTabs => "guitar_tabs",
            NotationFormat::Nashville => "nashville",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NotationFormat::ChordPro => "ChordPro",
            NotationFormat::OnSong => "OnSong",
            NotationFormat::SongbookPro => "Songbook Pro",
            NotationFormat::PlanningCenter => "Planning Center",
            NotationFormat::GuitarTabs => "Guitar Tabs",
            NotationFormat::Nashville => "Nashville Number System",
        }
    }

    /// Position in the tie-break order (lower wins)
    pub fn priority(&self) -> usize {
        NotationFormat::ALL.iter().position(|f| f == self).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for NotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "chordpro" | "cho" | "crd" => Ok(NotationFormat::ChordPro),
            "onsong" => Ok(NotationFormat::OnSong),
            "songbookpro" | "songbook" | "sbp" => Ok(NotationFormat::SongbookPro),
            "planningcenter" | "pco" => Ok(NotationFormat::PlanningCenter),
            "guitartabs" | "guitartab" | "tabs" | "tab" => Ok(NotationFormat::GuitarTabs),
            "nashville" | "nashvillenumbersystem" | "nns" => Ok(NotationFormat::Nashville),
            _ => Err(format!("Unsupported format: '{}'", s)),
        }
    }
}

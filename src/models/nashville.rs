/// Nashville Number System scale degrees
///
/// A number is a scale degree (1-7) with an optional accidental and a
/// quality marker. Written numbers are major unless marked: "6m" (or "6-")
/// is minor, "7dim" (or "7°") diminished. `default_quality` gives the
/// diatonic triad for the degree, which key detection relies on.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::chord::Quality;
use super::pitch::Accidental;
use crate::errors::ChordParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NashvilleNumber {
    degree: u8,
    accidental: Accidental,
    quality: Quality,
}

impl NashvilleNumber {
    pub fn new(degree: u8, accidental: Accidental, quality: Quality) -> Result<Self, ChordParseError> {
        if !(1..=7).contains(&degree) {
            return Err(ChordParseError::InvalidDegree(degree.to_string()));
        }
        Ok(Self { degree, accidental, quality })
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Diatonic triad quality of a major-scale degree
    pub fn default_quality(degree: u8) -> Quality {
        match degree {
            2 | 3 | 6 => Quality::Minor,
            7 => Quality::Diminished,
            _ => Quality::Major,
        }
    }
}

impl fmt::Display for NashvilleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.accidental.as_str(), self.degree, self.quality.marker())
    }
}

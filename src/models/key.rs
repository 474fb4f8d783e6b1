/// Musical keys (tonic + mode) and their conventional spelling
///
/// Every key maps to a fixed accidental preference: flat keys (F, Bb, Eb,
/// Ab, Db, Gb and their relative minors) spell chromatic notes with flats,
/// everything else with sharps. A tonic written with an accidental forces
/// that accidental family (so "Gb" spells flats even though F# would not).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::pitch::{Accidental, ChordRoot, Letter, PitchClass};
use crate::errors::KeyParseError;

/// Flat preference per major-key pitch class
/// 0=C, 1=Db, 2=D, 3=Eb, 4=E, 5=F, 6=F#, 7=G, 8=Ab, 9=A, 10=Bb, 11=B
const MAJOR_PREFERS_FLATS: [bool; 12] = [
    false, true, false, true, false, true, false, false, true, false, true, false,
];

/// Major scale intervals in semitones
pub const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Natural minor scale intervals in semitones
pub const MINOR_SCALE: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Serialized as its name ("F#m")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    pub tonic: ChordRoot,
    pub is_minor: bool,
}

impl Key {
    pub fn major(tonic: ChordRoot) -> Self {
        Self { tonic, is_minor: false }
    }

    pub fn minor(tonic: ChordRoot) -> Self {
        Self { tonic, is_minor: true }
    }

    /// C major, the fallback key
    pub fn c_major() -> Self {
        Self::major(ChordRoot::new(Letter::C, Accidental::Natural))
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.tonic.pitch_class()
    }

    /// Pitch class of the relative major tonic
    pub fn relative_major(&self) -> PitchClass {
        if self.is_minor {
            self.pitch_class().transpose(3)
        } else {
            self.pitch_class()
        }
    }

    /// Whether chromatic notes in this key are spelled with flats
    pub fn prefers_flats(&self) -> bool {
        match self.tonic.accidental {
            Accidental::Flat => true,
            Accidental::Sharp => false,
            Accidental::Natural => MAJOR_PREFERS_FLATS[self.relative_major().index() as usize],
        }
    }

    /// Spell a pitch class the way this key conventionally writes it
    pub fn spell(&self, pitch: PitchClass) -> ChordRoot {
        if pitch == self.pitch_class() {
            return self.tonic;
        }
        ChordRoot::from_pitch_class(pitch, self.prefers_flats())
    }

    /// The key moved by `semitones`, tonic respelled by the target table
    pub fn transpose(&self, semitones: i32) -> Key {
        let pitch = self.pitch_class().transpose(semitones);
        // Spell the new tonic via its own major/minor table entry
        let major_pc = if self.is_minor { pitch.transpose(3) } else { pitch };
        let prefer_flats = MAJOR_PREFERS_FLATS[major_pc.index() as usize];
        Key {
            tonic: ChordRoot::from_pitch_class(pitch, prefer_flats),
            is_minor: self.is_minor,
        }
    }

    /// Pitch classes of the seven scale degrees
    pub fn scale(&self) -> [PitchClass; 7] {
        let intervals = if self.is_minor { MINOR_SCALE } else { MAJOR_SCALE };
        let tonic = self.pitch_class();
        intervals.map(|i| tonic.transpose(i as i32))
    }

    pub fn name(&self) -> String {
        format!("{}{}", self.tonic, if self.is_minor { "m" } else { "" })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<Key> for String {
    fn from(key: Key) -> String {
        key.name()
    }
}

impl TryFrom<String> for Key {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Case-insensitive letter: "bb" reads as Bb
        let mut chars = trimmed.chars();
        let normalized = match chars.next() {
            Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => return Err(KeyParseError(s.to_string())),
        };

        let (tonic, consumed) =
            ChordRoot::read_prefix(&normalized).ok_or_else(|| KeyParseError(s.to_string()))?;
        let mode = normalized[consumed..].trim().to_lowercase();

        match mode.as_str() {
            "" | "maj" | "major" => Ok(Key::major(tonic)),
            "m" | "min" | "minor" | "-" => Ok(Key::minor(tonic)),
            _ => Err(KeyParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_str() {
        assert_eq!(key("C"), Key::c_major());
        assert!(key("Am").is_minor);
        assert!(key("F# minor").is_minor);
        assert_eq!(key("bb").tonic.to_string(), "Bb");
        assert_eq!(key("Ebmin").name(), "Ebm");
        assert!("H".parse::<Key>().is_err());
        assert!("Cmaj7".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_spelling_table() {
        assert!(key("F").prefers_flats());
        assert!(key("Dm").prefers_flats());
        assert!(!key("D").prefers_flats());
        assert!(!key("Em").prefers_flats());
        assert!(key("Gb").prefers_flats());
        assert!(!key("F#").prefers_flats());
    }

    #[test]
    fn test_spell_in_key() {
        let pc = PitchClass::new(10);
        assert_eq!(key("F").spell(pc).to_string(), "Bb");
        assert_eq!(key("B").spell(pc).to_string(), "A#");
        assert_eq!(key("Gb").spell(PitchClass::new(6)).to_string(), "Gb");
    }

    #[test]
    fn test_scale() {
        let names: Vec<String> = key("D").scale().iter().map(|p| key("D").spell(*p).to_string()).collect();
        assert_eq!(names, vec!["D", "E", "F#", "G", "A", "B", "C#"]);
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(serde_json::to_string(&key("F#m")).unwrap(), "\"F#m\"");
        let parsed: Key = serde_json::from_str("\"Bb\"").unwrap();
        assert_eq!(parsed, key("Bb"));
        assert!(serde_json::from_str::<Key>("\"Q\"").is_err());
    }

    #[test]
    fn test_transpose_key() {
        assert_eq!(key("C").transpose(5).name(), "F");
        assert_eq!(key("C").transpose(1).name(), "Db");
        assert_eq!(key("Am").transpose(2).name(), "Bm");
        assert_eq!(key("Am").transpose(-4).name(), "Fm");
    }
}

/// Pitch classes and spelled note names
///
/// A `PitchClass` is one of the 12 chromatic positions (0=C ... 11=B).
/// A `ChordRoot` is a spelled note: letter plus accidental. Two roots with
/// different spellings (C# and Db) share a pitch class.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ChordParseError;

/// Canonical spelling per pitch class
const CANONICAL_NAMES: [&str; 12] = ["C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"];

/// Sharp spellings: 0=C, 1=C#, 2=D, 3=D#, 4=E, 5=F, 6=F#, 7=G, 8=G#, 9=A, 10=A#, 11=B
const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Letter> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Semitone offset of the natural letter from C
    pub fn semitones(&self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }
}

/// Single accidental applied to a letter or scale degree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    pub fn from_char(c: char) -> Option<Accidental> {
        match c {
            '#' | '♯' => Some(Accidental::Sharp),
            'b' | '♭' => Some(Accidental::Flat),
            _ => None,
        }
    }

    pub fn offset(&self) -> i8 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// One of the 12 chromatic positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Build from any integer, wrapping into 0..12
    pub fn new(index: i32) -> Self {
        PitchClass(index.rem_euclid(12) as u8)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    /// Shift by a signed number of semitones: `(index + semitones) mod 12`
    pub fn transpose(&self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones)
    }

    /// Canonical spelling (C, C#, D, Eb, E, F, F#, G, Ab, A, Bb, B)
    pub fn canonical_name(&self) -> &'static str {
        CANONICAL_NAMES[self.0 as usize]
    }

    /// The other common spelling, or the canonical one for naturals
    pub fn enharmonic_name(&self) -> &'static str {
        let canonical = self.canonical_name();
        let sharp = SHARP_NAMES[self.0 as usize];
        if canonical == sharp {
            FLAT_NAMES[self.0 as usize]
        } else {
            sharp
        }
    }

    pub fn sharp_name(&self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }

    pub fn flat_name(&self) -> &'static str {
        FLAT_NAMES[self.0 as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// A spelled note name used as chord root or bass note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordRoot {
    pub letter: Letter,
    pub accidental: Accidental,
}

impl ChordRoot {
    pub fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::new(self.letter.semitones() as i32 + self.accidental.offset() as i32)
    }

    /// Spell a pitch class with sharps or flats
    pub fn from_pitch_class(pitch: PitchClass, prefer_flats: bool) -> Self {
        let name = if prefer_flats { pitch.flat_name() } else { pitch.sharp_name() };
        Self::read_prefix(name)
            .map(|(root, _)| root)
            .unwrap_or(ChordRoot::new(Letter::C, Accidental::Natural))
    }

    /// Spell a pitch class using the canonical table
    pub fn canonical(pitch: PitchClass) -> Self {
        Self::read_prefix(pitch.canonical_name())
            .map(|(root, _)| root)
            .unwrap_or(ChordRoot::new(Letter::C, Accidental::Natural))
    }

    /// Read a note name at the start of `s`.
    /// Returns the root and the number of bytes consumed.
    pub fn read_prefix(s: &str) -> Option<(ChordRoot, usize)> {
        let mut chars = s.chars();
        let first = chars.next()?;
        let letter = Letter::from_char(first)?;
        let mut consumed = first.len_utf8();
        let accidental = match chars.next() {
            Some(c) => match Accidental::from_char(c) {
                Some(acc) => {
                    consumed += c.len_utf8();
                    acc
                }
                None => Accidental::Natural,
            },
            None => Accidental::Natural,
        };
        Some((ChordRoot::new(letter, accidental), consumed))
    }
}

impl fmt::Display for ChordRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.accidental.as_str())
    }
}

impl FromStr for ChordRoot {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ChordRoot::read_prefix(s) {
            Some((root, consumed)) if consumed == s.len() => Ok(root),
            _ if s.is_empty() => Err(ChordParseError::Empty),
            _ => Err(ChordParseError::InvalidRoot(s.to_string())),
        }
    }
}

//! Chord value objects
//!
//! A `Chord` is immutable once built: the parser and the transposer each
//! construct new values rather than editing existing ones.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::nashville::NashvilleNumber;
use super::pitch::{Accidental, ChordRoot};

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
    /// Root and fifth only ("C5")
    Power,
}

impl Quality {
    /// Marker written directly after the root
    pub fn marker(&self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Minor => "m",
            Quality::Diminished => "dim",
            Quality::Augmented => "aug",
            Quality::Power => "5",
        }
    }
}

/// One chord extension, kept in the order it was written
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Extension {
    /// Plain number: 6, 7, 9, 11, 13
    Dominant(u8),
    /// maj7, maj9, maj13
    Major(u8),
    /// sus2, sus4
    Sus(u8),
    /// add9, add11, add2
    Add(u8),
    /// b5, #5, b9, #9, #11, b13
    Altered(Accidental, u8),
    /// Unrecognized trailing text, reproduced verbatim
    Other(String),
}

impl Extension {
    pub fn is_other(&self) -> bool {
        matches!(self, Extension::Other(_))
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::Dominant(n) => write!(f, "{}", n),
            Extension::Major(n) => write!(f, "maj{}", n),
            Extension::Sus(n) => write!(f, "sus{}", n),
            Extension::Add(n) => write!(f, "add{}", n),
            Extension::Altered(acc, n) => write!(f, "{}{}", acc.as_str(), n),
            Extension::Other(text) => write!(f, "{}", text),
        }
    }
}

/// Write quality marker, extensions and nothing else
pub(crate) fn write_suffix(f: &mut impl fmt::Write, quality: Quality, extensions: &[Extension]) -> fmt::Result {
    write!(f, "{}", quality.marker())?;
    for ext in extensions {
        write!(f, "{}", ext)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    root: ChordRoot,
    quality: Quality,
    extensions: Vec<Extension>,
    bass_note: Option<ChordRoot>,
    position: usize,
    original_notation: String,
    nashville_number: Option<NashvilleNumber>,
}

impl Chord {
    /// Build a chord whose notation is generated from its parts
    pub fn new(root: ChordRoot, quality: Quality, extensions: Vec<Extension>, bass_note: Option<ChordRoot>) -> Self {
        let mut chord = Self {
            root,
            quality,
            extensions,
            bass_note,
            position: 0,
            original_notation: String::new(),
            nashville_number: None,
        };
        chord.original_notation = chord.symbol();
        chord
    }

    /// Build a chord read from source text, keeping the verbatim token
    pub fn parsed(
        root: ChordRoot,
        quality: Quality,
        extensions: Vec<Extension>,
        bass_note: Option<ChordRoot>,
        original_notation: impl Into<String>,
    ) -> Self {
        Self {
            root,
            quality,
            extensions,
            bass_note,
            position: 0,
            original_notation: original_notation.into(),
            nashville_number: None,
        }
    }

    pub fn with_position(self, position: usize) -> Self {
        Self { position, ..self }
    }

    pub fn with_nashville(self, number: NashvilleNumber) -> Self {
        Self { nashville_number: Some(number), ..self }
    }

    pub fn root(&self) -> ChordRoot {
        self.root
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn bass_note(&self) -> Option<ChordRoot> {
        self.bass_note
    }

    /// Character offset in the lyric line
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn original_notation(&self) -> &str {
        &self.original_notation
    }

    pub fn nashville_number(&self) -> Option<&NashvilleNumber> {
        self.nashville_number.as_ref()
    }

    /// Canonical chord symbol built from the parts
    pub fn symbol(&self) -> String {
        self.to_string()
    }

    /// Quality marker and extensions without root or bass ("m7", "maj7sus4")
    pub fn suffix(&self) -> String {
        let mut out = String::new();
        let _ = write_suffix(&mut out, self.quality, &self.extensions);
        out
    }

    /// True when the chord has unrecognized trailing text
    pub fn has_unknown_suffix(&self) -> bool {
        self.extensions.iter().any(Extension::is_other)
    }

    /// Same sounding chord: root/bass pitch classes, quality and extensions.
    /// Spelling, position and notation are ignored.
    pub fn same_harmony(&self, other: &Chord) -> bool {
        self.root.pitch_class() == other.root.pitch_class()
            && self.quality == other.quality
            && self.extensions == other.extensions
            && self.bass_note.map(|b| b.pitch_class()) == other.bass_note.map(|b| b.pitch_class())
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        write_suffix(f, self.quality, &self.extensions)?;
        if let Some(bass) = self.bass_note {
            write!(f, "/{}", bass)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pitch::Letter;

    fn root(letter: Letter, accidental: Accidental) -> ChordRoot {
        ChordRoot::new(letter, accidental)
    }

    #[test]
    fn test_symbol_keeps_extension_order() {
        let chord = Chord::new(
            root(Letter::A, Accidental::Natural),
            Quality::Minor,
            vec![Extension::Sus(4), Extension::Add(9)],
            None,
        );
        assert_eq!(chord.symbol(), "Amsus4add9");
        assert_eq!(chord.original_notation(), "Amsus4add9");
    }

    #[test]
    fn test_slash_symbol() {
        let chord = Chord::new(
            root(Letter::F, Accidental::Natural),
            Quality::Major,
            vec![Extension::Major(7)],
            Some(root(Letter::C, Accidental::Natural)),
        );
        assert_eq!(chord.to_string(), "Fmaj7/C");
        assert_eq!(chord.suffix(), "maj7");
    }

    #[test]
    fn test_parsed_keeps_original_notation() {
        let chord = Chord::parsed(
            root(Letter::C, Accidental::Natural),
            Quality::Minor,
            vec![Extension::Dominant(7)],
            None,
            "Cmin7",
        )
        .with_position(4);
        assert_eq!(chord.original_notation(), "Cmin7");
        assert_eq!(chord.symbol(), "Cm7");
        assert_eq!(chord.position(), 4);
    }

    #[test]
    fn test_same_harmony_ignores_spelling() {
        let sharp = Chord::new(root(Letter::C, Accidental::Sharp), Quality::Minor, vec![], None);
        let flat = Chord::new(root(Letter::D, Accidental::Flat), Quality::Minor, vec![], None).with_position(3);
        assert!(sharp.same_harmony(&flat));

        let major = Chord::new(root(Letter::D, Accidental::Flat), Quality::Major, vec![], None);
        assert!(!sharp.same_harmony(&major));
    }
}

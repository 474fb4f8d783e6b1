//! Canonical chord sheet document
//!
//! Chordsheet → Sections → Lines, each level exclusively owning the next.
//! Lines are a closed enum so every consumer matches all three kinds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::chord::Chord;
use super::key::Key;

/// Section kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    Verse,
    Chorus,
    Bridge,
    PreChorus,
    Intro,
    Outro,
    Instrumental,
    Solo,
    Coda,
    Tag,
    Note,
    Unknown,
}

impl SectionType {
    /// Recognize a section label such as "Verse 1", "PRE-CHORUS" or "start_of_bridge".
    /// Returns None when the label is not a section name.
    pub fn recognize(label: &str) -> Option<SectionType> {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "verse" => Some(SectionType::Verse),
            "chorus" | "refrain" => Some(SectionType::Chorus),
            "bridge" => Some(SectionType::Bridge),
            "prechorus" => Some(SectionType::PreChorus),
            "intro" => Some(SectionType::Intro),
            "outro" | "ending" => Some(SectionType::Outro),
            "instrumental" | "interlude" => Some(SectionType::Instrumental),
            "solo" => Some(SectionType::Solo),
            "coda" => Some(SectionType::Coda),
            "tag" => Some(SectionType::Tag),
            "note" | "notes" => Some(SectionType::Note),
            "section" | "part" => Some(SectionType::Unknown),
            _ => None,
        }
    }

    /// Label used when a section has no title of its own
    pub fn default_label(&self) -> &'static str {
        match self {
            SectionType::Verse => "Verse",
            SectionType::Chorus => "Chorus",
            SectionType::Bridge => "Bridge",
            SectionType::PreChorus => "Pre-Chorus",
            SectionType::Intro => "Intro",
            SectionType::Outro => "Outro",
            SectionType::Instrumental => "Instrumental",
            SectionType::Solo => "Solo",
            SectionType::Coda => "Coda",
            SectionType::Tag => "Tag",
            SectionType::Note => "Note",
            SectionType::Unknown => "Section",
        }
    }

    /// Identifier with underscores ("pre_chorus"), used in ChordPro directives
    pub fn slug(&self) -> &'static str {
        match self {
            SectionType::Verse => "verse",
            SectionType::Chorus => "chorus",
            SectionType::Bridge => "bridge",
            SectionType::PreChorus => "pre_chorus",
            SectionType::Intro => "intro",
            SectionType::Outro => "outro",
            SectionType::Instrumental => "instrumental",
            SectionType::Solo => "solo",
            SectionType::Coda => "coda",
            SectionType::Tag => "tag",
            SectionType::Note => "note",
            SectionType::Unknown => "section",
        }
    }
}

/// How the source format placed a chord relative to the lyric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Chord line aligned over the lyric line
    Above,
    /// Bracketed chord inside the lyric
    Inline,
    /// Chord line set one blank line apart from its lyric
    Between,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Comment,
    Instruction,
    Tempo,
    Dynamics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordPlacement {
    pub chord: Chord,
    /// Character index of the chord in the lyric (equals `chord.position()`)
    pub start_index: usize,
    /// End of the lyric span governed by the chord
    pub end_index: usize,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    pub text: String,
    pub chords: Vec<ChordPlacement>,
    pub line_number: usize,
}

impl TextLine {
    /// Build a text line from chords positioned in `text`.
    /// Chords are ordered by position; each governs the text up to the next one.
    pub fn new(text: impl Into<String>, mut chords: Vec<Chord>, placement: Placement, line_number: usize) -> Self {
        let text = text.into();
        let text_len = text.chars().count();
        chords.sort_by_key(|c| c.position());

        let starts: Vec<usize> = chords.iter().map(|c| c.position()).collect();
        let placements = chords
            .into_iter()
            .enumerate()
            .map(|(i, chord)| {
                let start_index = chord.position();
                let end_index = starts.get(i + 1).copied().unwrap_or(text_len).max(start_index);
                ChordPlacement { chord, start_index, end_index, placement }
            })
            .collect();

        Self { text, chords: placements, line_number }
    }

    pub fn has_chords(&self) -> bool {
        !self.chords.is_empty()
    }

    /// True when the line holds chords but no lyric
    pub fn is_chord_only(&self) -> bool {
        self.has_chords() && self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyLine {
    pub count: usize,
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationLine {
    pub value: String,
    pub annotation_type: AnnotationType,
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Line {
    Text(TextLine),
    Empty(EmptyLine),
    Annotation(AnnotationLine),
}

impl Line {
    pub fn line_number(&self) -> usize {
        match self {
            Line::Text(line) => line.line_number,
            Line::Empty(line) => line.line_number,
            Line::Annotation(line) => line.line_number,
        }
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self, Line::Annotation(_))
    }

    pub fn chords(&self) -> &[ChordPlacement] {
        match self {
            Line::Text(line) => &line.chords,
            Line::Empty(_) | Line::Annotation(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_type: SectionType,
    pub title: Option<String>,
    pub lines: Vec<Line>,
}

impl Section {
    pub fn new(section_type: SectionType, title: Option<String>) -> Self {
        Self { section_type, title, lines: Vec::new() }
    }

    /// Title, or the type's default label
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.section_type.default_label())
    }

    pub fn starts_with_annotation(&self) -> bool {
        self.lines.first().is_some_and(Line::is_annotation)
    }

    pub fn ends_with_annotation(&self) -> bool {
        self.lines.last().is_some_and(Line::is_annotation)
    }

    pub fn chords(&self) -> impl Iterator<Item = &Chord> {
        self.lines.iter().flat_map(|l| l.chords().iter().map(|p| &p.chord))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chordsheet {
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub original_key: Option<Key>,
    /// Other header fields (capo, tempo, time, copyright, ...), lowercase names
    pub metadata: BTreeMap<String, String>,
    pub sections: Vec<Section>,
}

impl Chordsheet {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: None,
            artist: None,
            original_key: None,
            metadata: BTreeMap::new(),
            sections: Vec::new(),
        }
    }

    /// Every chord in document order
    pub fn chords(&self) -> impl Iterator<Item = &Chord> {
        self.sections.iter().flat_map(Section::chords)
    }

    pub fn chord_count(&self) -> usize {
        self.chords().count()
    }

    pub fn section_types(&self) -> Vec<SectionType> {
        self.sections.iter().map(|s| s.section_type).collect()
    }

    /// True when nothing but headers was recognized
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.sections.iter().all(|s| s.lines.is_empty())
    }
}

impl Default for Chordsheet {
    fn default() -> Self {
        Self::new()
    }
}

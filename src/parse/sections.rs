//! Section header recognition and document assembly
//!
//! `SheetBuilder` is shared by every format parser: it owns the blank-line
//! bookkeeping so all formats agree on what a separator is. Blank lines
//! right before a section header (or at the very end) separate sections and
//! are not stored; blank runs inside a section become one `EmptyLine`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::chord::{is_chord_token, ChordSyntax};
use crate::models::{AnnotationLine, AnnotationType, Chordsheet, EmptyLine, Line, Section, SectionType, TextLine};

static COLON_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^:\[\]{}<>*()]{1,40}):$").unwrap());

static BRACKET_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\[\]]{1,40})\]$").unwrap());

static UPPER_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9 \-]{0,39})$").unwrap());

/// A recognized header line: type plus the label as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub section_type: SectionType,
    pub title: String,
}

fn single_word(label: &str) -> bool {
    let words: Vec<&str> = label.split_whitespace().collect();
    match words.as_slice() {
        [word] => word.chars().all(char::is_alphabetic),
        [word, number] => word.chars().all(char::is_alphabetic) && number.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn header_from_label(label: &str) -> Option<Header> {
    let title = label.trim();
    let section_type = match SectionType::recognize(title) {
        Some(t) => t,
        None if single_word(title) => SectionType::Unknown,
        None => return None,
    };
    Some(Header { section_type, title: title.to_string() })
}

/// "Verse 1:" style header (OnSong, Guitar Tabs, Nashville)
pub fn colon_header(line: &str) -> Option<Header> {
    let caps = COLON_HEADER.captures(line.trim())?;
    header_from_label(&caps[1])
}

/// "[Verse 1]" style header (Songbook Pro). A bracketed chord is not a header.
pub fn bracket_header(line: &str) -> Option<Header> {
    let caps = BRACKET_HEADER.captures(line.trim())?;
    let label = &caps[1];
    if is_chord_token(label, ChordSyntax::Letter) {
        return None;
    }
    header_from_label(label)
}

/// "VERSE 1" style header (Planning Center). Only known section names count.
pub fn upper_header(line: &str) -> Option<Header> {
    let caps = UPPER_HEADER.captures(line.trim())?;
    let label = caps[1].trim();
    let section_type = SectionType::recognize(label)?;
    Some(Header { section_type, title: title_case(label) })
}

/// "PRE-CHORUS 2" -> "Pre-Chorus 2"
pub fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut start_of_word = true;
    for c in label.chars() {
        if start_of_word {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        start_of_word = !c.is_alphanumeric();
    }
    out
}

/// Incrementally assembles a `Chordsheet` from classified source lines
pub struct SheetBuilder {
    sheet: Chordsheet,
    current: Option<Section>,
    /// Current section was opened by a header rather than by stray content
    explicit: bool,
    /// Pending blank run: (count, first line number)
    blank: Option<(usize, usize)>,
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self {
            sheet: Chordsheet::new(),
            current: None,
            explicit: false,
            blank: None,
        }
    }

    pub fn sheet_mut(&mut self) -> &mut Chordsheet {
        &mut self.sheet
    }

    /// Any section content seen yet
    pub fn has_content(&self) -> bool {
        self.current.is_some() || !self.sheet.sections.is_empty()
    }

    pub fn blank(&mut self, line_number: usize) {
        self.blank = Some(match self.blank {
            Some((count, first)) => (count + 1, first),
            None => (1, line_number),
        });
    }

    /// Open a new section; pending blank lines were its separator
    pub fn start_section(&mut self, section_type: SectionType, title: Option<String>) {
        self.close_section();
        self.blank = None;
        self.current = Some(Section::new(section_type, title));
        self.explicit = true;
    }

    /// Close the current section (ChordPro `{end_of_*}`)
    pub fn end_section(&mut self) {
        self.blank = None;
        self.close_section();
    }

    fn close_section(&mut self) {
        if let Some(section) = self.current.take() {
            self.sheet.sections.push(section);
        }
        self.explicit = false;
    }

    pub fn push(&mut self, line: Line) {
        if self.current.is_none() {
            // Stray content opens an untitled section; leading blanks are dropped
            self.current = Some(Section::new(SectionType::Unknown, None));
            self.explicit = false;
            self.blank = None;
        }
        let pending = self.blank.take();
        if let Some(section) = self.current.as_mut() {
            if let Some((count, line_number)) = pending {
                if self.explicit || !section.lines.is_empty() {
                    section.lines.push(Line::Empty(EmptyLine { count, line_number }));
                }
            }
            section.lines.push(line);
        }
    }

    pub fn push_text(&mut self, line: TextLine) {
        self.push(Line::Text(line));
    }

    pub fn push_annotation(&mut self, value: impl Into<String>, annotation_type: AnnotationType, line_number: usize) {
        self.push(Line::Annotation(AnnotationLine {
            value: value.into(),
            annotation_type,
            line_number,
        }));
    }

    pub fn finish(mut self) -> Chordsheet {
        self.blank = None;
        self.close_section();
        self.sheet
    }
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placement;

    fn text(s: &str, n: usize) -> TextLine {
        TextLine::new(s, vec![], Placement::Inline, n)
    }

    #[test]
    fn test_colon_header() {
        let header = colon_header("Verse 1:").unwrap();
        assert_eq!(header.section_type, SectionType::Verse);
        assert_eq!(header.title, "Verse 1");
        assert_eq!(colon_header("Riff:").unwrap().section_type, SectionType::Unknown);
        assert!(colon_header("And then he said:").is_none());
        assert!(colon_header("Key: G").is_none());
    }

    #[test]
    fn test_bracket_header() {
        assert_eq!(bracket_header("[Chorus]").unwrap().section_type, SectionType::Chorus);
        assert!(bracket_header("[Am]").is_none());
        assert!(bracket_header("[C]Amazing").is_none());
    }

    #[test]
    fn test_upper_header() {
        let header = upper_header("PRE-CHORUS 2").unwrap();
        assert_eq!(header.section_type, SectionType::PreChorus);
        assert_eq!(header.title, "Pre-Chorus 2");
        assert!(upper_header("HALLELUJAH").is_none());
    }

    #[test]
    fn test_builder_blank_handling() {
        let mut builder = SheetBuilder::new();
        builder.blank(1);
        builder.push_text(text("intro words", 2));
        builder.blank(3);
        builder.blank(4);
        builder.start_section(SectionType::Verse, Some("Verse 1".to_string()));
        builder.push_text(text("line one", 6));
        builder.blank(7);
        builder.push_text(text("line two", 8));
        builder.blank(9);
        let sheet = builder.finish();

        assert_eq!(sheet.sections.len(), 2);
        assert_eq!(sheet.sections[0].section_type, SectionType::Unknown);
        assert_eq!(sheet.sections[0].lines.len(), 1);
        assert_eq!(sheet.sections[1].lines.len(), 3);
        assert!(matches!(sheet.sections[1].lines[1], Line::Empty(EmptyLine { count: 1, line_number: 7 })));
    }

    #[test]
    fn test_builder_empty_section_kept() {
        let mut builder = SheetBuilder::new();
        builder.start_section(SectionType::Chorus, None);
        builder.start_section(SectionType::Bridge, None);
        let sheet = builder.finish();
        assert_eq!(sheet.section_types(), vec![SectionType::Chorus, SectionType::Bridge]);
        assert!(sheet.sections[0].lines.is_empty());
    }
}

//! Shared body parsing and section layout for the line-oriented formats
//!
//! OnSong, Songbook Pro, Nashville, Guitar Tabs and Planning Center only
//! differ in how a header, an annotation and a chord are written. `BodyRules`
//! captures those differences; `parse_body` and `SheetWriter` do the rest.

use crate::config::SpacingRules;
use crate::diagnostics::Diagnostics;
use crate::models::{
    AnnotationType, Chord, Chordsheet, Key, Line, NotationFormat, Placement, Section, SectionType, TextLine,
};
use crate::parse::line::{is_chord_line, merge_chord_line, parse_inline, render_chord_line, render_inline};
use crate::parse::sections::{Header, SheetBuilder};
use crate::parse::ChordSyntax;
use crate::transposition::degrees::degree_in_key;

use super::metadata::{apply_field, parse_meta_line};

/// How one format writes the pieces of a body
pub struct BodyRules<'a> {
    pub header: fn(&str) -> Option<Header>,
    pub annotation: fn(&str) -> Option<(String, AnnotationType)>,
    pub syntax: ChordSyntax<'a>,
    /// `[C]` brackets inside lyrics
    pub inline: bool,
    /// Chord lines over lyric lines
    pub above: bool,
    /// Lines kept as chordless text without further interpretation
    pub verbatim: Option<fn(&str) -> bool>,
}

impl BodyRules<'_> {
    fn is_verbatim(&self, line: &str) -> bool {
        self.verbatim.is_some_and(|f| f(line))
    }

    /// Line that can sit under a chord line as its lyric
    fn is_lyric(&self, line: &str) -> bool {
        !line.trim().is_empty()
            && !self.is_verbatim(line)
            && (self.header)(line).is_none()
            && (self.annotation)(line).is_none()
            && !is_chord_line(line, self.syntax)
    }

    fn placement(&self) -> Placement {
        if self.above {
            Placement::Above
        } else {
            Placement::Inline
        }
    }
}

/// Feed `lines` (1-based line number, text) into `builder`.
///
/// Header fields (`Key: G`) are read until the first section content.
pub fn parse_body(lines: &[(usize, &str)], rules: &BodyRules<'_>, builder: &mut SheetBuilder, diags: &mut Diagnostics) {
    let mut i = 0;
    while i < lines.len() {
        let (n, raw) = lines[i];
        let line = raw.trim_end();
        i += 1;

        if line.trim().is_empty() {
            builder.blank(n);
            continue;
        }
        if rules.is_verbatim(line) {
            builder.push_text(TextLine::new(line, Vec::new(), Placement::Above, n));
            continue;
        }
        if !builder.has_content() {
            if let Some((name, value)) = parse_meta_line(line) {
                apply_field(builder.sheet_mut(), &name, &value, n, diags);
                continue;
            }
        }
        if let Some(header) = (rules.header)(line) {
            builder.start_section(header.section_type, Some(header.title));
            continue;
        }
        if let Some((value, annotation_type)) = (rules.annotation)(line) {
            builder.push_annotation(value, annotation_type, n);
            continue;
        }
        if rules.above && is_chord_line(line, rules.syntax) {
            let lyric = match lines.get(i) {
                Some(&(_, next)) if rules.is_lyric(next) => {
                    i += 1;
                    Some(next)
                }
                _ => None,
            };
            let parsed = merge_chord_line(line, lyric, rules.syntax, n, diags);
            builder.push_text(parsed.into_text_line(Placement::Above, n));
            continue;
        }
        if rules.inline && line.contains('[') {
            let parsed = parse_inline(line, rules.syntax, n, diags);
            builder.push_text(parsed.into_text_line(Placement::Inline, n));
            continue;
        }
        builder.push_text(TextLine::new(line, Vec::new(), rules.placement(), n));
    }
}

/// Number the source lines (1-based), skipping the first `skip`
pub fn numbered(text: &str, skip: usize) -> Vec<(usize, &str)> {
    text.lines().enumerate().skip(skip).map(|(i, l)| (i + 1, l)).collect()
}

/// The untitled leading section of a document needs no header
pub fn is_bare(section: &Section, index: usize) -> bool {
    index == 0 && section.section_type == SectionType::Unknown && section.title.is_none()
}

/// Writes sections with the format's spacing between them
pub struct SheetWriter {
    lines: Vec<String>,
    rules: SpacingRules,
}

impl SheetWriter {
    pub fn new(rules: SpacingRules) -> Self {
        Self { lines: Vec::new(), rules }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self, count: usize) {
        self.lines.extend(std::iter::repeat(String::new()).take(count));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write every section: `header` yields the opening lines (none for a
    /// bare section), `line` renders text and annotation lines given the
    /// line after them in the section, `footer` closes the section.
    pub fn sections<H, L, F>(&mut self, sheet: &Chordsheet, mut header: H, mut line: L, mut footer: F)
    where
        H: FnMut(&Section, usize) -> Vec<String>,
        L: FnMut(&Line, Option<&Line>, &mut Vec<String>),
        F: FnMut(&Section, usize) -> Vec<String>,
    {
        let mut previous: Option<&Section> = None;
        for (index, section) in sheet.sections.iter().enumerate() {
            if !self.lines.is_empty() {
                let gap = match previous {
                    Some(prev) => self.rules.gap(prev.ends_with_annotation(), section.starts_with_annotation()),
                    None => self.rules.between_sections,
                };
                self.blank(gap);
            }
            self.lines.extend(header(section, index));
            for (i, l) in section.lines.iter().enumerate() {
                match l {
                    Line::Empty(empty) => self.blank(empty.count),
                    other => line(other, section.lines.get(i + 1), &mut self.lines),
                }
            }
            self.lines.extend(footer(section, index));
            previous = Some(section);
        }
    }

    /// Joined text with a single trailing newline
    pub fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        text.push('\n');
        text
    }
}

/// Header line for `section` in a format that writes headers with `write`
/// and reads them back with `read`. Titles that would not read back as the
/// same section type fall back to the type's default label.
pub fn header_line<W>(section: &Section, write: W, read: fn(&str) -> Option<Header>) -> String
where
    W: Fn(&str) -> String,
{
    if let Some(title) = &section.title {
        let line = write(title);
        if read(&line).is_some_and(|h| h.section_type == section.section_type) {
            return line;
        }
    }
    write(section.section_type.default_label())
}

/// Warnings for header fields a format could not carry
pub fn dropped_warnings(format: NotationFormat, dropped: &[String]) -> Vec<String> {
    dropped
        .iter()
        .map(|name| format!("Metadata field \"{}\" is not supported by {} and was dropped", name, format.display_name()))
        .collect()
}

/// Chord line over lyric.
///
/// A chord-only line yields just the chord line, unless `next` is a bare
/// lyric that a reader would pair with it. Then the chords are written as
/// `[G] [D]` so both lines survive a re-parse. Chords placed `between`
/// keep a blank line under the chord line.
pub fn render_above<F>(line: &TextLine, next: Option<&Line>, symbol: F, out: &mut Vec<String>)
where
    F: Fn(&Chord) -> String,
{
    if !line.has_chords() {
        let text = line.text.trim_end();
        if !text.is_empty() {
            out.push(text.to_string());
        }
        return;
    }
    if line.is_chord_only() && next.is_some_and(is_bare_lyric) {
        out.push(render_inline(line, "[", "]", symbol));
        return;
    }
    let (chords, lyric) = render_chord_line(line, symbol);
    out.push(chords);
    if !lyric.is_empty() {
        if line.chords.iter().any(|p| p.placement == Placement::Between) {
            out.push(String::new());
        }
        out.push(lyric);
    }
}

fn is_bare_lyric(line: &Line) -> bool {
    matches!(line, Line::Text(text) if !text.has_chords() && !text.text.trim().is_empty())
}

/// Chord written as a Nashville number in `key` ("4", "6m7", "b7", "5/7")
pub fn nashville_symbol(chord: &Chord, key: &Key) -> String {
    let (degree, accidental) = degree_in_key(chord.root().pitch_class(), key);
    let mut out = format!("{}{}{}", accidental.as_str(), degree, chord.suffix());
    if let Some(bass) = chord.bass_note() {
        let (degree, accidental) = degree_in_key(bass.pitch_class(), key);
        out.push_str(&format!("/{}{}", accidental.as_str(), degree));
    }
    out
}

/// `(text)` annotation used by Songbook Pro and Nashville charts
pub fn paren_annotation(line: &str) -> Option<(String, AnnotationType)> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('(')?.strip_suffix(')')?.trim();
    if inner.is_empty() || inner.contains(['(', ')']) {
        return None;
    }
    Some((inner.to_string(), crate::parse::classify(inner)))
}

/// `*text` annotation used by OnSong and Guitar Tabs
pub fn star_annotation(line: &str) -> Option<(String, AnnotationType)> {
    let inner = line.trim().strip_prefix('*')?.trim();
    if inner.is_empty() {
        return None;
    }
    Some((inner.to_string(), crate::parse::classify(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::sections::colon_header;

    fn rules() -> BodyRules<'static> {
        BodyRules {
            header: colon_header,
            annotation: star_annotation,
            syntax: ChordSyntax::Letter,
            inline: true,
            above: true,
            verbatim: None,
        }
    }

    fn parse(text: &str) -> (Chordsheet, Diagnostics) {
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();
        parse_body(&numbered(text, 0), &rules(), &mut builder, &mut diags);
        (builder.finish(), diags)
    }

    #[test]
    fn test_chord_line_pairs_with_lyric() {
        let (sheet, diags) = parse("Verse 1:\nG       C\nAmazing grace\n");
        assert!(diags.is_empty());
        assert_eq!(sheet.sections.len(), 1);
        assert_eq!(sheet.sections[0].section_type, SectionType::Verse);
        match &sheet.sections[0].lines[0] {
            Line::Text(line) => {
                assert_eq!(line.text, "Amazing grace");
                assert_eq!(line.chords[1].start_index, 8);
                assert_eq!(line.chords[1].placement, Placement::Above);
            }
            other => panic!("expected text line, got {:?}", other),
        }
    }

    #[test]
    fn test_header_fields_before_content_only() {
        let (sheet, _) = parse("Key: D\nCapo: 2\n\nVerse:\nTempo: slow\n");
        assert_eq!(sheet.original_key.map(|k| k.name()), Some("D".to_string()));
        assert_eq!(sheet.metadata.get("capo").map(String::as_str), Some("2"));
        assert!(!sheet.metadata.contains_key("tempo"));
    }

    #[test]
    fn test_annotation_and_blank_runs() {
        let (sheet, _) = parse("Chorus:\n[C]Sing\n\n\n*Repeat x2\n");
        let lines = &sheet.sections[0].lines;
        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[1], Line::Empty(ref e) if e.count == 2));
        assert!(matches!(lines[2], Line::Annotation(ref a) if a.annotation_type == AnnotationType::Instruction));
    }

    #[test]
    fn test_writer_spacing() {
        let (sheet, _) = parse("Verse:\n[C]One\n\nChorus:\n*Softly\n[G]Two\n");
        let mut writer = SheetWriter::new(SpacingRules::new(1, 2));
        writer.sections(
            &sheet,
            |s, _| vec![format!("{}:", s.label())],
            |l, _, out| {
                if let Line::Text(t) = l {
                    out.push(t.text.clone());
                } else if let Line::Annotation(a) = l {
                    out.push(format!("*{}", a.value));
                }
            },
            |_, _| Vec::new(),
        );
        assert_eq!(writer.finish(), "Verse:\nOne\n\n\nChorus:\n*Softly\nTwo\n");
    }

    #[test]
    fn test_between_keeps_gap_under_chord_line() {
        let g = crate::parse::parse_chord("G").unwrap().chord;
        let c = crate::parse::parse_chord("C").unwrap().chord.with_position(8);
        let line = TextLine::new("Amazing grace", vec![g, c], Placement::Between, 1);
        let mut out = Vec::new();
        render_above(&line, None, |c| c.symbol(), &mut out);
        assert_eq!(out, vec!["G       C", "", "Amazing grace"]);

        let line = TextLine::new("Amazing grace", line.chords.iter().map(|p| p.chord.clone()).collect(), Placement::Above, 1);
        let mut out = Vec::new();
        render_above(&line, None, |c| c.symbol(), &mut out);
        assert_eq!(out, vec!["G       C", "Amazing grace"]);
    }

    #[test]
    fn test_gap_counts_empty_lines() {
        let (sheet, _) = parse("Verse:\n[C]One\n\nChorus:\n[G]Two\n");
        for (gap, expected) in [
            (0, "Verse:\nOne\nChorus:\nTwo\n"),
            (1, "Verse:\nOne\n\nChorus:\nTwo\n"),
            (2, "Verse:\nOne\n\n\nChorus:\nTwo\n"),
        ] {
            let mut writer = SheetWriter::new(SpacingRules::new(gap, gap));
            writer.sections(
                &sheet,
                |s, _| vec![format!("{}:", s.label())],
                |l, _, out| {
                    if let Line::Text(t) = l {
                        out.push(t.text.clone());
                    }
                },
                |_, _| Vec::new(),
            );
            assert_eq!(writer.finish(), expected);
        }
    }

    #[test]
    fn test_nashville_symbol() {
        let key: Key = "G".parse().unwrap();
        let chord = crate::parse::parse_chord("D/F#").unwrap().chord;
        assert_eq!(nashville_symbol(&chord, &key), "5/7");
        let chord = crate::parse::parse_chord("Em7").unwrap().chord;
        assert_eq!(nashville_symbol(&chord, &key), "6m7");
        let chord = crate::parse::parse_chord("F").unwrap().chord;
        assert_eq!(nashville_symbol(&chord, &key), "b7");
    }

    #[test]
    fn test_header_line_falls_back_to_type_label() {
        let titled = Section::new(SectionType::Verse, Some("Verse 2".to_string()));
        assert_eq!(header_line(&titled, |l| format!("{}:", l), colon_header), "Verse 2:");
        let odd = Section::new(SectionType::Chorus, Some("Big Finish Here".to_string()));
        assert_eq!(header_line(&odd, |l| format!("{}:", l), colon_header), "Chorus:");
    }

    #[test]
    fn test_paren_annotation() {
        assert_eq!(paren_annotation("(Build)"), Some(("Build".to_string(), AnnotationType::Dynamics)));
        assert_eq!(paren_annotation("()"), None);
        assert_eq!(paren_annotation("Amazing (grace)"), None);
    }
}

//! Songbook Pro: `Title:`/`Artist:`/`Key:` fields, `[Verse 1]` headers,
//! column-aligned chord lines above lyrics and `(note)` annotations.
//!
//! ```text
//! Title: Amazing Grace
//! Key: G
//!
//! [Verse 1]
//! G       C
//! Amazing grace
//! (Softly)
//! ```

use super::layout::{
    dropped_warnings, header_line, is_bare, numbered, paren_annotation, parse_body, render_above, BodyRules,
    SheetWriter,
};
use super::metadata::render_fields;
use super::{ensure_not_blank, FormatHandler, ParseOutcome, RenderOutcome};
use crate::config::SpacingRules;
use crate::diagnostics::Diagnostics;
use crate::errors::AppError;
use crate::models::{Chord, Chordsheet, Line, NotationFormat};
use crate::parse::sections::{bracket_header, SheetBuilder};
use crate::parse::ChordSyntax;

pub struct SongbookProFormat {
    spacing: SpacingRules,
}

impl SongbookProFormat {
    pub fn new(spacing: SpacingRules) -> Self {
        Self { spacing }
    }
}

impl FormatHandler for SongbookProFormat {
    fn format(&self) -> NotationFormat {
        NotationFormat::SongbookPro
    }

    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError> {
        ensure_not_blank(text, self.format())?;
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();

        let rules = BodyRules {
            header: bracket_header,
            annotation: paren_annotation,
            syntax: ChordSyntax::Letter,
            inline: true,
            above: true,
            verbatim: None,
        };
        parse_body(&numbered(text, 0), &rules, &mut builder, &mut diags);

        let sheet = builder.finish();
        log::debug!("songbook pro: parsed {} sections, {} chords", sheet.sections.len(), sheet.chord_count());
        Ok(ParseOutcome { sheet, warnings: diags.into_warnings() })
    }

    fn render(&self, sheet: &Chordsheet) -> Result<RenderOutcome, AppError> {
        let mut writer = SheetWriter::new(self.spacing);
        let mut dropped = Vec::new();
        for line in render_fields(sheet, true, &mut dropped) {
            writer.push(line);
        }

        writer.sections(
            sheet,
            |section, index| {
                if is_bare(section, index) {
                    Vec::new()
                } else {
                    vec![header_line(section, |label| format!("[{}]", label), bracket_header)]
                }
            },
            |line, next, out| match line {
                Line::Text(text) => render_above(text, next, Chord::symbol, out),
                Line::Annotation(annotation) => out.push(format!("({})", annotation.value)),
                Line::Empty(_) => {}
            },
            |_, _| Vec::new(),
        );

        Ok(RenderOutcome {
            text: writer.finish(),
            warnings: dropped_warnings(self.format(), &dropped),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnotationType, Placement, SectionType};

    fn format() -> SongbookProFormat {
        SongbookProFormat::new(SpacingRules::new(1, 2))
    }

    #[test]
    fn test_parse() {
        let outcome = format()
            .parse("Title: Amazing Grace\nKey: G\n\n[Verse 1]\nG       C\nAmazing grace\n(Softly)\n\n[Chorus]\n[D]How sweet\n")
            .unwrap();
        let sheet = outcome.sheet;
        assert!(outcome.warnings.is_empty());
        assert_eq!(sheet.title.as_deref(), Some("Amazing Grace"));
        assert_eq!(sheet.section_types(), vec![SectionType::Verse, SectionType::Chorus]);
        match &sheet.sections[0].lines[0] {
            Line::Text(line) => {
                assert_eq!(line.text, "Amazing grace");
                assert_eq!(line.chords.len(), 2);
                assert_eq!(line.chords[1].start_index, 8);
                assert_eq!(line.chords[0].placement, Placement::Above);
            }
            other => panic!("expected text line, got {:?}", other),
        }
        assert!(matches!(
            sheet.sections[0].lines[1],
            Line::Annotation(ref a) if a.annotation_type == AnnotationType::Dynamics
        ));
        assert_eq!(sheet.chord_count(), 3);
    }

    #[test]
    fn test_bracketed_chord_is_not_header() {
        let sheet = format().parse("[G]\nAmazing\n").unwrap().sheet;
        assert_eq!(sheet.section_types(), vec![SectionType::Unknown]);
        assert_eq!(sheet.chord_count(), 1);
    }

    #[test]
    fn test_render_above() {
        let source = "Title: Song\n\n[Verse 1]\nG       C\nAmazing grace\n      D\nHow sweet\n";
        let sheet = format().parse(source).unwrap().sheet;
        assert_eq!(format().render(&sheet).unwrap().text, source);
    }

    #[test]
    fn test_render_from_inline() {
        let sheet = format().parse("[Chorus]\n[C]Amazing [F]grace\n").unwrap().sheet;
        let text = format().render(&sheet).unwrap().text;
        assert_eq!(text, "[Chorus]\nC       F\nAmazing grace\n");
    }
}

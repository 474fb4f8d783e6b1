//! Planning Center chord charts: upper-case section headers, inline `[C]`
//! chords and HTML-style `<b>`/`<i>` annotation lines.
//!
//! ```text
//! Title: Amazing Grace
//!
//! VERSE 1
//! [G]Amazing [C]grace
//! <b>Repeat x2</b>
//! <i>Gently</i>
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::layout::{dropped_warnings, header_line, is_bare, numbered, parse_body, BodyRules, SheetWriter};
use super::metadata::render_fields;
use super::{ensure_not_blank, FormatHandler, ParseOutcome, RenderOutcome};
use crate::config::SpacingRules;
use crate::diagnostics::Diagnostics;
use crate::errors::AppError;
use crate::models::{AnnotationType, Chord, Chordsheet, Line, NotationFormat};
use crate::parse::line::render_inline;
use crate::parse::sections::{upper_header, SheetBuilder};
use crate::parse::{classify, ChordSyntax};

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*<(b|i)>\s*(.*?)\s*</(b|i)>\s*$").unwrap());

/// `<b>text</b>` is a cue for the band, `<i>text</i>` a comment
pub fn markup_annotation(line: &str) -> Option<(String, AnnotationType)> {
    let caps = MARKUP.captures(line)?;
    let tag = caps[1].to_lowercase();
    if tag != caps[3].to_lowercase() || caps[2].is_empty() {
        return None;
    }
    let value = caps[2].to_string();
    let kind = if tag == "i" {
        AnnotationType::Comment
    } else {
        match classify(&value) {
            AnnotationType::Comment => AnnotationType::Instruction,
            other => other,
        }
    };
    Some((value, kind))
}

pub struct PlanningCenterFormat {
    spacing: SpacingRules,
}

impl PlanningCenterFormat {
    pub fn new(spacing: SpacingRules) -> Self {
        Self { spacing }
    }
}

impl FormatHandler for PlanningCenterFormat {
    fn format(&self) -> NotationFormat {
        NotationFormat::PlanningCenter
    }

    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError> {
        ensure_not_blank(text, self.format())?;
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();

        let rules = BodyRules {
            header: upper_header,
            annotation: markup_annotation,
            syntax: ChordSyntax::Letter,
            inline: true,
            above: false,
            verbatim: None,
        };
        parse_body(&numbered(text, 0), &rules, &mut builder, &mut diags);

        let sheet = builder.finish();
        log::debug!("planning center: parsed {} sections, {} chords", sheet.sections.len(), sheet.chord_count());
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
                    vec![header_line(section, str::to_uppercase, upper_header)]
                }
            },
            |line, _, out| match line {
                Line::Text(text) => out.push(render_inline(text, "[", "]", Chord::symbol)),
                Line::Annotation(annotation) => match annotation.annotation_type {
                    AnnotationType::Comment => out.push(format!("<i>{}</i>", annotation.value)),
                    _ => out.push(format!("<b>{}</b>", annotation.value)),
                },
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
    use crate::models::SectionType;

    fn format() -> PlanningCenterFormat {
        PlanningCenterFormat::new(SpacingRules::new(1, 2))
    }

    #[test]
    fn test_markup_annotation() {
        assert_eq!(markup_annotation("<i>Written in 1772</i>"), Some(("Written in 1772".to_string(), AnnotationType::Comment)));
        assert_eq!(markup_annotation("<b>Drums only</b>"), Some(("Drums only".to_string(), AnnotationType::Instruction)));
        assert_eq!(markup_annotation("<b>Softly</b>"), Some(("Softly".to_string(), AnnotationType::Dynamics)));
        assert_eq!(markup_annotation("<b>Half</i>"), None);
        assert_eq!(markup_annotation("Amazing <b>grace</b>"), None);
    }

    #[test]
    fn test_parse() {
        let sheet = format()
            .parse("Title: Amazing Grace\n\nVERSE 1\n[G]Amazing [C]grace\n<b>Repeat x2</b>\n\nPRE-CHORUS\n[D]How sweet\n")
            .unwrap()
            .sheet;
        assert_eq!(sheet.title.as_deref(), Some("Amazing Grace"));
        assert_eq!(sheet.section_types(), vec![SectionType::Verse, SectionType::PreChorus]);
        assert_eq!(sheet.sections[0].title.as_deref(), Some("Verse 1"));
        assert_eq!(sheet.chord_count(), 3);
    }

    #[test]
    fn test_shouted_lyric_is_not_header() {
        let sheet = format().parse("CHORUS\nHALLELUJAH\n").unwrap().sheet;
        assert_eq!(sheet.section_types(), vec![SectionType::Chorus]);
        assert_eq!(sheet.sections[0].lines.len(), 1);
    }

    #[test]
    fn test_render() {
        let source = "Title: Song\n\nVERSE 1\n[G]Amazing [C]grace\n\n\nCHORUS\n<i>Gently now</i>\n[D]Sing\n";
        let sheet = format().parse(source).unwrap().sheet;
        assert_eq!(format().render(&sheet).unwrap().text, source);
    }
}

//! Guitar tab sheets: `Verse:` headers, bare chord lines over lyrics and tab
//! staff lines (`e|--3--|`) carried through untouched. A chord-only line
//! right above a lyric it does not belong to is written as `[G] [D]`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::layout::{
    dropped_warnings, header_line, is_bare, numbered, parse_body, render_above, star_annotation, BodyRules,
    SheetWriter,
};
use super::metadata::render_fields;
use super::{ensure_not_blank, FormatHandler, ParseOutcome, RenderOutcome};
use crate::config::SpacingRules;
use crate::diagnostics::Diagnostics;
use crate::errors::AppError;
use crate::models::{Chord, Chordsheet, Line, NotationFormat};
use crate::parse::sections::{colon_header, SheetBuilder};
use crate::parse::ChordSyntax;

static TAB_STAFF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[A-Ga-g][#b]?\s*[|:][-0-9|hpbrsvxX/\\~^.()<>* ]+$").unwrap());

/// One string of a tab staff: "e|--3--|"
pub fn is_tab_staff(line: &str) -> bool {
    line.contains("--") && TAB_STAFF.is_match(line.trim_end())
}

pub struct GuitarTabsFormat {
    spacing: SpacingRules,
}

impl GuitarTabsFormat {
    pub fn new(spacing: SpacingRules) -> Self {
        Self { spacing }
    }
}

impl FormatHandler for GuitarTabsFormat {
    fn format(&self) -> NotationFormat {
        NotationFormat::GuitarTabs
    }

    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError> {
        ensure_not_blank(text, self.format())?;
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();

        let rules = BodyRules {
            header: colon_header,
            annotation: star_annotation,
            syntax: ChordSyntax::Letter,
            inline: true,
            above: true,
            verbatim: Some(is_tab_staff),
        };
        parse_body(&numbered(text, 0), &rules, &mut builder, &mut diags);

        let sheet = builder.finish();
        log::debug!("guitar tabs: parsed {} sections, {} chords", sheet.sections.len(), sheet.chord_count());
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
                    vec![header_line(section, |label| format!("{}:", label), colon_header)]
                }
            },
            |line, next, out| match line {
                Line::Text(text) => render_above(text, next, Chord::symbol, out),
                Line::Annotation(annotation) => out.push(format!("*{}", annotation.value)),
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

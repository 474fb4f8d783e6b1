//! Nashville Number System charts: chords written as scale degrees of the
//! stated key, on chord lines above the lyrics.
//!
//! ```text
//! Title: Amazing Grace
//! Key: G
//!
//! Verse 1:
//! 1       4
//! Amazing grace
//! (Build)
//! ```
//!
//! Numbers are resolved to concrete chords on parse, so the rest of the
//! engine only ever sees letter chords. Bare numbers are major triads;
//! minor is written explicitly ("6m").

use super::layout::{
    dropped_warnings, header_line, is_bare, nashville_symbol, numbered, paren_annotation, parse_body,
    render_above, BodyRules, SheetWriter,
};
use super::metadata::{parse_meta_line, render_fields};
use super::{ensure_not_blank, FormatHandler, ParseOutcome, RenderOutcome};
use crate::config::SpacingRules;
use crate::diagnostics::Diagnostics;
use crate::errors::AppError;
use crate::models::{Chordsheet, Key, Line, NotationFormat};
use crate::parse::sections::{colon_header, SheetBuilder};
use crate::parse::ChordSyntax;

pub struct NashvilleFormat {
    spacing: SpacingRules,
    /// Key used when a chart does not state one
    default_key: Key,
}

impl NashvilleFormat {
    pub fn new(spacing: SpacingRules, default_key: Key) -> Self {
        Self { spacing, default_key }
    }

    /// The chart's `Key:` field, if present and readable
    pub fn stated_key(text: &str) -> Option<Key> {
        text.lines()
            .filter_map(parse_meta_line)
            .find(|(name, _)| name == "key")
            .and_then(|(_, value)| value.parse().ok())
    }
}

impl FormatHandler for NashvilleFormat {
    fn format(&self) -> NotationFormat {
        NotationFormat::Nashville
    }

    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError> {
        ensure_not_blank(text, self.format())?;
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();

        let key = match Self::stated_key(text) {
            Some(key) => key,
            None => {
                diags.note(
                    "missing_key",
                    format!("Nashville chart has no key; reading numbers in {}", self.default_key),
                );
                self.default_key
            }
        };

        let rules = BodyRules {
            header: colon_header,
            annotation: paren_annotation,
            syntax: ChordSyntax::Nashville(&key),
            inline: true,
            above: true,
            verbatim: None,
        };
        parse_body(&numbered(text, 0), &rules, &mut builder, &mut diags);

        let mut sheet = builder.finish();
        if sheet.original_key.is_none() {
            sheet.original_key = Some(key);
        }
        log::debug!("nashville: parsed {} chords in {}", sheet.chord_count(), key);
        Ok(ParseOutcome { sheet, warnings: diags.into_warnings() })
    }

    fn render(&self, sheet: &Chordsheet) -> Result<RenderOutcome, AppError> {
        let mut writer = SheetWriter::new(self.spacing);
        let mut dropped = Vec::new();
        let mut warnings = Vec::new();

        let mut fields = render_fields(sheet, true, &mut dropped);
        let key = match sheet.original_key {
            Some(key) => key,
            None => {
                warnings.push(format!("Chord sheet has no key; numbering relative to {}", self.default_key));
                let at = usize::from(sheet.title.is_some()) + usize::from(sheet.artist.is_some());
                fields.insert(at, format!("Key: {}", self.default_key));
                self.default_key
            }
        };
        for line in fields {
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
                Line::Text(text) => render_above(text, next, |chord| nashville_symbol(chord, &key), out),
                Line::Annotation(annotation) => out.push(format!("({})", annotation.value)),
                Line::Empty(_) => {}
            },
            |_, _| Vec::new(),
        );

        warnings.extend(dropped_warnings(self.format(), &dropped));
        Ok(RenderOutcome { text: writer.finish(), warnings })
    }
}

//! OnSong: title and artist as the first bare lines, `Name: value` fields,
//! `Verse 1:` headers, inline `[C]` chords and `*note` annotations.
//! Chord lines above lyrics are accepted on input.

use super::layout::{
    dropped_warnings, header_line, is_bare, numbered, parse_body, star_annotation, BodyRules, SheetWriter,
};
use super::metadata::{apply_field, parse_meta_line, render_fields};
use super::{ensure_not_blank, FormatHandler, ParseOutcome, RenderOutcome};
use crate::config::SpacingRules;
use crate::diagnostics::Diagnostics;
use crate::errors::AppError;
use crate::models::{Chord, Chordsheet, Line, NotationFormat};
use crate::parse::line::{is_chord_line, render_inline};
use crate::parse::sections::{colon_header, SheetBuilder};
use crate::parse::ChordSyntax;

pub struct OnSongFormat {
    spacing: SpacingRules,
}

impl OnSongFormat {
    pub fn new(spacing: SpacingRules) -> Self {
        Self { spacing }
    }
}

/// Lines of the leading block (up to the first blank line) when it reads as
/// a title block: no headers, chords or annotations and at most two lines
/// that are not `Name: value` fields. Returns how many source lines it spans.
fn title_block<'a>(lines: &[(usize, &'a str)]) -> Option<(usize, Vec<(usize, &'a str)>)> {
    let start = lines.iter().position(|(_, l)| !l.trim().is_empty())?;
    let end = lines[start..]
        .iter()
        .position(|(_, l)| l.trim().is_empty())
        .map_or(lines.len(), |offset| start + offset);
    let block = &lines[start..end];

    let mut bare = 0;
    for (_, line) in block {
        if parse_meta_line(line).is_some() {
            continue;
        }
        if colon_header(line).is_some()
            || star_annotation(line).is_some()
            || line.contains('[')
            || is_chord_line(line, ChordSyntax::Letter)
        {
            return None;
        }
        bare += 1;
    }
    if bare > 2 {
        return None;
    }
    Some((end, block.to_vec()))
}

impl FormatHandler for OnSongFormat {
    fn format(&self) -> NotationFormat {
        NotationFormat::OnSong
    }

    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError> {
        ensure_not_blank(text, self.format())?;
        let lines = numbered(text, 0);
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();

        let body_start = match title_block(&lines) {
            Some((end, block)) => {
                let mut bare = 0;
                for (n, line) in block {
                    if let Some((name, value)) = parse_meta_line(line) {
                        apply_field(builder.sheet_mut(), &name, &value, n, &mut diags);
                        continue;
                    }
                    let field = if bare == 0 { "title" } else { "artist" };
                    apply_field(builder.sheet_mut(), field, line, n, &mut diags);
                    bare += 1;
                }
                end
            }
            None => 0,
        };

        let rules = BodyRules {
            header: colon_header,
            annotation: star_annotation,
            syntax: ChordSyntax::Letter,
            inline: true,
            above: true,
            verbatim: None,
        };
        parse_body(&lines[body_start..], &rules, &mut builder, &mut diags);

        let sheet = builder.finish();
        log::debug!("onsong: parsed {} sections, {} chords", sheet.sections.len(), sheet.chord_count());
        Ok(ParseOutcome { sheet, warnings: diags.into_warnings() })
    }

    fn render(&self, sheet: &Chordsheet) -> Result<RenderOutcome, AppError> {
        let mut writer = SheetWriter::new(self.spacing);
        let mut dropped = Vec::new();

        match (&sheet.title, &sheet.artist) {
            (Some(title), artist) => {
                writer.push(title.as_str());
                if let Some(artist) = artist {
                    writer.push(artist.as_str());
                }
            }
            (None, Some(artist)) => writer.push(format!("Artist: {}", artist)),
            (None, None) => {}
        }
        for line in render_fields(sheet, false, &mut dropped) {
            writer.push(line);
        }

        // A bare first section directly at the top would read back as the title
        let has_preamble = !writer.is_empty();
        writer.sections(
            sheet,
            |section, index| {
                if has_preamble && is_bare(section, index) {
                    Vec::new()
                } else {
                    vec![header_line(section, |label| format!("{}:", label), colon_header)]
                }
            },
            |line, _, out| match line {
                Line::Text(text) => out.push(render_inline(text, "[", "]", Chord::symbol)),
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

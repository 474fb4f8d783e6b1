//! ChordPro: `{directive: value}` lines, `{start_of_verse}` environments and
//! inline `[C]` chords.
//!
//! ```text
//! {title: Amazing Grace}
//! {key: G}
//!
//! {start_of_verse: Verse 1}
//! [G]Amazing [C]grace
//! {comment: Softly}
//! {end_of_verse}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::layout::{is_bare, SheetWriter};
use super::metadata::apply_field;
use super::{ensure_not_blank, FormatHandler, ParseOutcome, RenderOutcome};
use crate::config::SpacingRules;
use crate::diagnostics::{DiagnosticMark, Diagnostics};
use crate::errors::AppError;
use crate::models::{AnnotationType, Chord, Chordsheet, Line, NotationFormat, SectionType};
use crate::parse::line::{parse_inline, render_inline};
use crate::parse::sections::SheetBuilder;
use crate::parse::{classify, ChordSyntax};

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{\s*([A-Za-z_\-]+)\s*(?:[:\s]\s*(.*?))?\s*\}$").unwrap());

static LABEL_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^label\s*=\s*"?([^"]*)"?$"#).unwrap());

/// `{name: value}` split into lowercase name and optional value
pub fn parse_directive(line: &str) -> Option<(String, Option<String>)> {
    let caps = DIRECTIVE.captures(line.trim())?;
    let name = caps[1].to_lowercase();
    let value = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
        .map(|v| match LABEL_ATTR.captures(v) {
            Some(label) => label[1].to_string(),
            None => v.to_string(),
        });
    Some((name, value))
}

/// Environment opened by a directive, if any
fn section_start(name: &str) -> Option<SectionType> {
    match name {
        "soc" => Some(SectionType::Chorus),
        "sov" => Some(SectionType::Verse),
        "sob" => Some(SectionType::Bridge),
        "sot" => Some(SectionType::Instrumental),
        _ => {
            let kind = name.strip_prefix("start_of_")?;
            Some(SectionType::recognize(kind).unwrap_or(SectionType::Unknown))
        }
    }
}

fn is_section_end(name: &str) -> bool {
    matches!(name, "eoc" | "eov" | "eob" | "eot") || name.starts_with("end_of_")
}

/// `{start_of_*}`/`{end_of_*}` and their short forms
pub fn is_environment(name: &str) -> bool {
    section_start(name).is_some() || is_section_end(name)
}

/// Directives that only change presentation and carry nothing to keep
fn is_presentation(name: &str) -> bool {
    matches!(
        name,
        "new_song" | "ns" | "new_page" | "np" | "column_break" | "colb" | "new_physical_page" | "npp" | "chorus"
    )
}

pub struct ChordProFormat {
    spacing: SpacingRules,
}

impl ChordProFormat {
    pub fn new(spacing: SpacingRules) -> Self {
        Self { spacing }
    }

    fn directive(
        &self,
        builder: &mut SheetBuilder,
        name: &str,
        value: Option<String>,
        line_number: usize,
        diags: &mut Diagnostics,
    ) {
        if let Some(section_type) = section_start(name) {
            builder.start_section(section_type, value);
            return;
        }
        if is_section_end(name) {
            builder.end_section();
            return;
        }

        match (name, value) {
            ("comment" | "c" | "comment_box" | "cb" | "highlight", Some(value)) => {
                let kind = classify(&value);
                builder.push_annotation(value, kind, line_number);
            }
            ("comment_italic" | "ci", Some(value)) => {
                builder.push_annotation(value, AnnotationType::Instruction, line_number);
            }
            ("title" | "t", Some(value)) => apply_field(builder.sheet_mut(), "title", &value, line_number, diags),
            ("subtitle" | "st" | "artist", Some(value)) => {
                apply_field(builder.sheet_mut(), "artist", &value, line_number, diags)
            }
            ("key", Some(value)) => apply_field(builder.sheet_mut(), "key", &value, line_number, diags),
            (_, Some(value)) => {
                builder.sheet_mut().metadata.insert(name.to_string(), value);
            }
            (_, None) if is_presentation(name) => {}
            (_, None) => diags.add(DiagnosticMark::warning(
                line_number,
                0,
                "unsupported_directive",
                format!("Ignoring unsupported directive {{{}}}", name),
            )),
        }
    }
}

impl FormatHandler for ChordProFormat {
    fn format(&self) -> NotationFormat {
        NotationFormat::ChordPro
    }

    fn parse(&self, text: &str) -> Result<ParseOutcome, AppError> {
        ensure_not_blank(text, self.format())?;
        let mut builder = SheetBuilder::new();
        let mut diags = Diagnostics::new();

        for (i, raw) in text.lines().enumerate() {
            let n = i + 1;
            let line = raw.trim_end();
            if line.trim().is_empty() {
                builder.blank(n);
            } else if line.starts_with('#') {
                continue;
            } else if let Some((name, value)) = parse_directive(line) {
                self.directive(&mut builder, &name, value, n, &mut diags);
            } else {
                let parsed = parse_inline(line, ChordSyntax::Letter, n, &mut diags);
                builder.push_text(parsed.into_text_line(crate::models::Placement::Inline, n));
            }
        }

        let sheet = builder.finish();
        log::debug!("chordpro: parsed {} sections, {} chords", sheet.sections.len(), sheet.chord_count());
        Ok(ParseOutcome { sheet, warnings: diags.into_warnings() })
    }

    fn render(&self, sheet: &Chordsheet) -> Result<RenderOutcome, AppError> {
        let mut writer = SheetWriter::new(self.spacing);

        if let Some(title) = &sheet.title {
            writer.push(format!("{{title: {}}}", title));
        }
        if let Some(artist) = &sheet.artist {
            writer.push(format!("{{subtitle: {}}}", artist));
        }
        if let Some(key) = &sheet.original_key {
            writer.push(format!("{{key: {}}}", key));
        }
        for (name, value) in &sheet.metadata {
            writer.push(format!("{{{}: {}}}", name, value));
        }

        writer.sections(
            sheet,
            |section, index| {
                if is_bare(section, index) {
                    return Vec::new();
                }
                match &section.title {
                    Some(title) => vec![format!("{{start_of_{}: {}}}", section.section_type.slug(), title)],
                    None => vec![format!("{{start_of_{}}}", section.section_type.slug())],
                }
            },
            |line, _, out| match line {
                Line::Text(text) => out.push(render_inline(text, "[", "]", Chord::symbol)),
                Line::Annotation(annotation) => match annotation.annotation_type {
                    AnnotationType::Instruction => out.push(format!("{{ci: {}}}", annotation.value)),
                    _ => out.push(format!("{{c: {}}}", annotation.value)),
                },
                Line::Empty(_) => {}
            },
            |section, index| {
                if is_bare(section, index) {
                    Vec::new()
                } else {
                    vec![format!("{{end_of_{}}}", section.section_type.slug())]
                }
            },
        );

        Ok(RenderOutcome { text: writer.finish(), warnings: Vec::new() })
    }
}

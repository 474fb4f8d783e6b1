//! Header fields shared by the line-oriented formats
//!
//! `Title: ...`, `Artist: ...`, `Key: ...`, `Capo: ...` lines before the
//! first section. ChordPro carries the same fields as directives.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticMark, Diagnostics};
use crate::models::{Chordsheet, Key};

/// Field names understood as header lines outside ChordPro
pub const KNOWN_FIELDS: [&str; 14] = [
    "title", "subtitle", "artist", "author", "key", "capo", "tempo", "bpm", "time", "copyright", "ccli", "album",
    "year", "duration",
];

static META_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(title|subtitle|artist|author|key|capo|tempo|bpm|time|copyright|ccli|album|year|duration)\s*:\s*(.+?)\s*$",
    )
    .unwrap()
});

/// Read a `Name: value` header line
pub fn parse_meta_line(line: &str) -> Option<(String, String)> {
    let caps = META_LINE.captures(line)?;
    Some((caps[1].to_lowercase(), caps[2].to_string()))
}

/// Store one header field on the sheet
pub fn apply_field(sheet: &mut Chordsheet, name: &str, value: &str, line_number: usize, diags: &mut Diagnostics) {
    let value = value.trim();
    match name {
        "title" | "t" => sheet.title = Some(value.to_string()),
        "artist" | "subtitle" | "st" | "author" if sheet.artist.is_none() => sheet.artist = Some(value.to_string()),
        "key" => match value.parse::<Key>() {
            Ok(key) => sheet.original_key = Some(key),
            Err(e) => diags.add(DiagnosticMark::warning(line_number, 0, "invalid_key", e.to_string())),
        },
        _ => {
            sheet.metadata.insert(name.to_string(), value.to_string());
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Title:`/`Artist:`/`Key:` block plus known metadata fields.
/// Fields the format cannot carry are reported in `dropped`.
pub fn render_fields(sheet: &Chordsheet, with_title: bool, dropped: &mut Vec<String>) -> Vec<String> {
    let mut lines = Vec::new();
    if with_title {
        if let Some(title) = &sheet.title {
            lines.push(format!("Title: {}", title));
        }
        if let Some(artist) = &sheet.artist {
            lines.push(format!("Artist: {}", artist));
        }
    }
    if let Some(key) = &sheet.original_key {
        lines.push(format!("Key: {}", key));
    }
    for (name, value) in &sheet.metadata {
        if KNOWN_FIELDS.contains(&name.as_str()) {
            lines.push(format!("{}: {}", capitalize(name), value));
        } else {
            dropped.push(name.clone());
        }
    }
    lines
}

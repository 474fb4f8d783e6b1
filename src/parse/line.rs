//! Line-level chord extraction
//!
//! Two layouts exist in the wild:
//! - inline: `[C]Amazing [F]grace`, chord brackets stripped from the lyric
//! - above: a chord line whose columns line up with the lyric below it
//!
//! Positions are always character offsets in the lyric, never byte offsets
//! and never offsets into the bracketed source.

use once_cell::sync::Lazy;
use regex::Regex;

use super::chord::{is_chord_token, ChordSyntax, ParsedChord};
use crate::diagnostics::{DiagnosticMark, Diagnostics};
use crate::errors::ChordParseError;
use crate::models::{Chord, Placement, TextLine};

/// Chart symbols that may share a chord line without being chords
static NEUTRAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\|+|/+|-+|%|\.+|:?\|\|?:?|N\.?C\.?|\(?[xX]\d+\)?|\(?\d+[xX]\)?)$").unwrap());

/// Result of splitting one source line into lyric and chords
#[derive(Debug, Clone, PartialEq)]
pub struct LineParse {
    pub text: String,
    pub chords: Vec<Chord>,
}

/// Whitespace-separated tokens with their starting character column
pub fn tokens_with_columns(line: &str) -> Vec<(usize, String)> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for (col, c) in line.chars().enumerate() {
        if c.is_whitespace() {
            if !current.is_empty() {
                tokens.push((start, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                start = col;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push((start, current));
    }
    tokens
}

pub fn is_neutral_token(token: &str) -> bool {
    NEUTRAL_TOKEN.is_match(token)
}

/// A line made only of chords (and chart symbols), with at least one chord
pub fn is_chord_line(line: &str, syntax: ChordSyntax<'_>) -> bool {
    let tokens = tokens_with_columns(line);
    let mut chords = 0;
    for (_, token) in &tokens {
        if is_chord_token(token, syntax) {
            chords += 1;
        } else if !is_neutral_token(token) {
            return false;
        }
    }
    chords > 0
}

/// Record a warning for a token the syntax could not read, or for an
/// unknown suffix on a chord that was read
fn report(
    result: &Result<ParsedChord, ChordParseError>,
    token: &str,
    line_number: usize,
    col: usize,
    diags: &mut Diagnostics,
) {
    match result {
        Err(_) => diags.add(DiagnosticMark::warning(
            line_number,
            col,
            "invalid_chord",
            format!("Skipping invalid chord: \"{}\"", token),
        )),
        Ok(parsed) => {
            if let Some(suffix) = &parsed.unknown_suffix {
                diags.add(DiagnosticMark::warning(
                    line_number,
                    col,
                    "unknown_suffix",
                    format!("Unrecognized chord suffix \"{}\" in \"{}\"", suffix, token),
                ));
            }
        }
    }
}

/// Extract `[Chord]` brackets from a lyric line.
///
/// Invalid bracket contents are dropped with a warning; an unclosed `[` is
/// kept as literal text.
pub fn parse_inline(
    raw: &str,
    syntax: ChordSyntax<'_>,
    line_number: usize,
    diags: &mut Diagnostics,
) -> LineParse {
    let chars: Vec<char> = raw.chars().collect();
    let mut text = String::new();
    let mut text_len = 0;
    let mut chords = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '[' {
            if let Some(close) = chars[i + 1..].iter().position(|&c| c == ']') {
                let token: String = chars[i + 1..i + 1 + close].iter().collect();
                let result = syntax.parse(&token);
                report(&result, &token, line_number, i, diags);
                if let Ok(parsed) = result {
                    chords.push(parsed.chord.with_position(text_len));
                }
                i += close + 2;
                continue;
            }
        }
        text.push(chars[i]);
        text_len += 1;
        i += 1;
    }

    LineParse { text, chords }
}

/// Combine a chord line with the lyric line under it.
///
/// Each chord lands at its column in the lyric; when a chord sits past the
/// end of the lyric the lyric is padded with spaces up to that column.
pub fn merge_chord_line(
    chord_line: &str,
    lyric: Option<&str>,
    syntax: ChordSyntax<'_>,
    line_number: usize,
    diags: &mut Diagnostics,
) -> LineParse {
    let mut text = lyric.unwrap_or("").trim_end().to_string();
    let mut chords = Vec::new();

    for (col, token) in tokens_with_columns(chord_line) {
        if is_neutral_token(&token) {
            continue;
        }
        let result = syntax.parse(&token);
        report(&result, &token, line_number, col, diags);
        if let Ok(parsed) = result {
            chords.push(parsed.chord.with_position(col));
        }
    }

    if let Some(last) = chords.iter().map(Chord::position).max() {
        let len = text.chars().count();
        if last > len {
            text.extend(std::iter::repeat(' ').take(last - len));
        }
    }

    LineParse { text, chords }
}

impl LineParse {
    pub fn into_text_line(self, placement: Placement, line_number: usize) -> TextLine {
        TextLine::new(self.text, self.chords, placement, line_number)
    }
}

/// Render chords as a column-aligned line over the lyric.
/// Colliding chords are pushed right, keeping one space between symbols.
/// Returns (chord_line, lyric) with trailing whitespace removed.
pub fn render_chord_line<F>(line: &TextLine, symbol: F) -> (String, String)
where
    F: Fn(&Chord) -> String,
{
    let mut chord_line = String::new();
    let mut width = 0;

    for placement in &line.chords {
        let text = symbol(&placement.chord);
        let mut col = placement.start_index;
        if width > 0 && col <= width {
            col = width + 1;
        }
        if col > width {
            chord_line.extend(std::iter::repeat(' ').take(col - width));
            width = col;
        }
        width += text.chars().count();
        chord_line.push_str(&text);
    }

    (chord_line, line.text.trim_end().to_string())
}

/// Render chords as brackets inside the lyric: `[C]Amazing [F]grace`
pub fn render_inline<F>(line: &TextLine, open: &str, close: &str, symbol: F) -> String
where
    F: Fn(&Chord) -> String,
{
    let mut out = String::new();
    let mut chords = line.chords.iter().peekable();
    let text = line.text.trim_end();
    let len = text.chars().count();

    for (idx, c) in text.chars().enumerate() {
        while let Some(p) = chords.next_if(|p| p.start_index <= idx) {
            out.push_str(open);
            out.push_str(&symbol(&p.chord));
            out.push_str(close);
        }
        out.push(c);
    }
    // Chords at or past the end of the trimmed lyric keep their columns
    let mut cursor = len;
    for p in chords {
        let pad = p.start_index.saturating_sub(cursor);
        out.extend(std::iter::repeat(' ').take(pad));
        cursor += pad;
        out.push_str(open);
        out.push_str(&symbol(&p.chord));
        out.push_str(close);
    }
    out
}

//! Parsing module for chord sheets
//!
//! Format-independent pieces: the chord token grammar, line-level chord
//! extraction, section header recognition and annotation classification.
//! Format parsers in `crate::formats` are built from these.

pub mod chord;
pub mod line;
pub mod sections;
pub mod annotations;

// Re-export commonly used types
pub use chord::{is_chord_token, parse_chord, parse_nashville, ChordSyntax, ParsedChord};
pub use line::{is_chord_line, merge_chord_line, parse_inline, LineParse};
pub use sections::{Header, SheetBuilder};
pub use annotations::classify;

use crate::diagnostics::Diagnostics;

/// Parse every chord on one line, inline brackets or a bare chord line.
///
/// Returns the bracket-free lyric with its chords plus warnings for skipped
/// tokens.
pub fn parse_line(line: &str) -> (LineParse, Vec<String>) {
    let mut diags = Diagnostics::new();
    let parsed = if line.contains('[') {
        parse_inline(line, ChordSyntax::Letter, 1, &mut diags)
    } else if is_chord_line(line, ChordSyntax::Letter) {
        merge_chord_line(line, None, ChordSyntax::Letter, 1, &mut diags)
    } else {
        LineParse { text: line.to_string(), chords: Vec::new() }
    };
    (parsed, diags.into_warnings())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_inline() {
        let (parsed, warnings) = parse_line("[X]Test [C]chord");
        let chords = parsed.chords;
        assert_eq!(parsed.text, "Test chord");
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].to_string(), "C");
        assert_eq!(warnings, vec!["Line 1: Skipping invalid chord: \"X\"".to_string()]);
    }

    #[test]
    fn test_parse_line_chord_line() {
        let (parsed, warnings) = parse_line("G   D/F#   Em");
        let chords = parsed.chords;
        assert!(warnings.is_empty());
        let symbols: Vec<String> = chords.iter().map(|c| c.to_string()).collect();
        assert_eq!(symbols, vec!["G", "D/F#", "Em"]);
        assert_eq!(chords[1].position(), 4);
    }

    #[test]
    fn test_parse_line_plain_lyric() {
        let (parsed, warnings) = parse_line("Amazing grace how sweet the sound");
        assert!(parsed.chords.is_empty());
        assert_eq!(parsed.text, "Amazing grace how sweet the sound");
        assert!(warnings.is_empty());
    }
}

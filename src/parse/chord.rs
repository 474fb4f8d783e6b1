//! Chord token grammar
//!
//! chord   := root quality? extension* ("/" root)?
//! root    := [A-G] ("#" | "b")?
//! quality := "m" | "min" | "-" | "dim" | "°" | "o" | "aug" | "+" | "5" | "ø"
//! extension := "maj" N | "M" N | "sus" N? | "add" N | ("b" | "#") N | N
//!
//! Extensions are read left to right and kept in order. Whatever cannot be
//! read is kept verbatim as `Extension::Other` so nothing is silently lost;
//! callers turn that into a warning. Nashville tokens swap the root for a
//! scale degree ([b#]?[1-7]) and share the rest of the grammar.

use crate::errors::ChordParseError;
use crate::models::{Accidental, Chord, ChordRoot, Extension, Key, NashvilleNumber, Quality};
use crate::transposition::degrees::pitch_class_of_degree;

/// Result of reading one chord token
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChord {
    pub chord: Chord,
    /// Trailing text the grammar did not understand
    pub unknown_suffix: Option<String>,
}

/// How chord tokens are written in a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChordSyntax<'a> {
    /// Letter names: C, F#m7, Bb/D
    Letter,
    /// Scale degrees resolved against a key: 1, 6m, b7, 5/7
    Nashville(&'a Key),
}

impl ChordSyntax<'_> {
    pub fn parse(&self, token: &str) -> Result<ParsedChord, ChordParseError> {
        match self {
            ChordSyntax::Letter => parse_chord(token),
            ChordSyntax::Nashville(key) => parse_nashville(token, key),
        }
    }
}

/// Parse a letter-name chord token such as "F#m7b5/E"
pub fn parse_chord(token: &str) -> Result<ParsedChord, ChordParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ChordParseError::Empty);
    }

    let (root, consumed) =
        ChordRoot::read_prefix(token).ok_or_else(|| ChordParseError::InvalidRoot(token.to_string()))?;
    let (body, bass) = split_bass(&token[consumed..], |s| s.parse::<ChordRoot>().ok());

    let suffix = parse_suffix(body);
    let chord = Chord::parsed(root, suffix.quality, suffix.extensions, bass, token);
    Ok(ParsedChord { chord, unknown_suffix: suffix.unknown })
}

/// Parse a Nashville number token ("4", "6m7", "b7", "5/7") in `key`
pub fn parse_nashville(token: &str, key: &Key) -> Result<ParsedChord, ChordParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ChordParseError::Empty);
    }

    let (degree, accidental, consumed) =
        read_degree(token).ok_or_else(|| ChordParseError::InvalidDegree(token.to_string()))?;
    let (body, bass) = split_bass(&token[consumed..], |s| match read_degree(s) {
        Some((d, acc, used)) if used == s.len() => Some(key.spell(pitch_class_of_degree(d, acc, key))),
        _ => None,
    });

    let suffix = parse_suffix(body);
    let number = NashvilleNumber::new(degree, accidental, suffix.quality)?;
    let root = key.spell(pitch_class_of_degree(degree, accidental, key));
    let chord = Chord::parsed(root, suffix.quality, suffix.extensions, bass, token).with_nashville(number);
    Ok(ParsedChord { chord, unknown_suffix: suffix.unknown })
}

/// Strict check: parses and has no unknown suffix
pub fn is_chord_token(token: &str, syntax: ChordSyntax<'_>) -> bool {
    matches!(syntax.parse(token), Ok(parsed) if parsed.unknown_suffix.is_none())
}

/// Read "[b#]?[1-7]" at the start of `s`
fn read_degree(s: &str) -> Option<(u8, Accidental, usize)> {
    let mut chars = s.chars();
    let first = chars.next()?;
    let (accidental, digit, consumed) = match Accidental::from_char(first) {
        Some(acc) => (acc, chars.next()?, first.len_utf8() + 1),
        None => (Accidental::Natural, first, 1),
    };
    let degree = digit.to_digit(10)? as u8;
    if (1..=7).contains(&degree) {
        Some((degree, accidental, consumed))
    } else {
        None
    }
}

/// Split "m7/G" into ("m7", Some(G)). A slash followed by something that is
/// not a bass note stays in the body ("6/9").
fn split_bass<F>(rest: &str, read_bass: F) -> (&str, Option<ChordRoot>)
where
    F: Fn(&str) -> Option<ChordRoot>,
{
    if let Some(idx) = rest.rfind('/') {
        if let Some(bass) = read_bass(&rest[idx + 1..]) {
            return (&rest[..idx], Some(bass));
        }
    }
    (rest, None)
}

struct Suffix {
    quality: Quality,
    extensions: Vec<Extension>,
    unknown: Option<String>,
}

/// Read quality marker and extensions
fn parse_suffix(s: &str) -> Suffix {
    let cleaned: String = s.chars().filter(|c| !matches!(c, '(' | ')' | ',')).collect();
    let mut rest = cleaned.as_str();
    let mut extensions = Vec::new();

    let quality = read_quality(&mut rest, &mut extensions);

    while !rest.is_empty() {
        match read_extension(rest) {
            Some((ext, consumed)) => {
                extensions.extend(ext);
                rest = &rest[consumed..];
            }
            None => break,
        }
    }

    let unknown = if rest.is_empty() {
        None
    } else {
        extensions.push(Extension::Other(rest.to_string()));
        Some(rest.to_string())
    };

    Suffix { quality, extensions, unknown }
}

fn read_quality(rest: &mut &str, extensions: &mut Vec<Extension>) -> Quality {
    let s = *rest;
    let lower = s.to_lowercase();

    // "maj7", "M7", "Maj9" are major extensions, handled by the extension loop
    if lower.starts_with("maj") || s.starts_with('M') || s.starts_with('Δ') || s.starts_with('△') {
        if lower == "maj" || s == "M" {
            *rest = "";
        }
        return Quality::Major;
    }

    let markers: [(&str, Quality); 9] = [
        ("min", Quality::Minor),
        ("dim", Quality::Diminished),
        ("aug", Quality::Augmented),
        ("m", Quality::Minor),
        ("-", Quality::Minor),
        ("°", Quality::Diminished),
        ("o", Quality::Diminished),
        ("+", Quality::Augmented),
        ("ø", Quality::Minor),
    ];

    for (marker, quality) in markers {
        if let Some(after) = s.strip_prefix(marker) {
            *rest = after;
            if marker == "ø" {
                // Half-diminished: m7b5
                *rest = after.strip_prefix('7').unwrap_or(after);
                extensions.push(Extension::Dominant(7));
                extensions.push(Extension::Altered(Accidental::Flat, 5));
            }
            return quality;
        }
    }

    // Power chord: a lone 5 (not 5 followed by more digits)
    if let Some(after) = s.strip_prefix('5') {
        if !after.starts_with(|c: char| c.is_ascii_digit()) {
            *rest = after;
            return Quality::Power;
        }
    }

    Quality::Major
}

/// Read one extension; returns what was read and the bytes consumed
fn read_extension(s: &str) -> Option<(Option<Extension>, usize)> {
    let lower = s.to_lowercase();

    if lower.starts_with("maj") {
        return match read_number(&s[3..]) {
            Some((n, used)) => Some((Some(Extension::Major(n)), 3 + used)),
            None => None,
        };
    }
    if let Some(after) = s.strip_prefix('M') {
        let (n, used) = read_number(after)?;
        return Some((Some(Extension::Major(n)), 1 + used));
    }
    for triangle in ['Δ', '△'] {
        if let Some(after) = s.strip_prefix(triangle) {
            let width = triangle.len_utf8();
            return match read_number(after) {
                Some((n, used)) => Some((Some(Extension::Major(n)), width + used)),
                None => Some((Some(Extension::Major(7)), width)),
            };
        }
    }
    if lower.starts_with("sus") {
        return match read_number(&s[3..]) {
            Some((n, used)) => Some((Some(Extension::Sus(n)), 3 + used)),
            None => Some((Some(Extension::Sus(4)), 3)),
        };
    }
    if lower.starts_with("add") {
        let (n, used) = read_number(&s[3..])?;
        return Some((Some(Extension::Add(n)), 3 + used));
    }
    if let Some(first) = s.chars().next() {
        if let Some(acc) = Accidental::from_char(first) {
            let width = first.len_utf8();
            let (n, used) = read_number(&s[width..])?;
            return Some((Some(Extension::Altered(acc, n)), width + used));
        }
    }
    // "6/9" reads as 6 add 9
    if let Some(after) = s.strip_prefix('/') {
        let (n, used) = read_number(after)?;
        return Some((Some(Extension::Add(n)), 1 + used));
    }
    let (n, used) = read_number(s)?;
    Some((Some(Extension::Dominant(n)), used))
}

/// Read an extension number (2-13)
fn read_number(s: &str) -> Option<(u8, usize)> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    // "13" is the largest extension; "69" style runs split after one digit
    let (digits, used) = if digits.len() > 2 || digits.parse::<u8>().map_or(true, |n| n > 13) {
        (digits[..1].to_string(), 1)
    } else {
        (digits.clone(), digits.len())
    };
    let n = digits.parse::<u8>().ok()?;
    if n >= 2 {
        Some((n, used))
    } else {
        None
    }
}

//! Chord and chord sheet transposition
//!
//! Root and bass shift by the same interval; quality and extensions are
//! copied. The new spelling comes from the target key's spelling table when
//! one is given, otherwise the chord keeps its own accidental family.

use crate::errors::AppError;
use crate::models::{Accidental, Chord, ChordPlacement, ChordRoot, Chordsheet, Key, Line, TextLine};
use crate::parse::chord::parse_chord;

/// Signed shortest distance from one key to another, in -5..=6.
///
/// `(from + distance) mod 12 == to`; the tritone is +6. Mode is ignored:
/// only tonics are compared.
pub fn key_distance(from: &Key, to: &Key) -> i32 {
    let forward = (to.pitch_class().index() as i32 - from.pitch_class().index() as i32).rem_euclid(12);
    if forward > 6 {
        forward - 12
    } else {
        forward
    }
}

/// Shift one note and respell it
fn transpose_root(root: ChordRoot, semitones: i32, target_key: Option<&Key>) -> ChordRoot {
    let pitch = root.pitch_class().transpose(semitones);
    match (target_key, root.accidental) {
        (Some(key), _) => key.spell(pitch),
        (None, Accidental::Flat) => ChordRoot::from_pitch_class(pitch, true),
        (None, Accidental::Sharp) => ChordRoot::from_pitch_class(pitch, false),
        (None, Accidental::Natural) => ChordRoot::canonical(pitch),
    }
}

/// Transpose a chord by `semitones`, returning a new chord.
/// `original_notation` is regenerated from the new parts.
pub fn transpose_chord(chord: &Chord, semitones: i32, target_key: Option<&Key>) -> Chord {
    let root = transpose_root(chord.root(), semitones, target_key);
    let bass = chord.bass_note().map(|b| transpose_root(b, semitones, target_key));

    let transposed = Chord::new(root, chord.quality(), chord.extensions().to_vec(), bass)
        .with_position(chord.position());
    match chord.nashville_number() {
        // Degrees are relative to the key, which moves with the chord
        Some(number) => transposed.with_nashville(*number),
        None => transposed,
    }
}

/// Transpose a chord written as text ("Cmaj7") and return its new symbol
pub fn transpose_symbol(symbol: &str, semitones: i32, target_key: Option<&Key>) -> Result<String, AppError> {
    let parsed = parse_chord(symbol).map_err(|e| {
        AppError::transpose(format!("Cannot transpose \"{}\": {}", symbol, e)).with_code("INVALID_CHORD")
    })?;
    Ok(transpose_chord(&parsed.chord, semitones, target_key).symbol())
}

fn transpose_line(line: &Line, semitones: i32, target_key: Option<&Key>) -> Line {
    match line {
        Line::Text(text) => Line::Text(TextLine {
            text: text.text.clone(),
            chords: text
                .chords
                .iter()
                .map(|p| ChordPlacement {
                    chord: transpose_chord(&p.chord, semitones, target_key),
                    start_index: p.start_index,
                    end_index: p.end_index,
                    placement: p.placement,
                })
                .collect(),
            line_number: text.line_number,
        }),
        Line::Empty(_) | Line::Annotation(_) => line.clone(),
    }
}

/// Shift every chord by `semitones`. The sheet's key (if any) moves too and
/// decides the spelling. Returns a new sheet; the input is untouched.
pub fn transpose_sheet_by(sheet: &Chordsheet, semitones: i32) -> Chordsheet {
    let target_key = sheet.original_key.map(|k| k.transpose(semitones));
    rebuild(sheet, semitones, target_key)
}

/// Transpose a sheet from `from` to `to`, spelling with `to`'s table
pub fn transpose_sheet(sheet: &Chordsheet, from: &Key, to: &Key) -> Chordsheet {
    let semitones = key_distance(from, to);
    log::debug!("transposing {} -> {} ({:+} semitones)", from, to, semitones);
    rebuild(sheet, semitones, Some(*to))
}

fn rebuild(sheet: &Chordsheet, semitones: i32, target_key: Option<Key>) -> Chordsheet {
    let mut out = sheet.clone();
    for section in &mut out.sections {
        section.lines = section
            .lines
            .iter()
            .map(|line| transpose_line(line, semitones, target_key.as_ref()))
            .collect();
    }
    out.original_key = target_key;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    fn chord(s: &str) -> Chord {
        parse_chord(s).unwrap().chord
    }

    #[test]
    fn test_key_distance_convention() {
        assert_eq!(key_distance(&key("C"), &key("D")), 2);
        assert_eq!(key_distance(&key("D"), &key("C")), -2);
        assert_eq!(key_distance(&key("C"), &key("F#")), 6);
        assert_eq!(key_distance(&key("C"), &key("G")), -5);
        assert_eq!(key_distance(&key("G"), &key("G")), 0);
        assert_eq!(key_distance(&key("Bb"), &key("C")), 2);
    }

    #[test]
    fn test_transpose_keeps_extensions() {
        let out = transpose_chord(&chord("Cmaj7"), 2, Some(&key("D")));
        assert_eq!(out.root().to_string(), "D");
        assert_eq!(out.suffix(), "maj7");
        assert_eq!(out.original_notation(), "Dmaj7");
    }

    #[test]
    fn test_slash_chord_moves_both_notes() {
        let out = transpose_chord(&chord("F/C"), 7, Some(&key("C")));
        assert_eq!(out.to_string(), "C/G");
    }

    #[test]
    fn test_spelling_follows_target_key() {
        assert_eq!(transpose_chord(&chord("G"), 3, Some(&key("F"))).to_string(), "Bb");
        assert_eq!(transpose_chord(&chord("G"), 3, Some(&key("B"))).to_string(), "A#");
        assert_eq!(transpose_chord(&chord("Db"), 2, None).to_string(), "Eb");
        assert_eq!(transpose_chord(&chord("C#"), 2, None).to_string(), "D#");
    }

    #[test]
    fn test_position_preserved() {
        let original = chord("Am7").with_position(12);
        assert_eq!(transpose_chord(&original, -3, None).position(), 12);
    }

    #[test]
    fn test_transpose_symbol_rejects_garbage() {
        assert_eq!(transpose_symbol("Bb7", 2, None).unwrap(), "C7");
        let err = transpose_symbol("X7", 2, None).unwrap_err();
        assert_eq!(err.error_type, crate::errors::ErrorType::TransposeError);
    }
}

/// Scale-degree mapping for Nashville numbers
///
/// Degrees are counted on the major scale of the key's tonic, whatever the
/// mode: in A minor the tonic chord is "1m" and C major is "b3".
/// Chromatic notes get the conventional Nashville spelling:
/// b2, b3, #4, b6, b7.

use crate::models::key::MAJOR_SCALE;
use crate::models::{Accidental, Key, PitchClass};

/// (degree, accidental) for each semitone above the tonic
const CHROMATIC_DEGREES: [(u8, Accidental); 12] = [
    (1, Accidental::Natural),
    (2, Accidental::Flat),
    (2, Accidental::Natural),
    (3, Accidental::Flat),
    (3, Accidental::Natural),
    (4, Accidental::Natural),
    (4, Accidental::Sharp),
    (5, Accidental::Natural),
    (6, Accidental::Flat),
    (6, Accidental::Natural),
    (7, Accidental::Flat),
    (7, Accidental::Natural),
];

/// Chromatic pitch class of a degree (1-7) plus accidental in `key`
pub fn pitch_class_of_degree(degree: u8, accidental: Accidental, key: &Key) -> PitchClass {
    let index = (degree.clamp(1, 7) - 1) as usize;
    key.pitch_class()
        .transpose(MAJOR_SCALE[index] as i32 + accidental.offset() as i32)
}

/// Degree and accidental of a pitch class in `key`
pub fn degree_in_key(pitch: PitchClass, key: &Key) -> (u8, Accidental) {
    let interval = (pitch.index() as i32 - key.pitch_class().index() as i32).rem_euclid(12);
    CHROMATIC_DEGREES[interval as usize]
}

//! Key detection from a chord vocabulary
//!
//! Every one of the 24 major/minor keys is scored on three things: how many
//! chords are diatonic to it, how many common progressions it explains and
//! whether the song starts or ends on its tonic.

use serde::{Serialize, Serializer};

use crate::formats::{FormatRegistry, NashvilleFormat};
use crate::models::{Accidental, Chord, ChordRoot, Extension, Key, Letter, NotationFormat, Quality};

const FIT_WEIGHT: f64 = 0.6;
const PROGRESSION_WEIGHT: f64 = 0.25;
const TONIC_WEIGHT: f64 = 0.15;
/// Confidence reported when no key fits at all
const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Roman numerals of the seven degrees with their diatonic triad quality
const MAJOR_NUMERALS: [(&str, Quality); 7] = [
    ("I", Quality::Major),
    ("ii", Quality::Minor),
    ("iii", Quality::Minor),
    ("IV", Quality::Major),
    ("V", Quality::Major),
    ("vi", Quality::Minor),
    ("vii°", Quality::Diminished),
];

const MINOR_NUMERALS: [(&str, Quality); 7] = [
    ("i", Quality::Minor),
    ("ii°", Quality::Diminished),
    ("III", Quality::Major),
    ("iv", Quality::Minor),
    ("v", Quality::Minor),
    ("VI", Quality::Major),
    ("VII", Quality::Major),
];

enum Pattern {
    /// All members present anywhere
    Set(&'static [&'static str]),
    /// Members in a contiguous run
    Sequence(&'static [&'static str]),
}

const MAJOR_PROGRESSIONS: [Pattern; 6] = [
    Pattern::Set(&["I", "IV", "V"]),
    Pattern::Sequence(&["I", "V", "vi", "IV"]),
    Pattern::Sequence(&["I", "vi", "IV", "V"]),
    Pattern::Sequence(&["vi", "IV", "I", "V"]),
    Pattern::Sequence(&["ii", "V", "I"]),
    Pattern::Sequence(&["IV", "V", "I"]),
];

const MINOR_PROGRESSIONS: [Pattern; 5] = [
    Pattern::Set(&["i", "iv", "V"]),
    Pattern::Sequence(&["i", "iv", "v"]),
    Pattern::Sequence(&["i", "VI", "VII"]),
    Pattern::Sequence(&["i", "VII", "VI"]),
    Pattern::Sequence(&["ii°", "V", "i"]),
];

impl Pattern {
    fn name(&self) -> String {
        match self {
            Pattern::Set(members) | Pattern::Sequence(members) => members.join("-"),
        }
    }

    fn matches(&self, numerals: &[Option<&'static str>]) -> bool {
        match self {
            Pattern::Set(members) => members.iter().all(|m| numerals.contains(&Some(*m))),
            Pattern::Sequence(members) => numerals.windows(members.len()).any(|window| {
                window.iter().zip(members.iter()).all(|(numeral, member)| *numeral == Some(*member))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAnalysis {
    /// Names of the progressions found ("I-IV-V", "ii-V-I", ...)
    pub progression_matches: Vec<String>,
    /// Fraction of chords diatonic to the chosen key
    pub diatonic_fit: f64,
    pub chord_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDetectionResult {
    /// Serialized as the tonic alone; the mode is `is_minor`
    #[serde(serialize_with = "serialize_tonic")]
    pub key: Key,
    pub is_minor: bool,
    pub confidence: f64,
    pub analysis: KeyAnalysis,
}

fn serialize_tonic<S>(key: &Key, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&key.tonic.to_string())
}

impl KeyDetectionResult {
    fn fallback(confidence: f64, chord_count: usize) -> Self {
        Self {
            key: Key::c_major(),
            is_minor: false,
            confidence,
            analysis: KeyAnalysis {
                progression_matches: Vec::new(),
                diatonic_fit: 0.0,
                chord_count,
            },
        }
    }
}

/// Sus and power chords carry no third, so they fit on their root alone
fn is_ambiguous(chord: &Chord) -> bool {
    chord.quality() == Quality::Power || chord.extensions().iter().any(|e| matches!(e, Extension::Sus(_)))
}

/// Roman numeral of `chord` in `key`, or None when it is not diatonic
fn numeral(chord: &Chord, key: &Key) -> Option<&'static str> {
    let pitch = chord.root().pitch_class();
    let degree = key.scale().iter().position(|p| *p == pitch)?;
    let (name, quality) = if key.is_minor {
        MINOR_NUMERALS[degree]
    } else {
        MAJOR_NUMERALS[degree]
    };

    if is_ambiguous(chord) || chord.quality() == quality {
        return Some(name);
    }
    // Harmonic minor dominant
    if key.is_minor && degree == 4 && chord.quality() == Quality::Major {
        return Some("V");
    }
    None
}

struct Candidate {
    key: Key,
    score: f64,
    fit: f64,
    matches: Vec<String>,
}

fn evaluate(chords: &[&Chord], key: Key) -> Candidate {
    let numerals: Vec<Option<&'static str>> = chords.iter().map(|c| numeral(c, &key)).collect();
    let fit = numerals.iter().filter(|n| n.is_some()).count() as f64 / chords.len() as f64;

    // Consecutive repeats of one chord do not break a progression
    let mut collapsed: Vec<Option<&'static str>> = Vec::new();
    let mut previous: Option<&Chord> = None;
    for (chord, roman) in chords.iter().zip(&numerals) {
        if previous.is_some_and(|p| p.same_harmony(chord)) {
            continue;
        }
        collapsed.push(*roman);
        previous = Some(*chord);
    }

    let table: &[Pattern] = if key.is_minor { &MINOR_PROGRESSIONS } else { &MAJOR_PROGRESSIONS };
    let matches: Vec<String> = table.iter().filter(|p| p.matches(&collapsed)).map(Pattern::name).collect();

    let tonic = if key.is_minor { "i" } else { "I" };
    let mut emphasis = 0.0;
    if numerals.first().copied().flatten() == Some(tonic) {
        emphasis += 0.5;
    }
    if numerals.last().copied().flatten() == Some(tonic) {
        emphasis += 0.5;
    }

    let progression = matches.len().min(3) as f64 / 3.0;
    let score = FIT_WEIGHT * fit + PROGRESSION_WEIGHT * progression + TONIC_WEIGHT * emphasis;
    Candidate { key, score, fit, matches }
}

/// All 24 keys, majors first, each in ascending pitch class order
fn candidate_keys() -> impl Iterator<Item = Key> {
    let c = ChordRoot::new(Letter::C, Accidental::Natural);
    let majors = (0..12).map(move |pc| Key::major(c).transpose(pc));
    let minors = (0..12).map(move |pc| Key::minor(c).transpose(pc));
    majors.chain(minors)
}

/// Most likely key for chords in document order
pub fn detect_key_from_chords(chords: &[&Chord]) -> KeyDetectionResult {
    if chords.is_empty() {
        return KeyDetectionResult::fallback(0.0, 0);
    }

    let mut best: Option<Candidate> = None;
    for key in candidate_keys() {
        let candidate = evaluate(chords, key);
        if best.as_ref().map_or(true, |b| candidate.score > b.score + f64::EPSILON) {
            best = Some(candidate);
        }
    }

    match best {
        Some(best) if best.fit > 0.0 => {
            log::debug!("detect_key: {} scored {:.2} ({:?})", best.key, best.score, best.matches);
            KeyDetectionResult {
                is_minor: best.key.is_minor,
                key: best.key,
                confidence: best.score.clamp(0.0, 1.0),
                analysis: KeyAnalysis {
                    progression_matches: best.matches,
                    diatonic_fit: best.fit,
                    chord_count: chords.len(),
                },
            }
        }
        _ => KeyDetectionResult::fallback(FALLBACK_CONFIDENCE, chords.len()),
    }
}

/// Most likely key of a chord sheet written in `format`.
///
/// Nashville charts are relative to a stated key, so that key is returned
/// as-is; an unparseable document falls back to C major with confidence 0.
pub fn detect_key(text: &str, format: NotationFormat) -> KeyDetectionResult {
    if format == NotationFormat::Nashville {
        return match NashvilleFormat::stated_key(text) {
            Some(key) => KeyDetectionResult {
                key,
                is_minor: key.is_minor,
                confidence: 1.0,
                analysis: KeyAnalysis {
                    progression_matches: Vec::new(),
                    diatonic_fit: 1.0,
                    chord_count: 0,
                },
            },
            None => KeyDetectionResult::fallback(0.0, 0),
        };
    }

    let registry = FormatRegistry::default();
    let parsed = match registry.get(format).map(|handler| handler.parse(text)) {
        Some(Ok(parsed)) => parsed,
        _ => return KeyDetectionResult::fallback(0.0, 0),
    };
    let chords: Vec<&Chord> = parsed.sheet.chords().collect();
    detect_key_from_chords(&chords)
}

//! Annotation classification
//!
//! Formats mark annotations differently (`*text`, `(text)`, `{comment:}`,
//! `<b>text</b>`) but the kind is read from the words themselves.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::AnnotationType;

static TEMPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(tempo|bpm)\b|♩\s*=|\b\d{2,3}\s*bpm\b").unwrap());

static DYNAMICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(soft(ly)?|loud(ly)?|quiet(ly)?|build|builds|building|crescendo|cresc|decrescendo|decresc|diminuendo|pp|p|mp|mf|f|ff|fortissimo|pianissimo|forte|piano|big|gentle|gently|down|drop)\b",
    )
    .unwrap()
});

static INSTRUCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(repeat|x\d+|\d+x|play|hold|stop|vamp|tacet|all in|band in|drums|key change|modulate|fine|d\.?s\.?|d\.?c\.?|segue|to (the )?(verse|chorus|bridge|intro|outro|tag|coda)|go to|back to|twice|once|instrumental)\b",
    )
    .unwrap()
});

/// Decide the kind of an annotation from its text
pub fn classify(value: &str) -> AnnotationType {
    if TEMPO.is_match(value) {
        AnnotationType::Tempo
    } else if INSTRUCTION.is_match(value) {
        AnnotationType::Instruction
    } else if DYNAMICS.is_match(value) {
        AnnotationType::Dynamics
    } else {
        AnnotationType::Comment
    }
}

// Format and key detection over whole documents

use chordsheet_wasm::detection::{detect_format, detect_key};
use chordsheet_wasm::models::NotationFormat;

const DOCUMENTS: [(&str, NotationFormat); 6] = [
    (
        "{title: Amazing Grace}\n{start_of_verse}\n[G]Amazing [C]grace\n{end_of_verse}\n",
        NotationFormat::ChordPro,
    ),
    ("Amazing Grace\n\nVerse 1:\n[G]Amazing [C]grace\n*Softly\n", NotationFormat::OnSong),
    ("[Verse 1]\nG       C\nAmazing grace\n(Softly)\n", NotationFormat::SongbookPro),
    ("VERSE 1\n[G]Amazing [C]grace\n<b>Repeat</b>\n", NotationFormat::PlanningCenter),
    (
        "Intro:\ne|---3---|\nB|---0---|\n\nVerse:\nG       C\nAmazing grace\n",
        NotationFormat::GuitarTabs,
    ),
    ("Key: G\n\nVerse:\n1       4\nAmazing grace\n", NotationFormat::Nashville),
];

#[test]
fn test_detects_each_format() {
    for (text, expected) in DOCUMENTS {
        let result = detect_format(text);
        assert_eq!(result.format, expected, "wrong format for:\n{}", text);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
        assert!(!result.indicators.is_empty());
    }
}

#[test]
fn test_detection_is_deterministic() {
    for (text, _) in DOCUMENTS {
        let first = detect_format(text);
        let second = detect_format(text);
        assert_eq!(first.format, second.format);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.indicators, second.indicators);
    }
}

#[test]
fn test_detect_key_pop_progression() {
    let result = detect_key("[C] [Am] [F] [G]", NotationFormat::ChordPro);
    assert_eq!(result.key.to_string(), "C");
    assert!(!result.is_minor);
    assert!(result.confidence >= 0.5, "confidence was {}", result.confidence);
}

#[test]
fn test_detect_key_serializes_for_callers() {
    let result = detect_key("[C] [Am] [F] [G]", NotationFormat::ChordPro);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["key"], "C");
    assert_eq!(json["isMinor"], false);
    assert!(json["confidence"].as_f64().unwrap() >= 0.5);
}

#[test]
fn test_detect_key_in_other_formats() {
    let result = detect_key("[Verse]\nEm      C       G       D\nSomething in the way\n", NotationFormat::SongbookPro);
    assert_eq!(result.key.to_string(), "G");
    assert_eq!(result.analysis.chord_count, 4);

    let result = detect_key("Key: Bb\n\n1 4 5 1\n", NotationFormat::Nashville);
    assert_eq!(result.key.to_string(), "Bb");
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn test_detect_key_without_chords() {
    let result = detect_key("{title: Spoken word}\nNo chords here\n", NotationFormat::ChordPro);
    assert_eq!(result.key.to_string(), "C");
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.analysis.chord_count, 0);
}

// Render then re-parse a chord sheet in every notation and check that the
// harmony and section structure survive

use chordsheet_wasm::formats::FormatRegistry;
use chordsheet_wasm::models::{Chord, Chordsheet, Line, NotationFormat, SectionType};

const SOURCE: &str = "{title: Amazing Grace}
{artist: John Newton}
{key: G}

[G] [C] [G] [D]

{start_of_verse: Verse 1}
[G] [D]
Through many dangers toils and snares
[G]Amazing [G7]grace how [C]sweet the [G]sound
That [G]saved a [Em]wretch like [D/F#]me


Was grace that taught my heart to fear
{c: Softly}
{end_of_verse}

{start_of_chorus}
I [G]once was [D7]lost but [Am7]now am [G]found
{end_of_chorus}

{start_of_bridge}
Was [Em]blind but [Csus2]now I [G]see
{end_of_bridge}
";

fn source_sheet() -> Chordsheet {
    let registry = FormatRegistry::default();
    let outcome = registry
        .get(NotationFormat::ChordPro)
        .unwrap()
        .parse(SOURCE)
        .expect("ChordPro source should parse");
    assert!(outcome.warnings.is_empty(), "unexpected warnings: {:?}", outcome.warnings);
    outcome.sheet
}

fn assert_same_harmony(expected: &Chordsheet, actual: &Chordsheet, format: NotationFormat) {
    let expected: Vec<&Chord> = expected.chords().collect();
    let actual: Vec<&Chord> = actual.chords().collect();
    assert_eq!(expected.len(), actual.len(), "{}: chord count changed", format);
    for (a, b) in expected.iter().zip(actual.iter()) {
        assert!(a.same_harmony(b), "{}: {} came back as {}", format, a, b);
    }
}

/// Per section, one entry per line: chords on a text line, blank run length
/// or an annotation marker
fn line_shapes(sheet: &Chordsheet) -> Vec<Vec<String>> {
    sheet
        .sections
        .iter()
        .map(|section| {
            section
                .lines
                .iter()
                .map(|line| match line {
                    Line::Text(text) => format!("text/{}", text.chords.len()),
                    Line::Empty(empty) => format!("empty/{}", empty.count),
                    Line::Annotation(_) => "annotation".to_string(),
                })
                .collect()
        })
        .collect()
}

#[test]
fn test_source_sheet_shape() {
    let sheet = source_sheet();
    assert_eq!(sheet.title.as_deref(), Some("Amazing Grace"));
    assert_eq!(sheet.chord_count(), 20);
    assert_eq!(
        sheet.section_types(),
        vec![SectionType::Unknown, SectionType::Verse, SectionType::Chorus, SectionType::Bridge]
    );
    assert_eq!(sheet.sections[0].title, None);
    assert_eq!(
        line_shapes(&sheet),
        vec![
            vec!["text/4"],
            vec!["text/2", "text/0", "text/4", "text/3", "empty/2", "text/0", "annotation"],
            vec!["text/4"],
            vec!["text/3"],
        ]
    );
}

#[test]
fn test_round_trip_keeps_lines() {
    let registry = FormatRegistry::default();
    let sheet = source_sheet();
    let expected = line_shapes(&sheet);

    for format in NotationFormat::ALL {
        let handler = registry.get(format).unwrap();
        let rendered = handler.render(&sheet).unwrap();
        let reparsed = handler.parse(&rendered.text).unwrap().sheet;
        assert_eq!(
            line_shapes(&reparsed),
            expected,
            "{}: lines changed between render and parse\n{}",
            format,
            rendered.text
        );
    }
}

#[test]
fn test_round_trip_every_format() {
    let registry = FormatRegistry::default();
    let sheet = source_sheet();

    for format in NotationFormat::ALL {
        let handler = registry.get(format).unwrap();
        let rendered = handler.render(&sheet).expect("render should succeed");
        let reparsed = handler
            .parse(&rendered.text)
            .unwrap_or_else(|e| panic!("{}: re-parse failed: {}\n{}", format, e, rendered.text))
            .sheet;

        assert_same_harmony(&sheet, &reparsed, format);
        assert_eq!(
            sheet.section_types(),
            reparsed.section_types(),
            "{}: section sequence changed\n{}",
            format,
            rendered.text
        );
        assert_eq!(reparsed.title.as_deref(), Some("Amazing Grace"), "{}: title lost", format);
    }
}

#[test]
fn test_render_is_stable_after_one_round_trip() {
    let registry = FormatRegistry::default();
    let sheet = source_sheet();

    for format in NotationFormat::ALL {
        let handler = registry.get(format).unwrap();
        let first = handler.render(&sheet).unwrap().text;
        let second = handler.render(&handler.parse(&first).unwrap().sheet).unwrap().text;
        assert_eq!(first, second, "{}: rendering drifted between passes", format);
    }
}

#[test]
fn test_cross_format_chain_keeps_harmony() {
    let registry = FormatRegistry::default();
    let sheet = source_sheet();

    let mut current = sheet.clone();
    for format in NotationFormat::ALL {
        let handler = registry.get(format).unwrap();
        let text = handler.render(&current).unwrap().text;
        current = handler.parse(&text).unwrap().sheet;
    }
    assert_same_harmony(&sheet, &current, NotationFormat::Nashville);
    assert_eq!(sheet.section_types(), current.section_types());
}

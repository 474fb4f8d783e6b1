//! Source format detection
//!
//! Each format has a small table of weighted indicators. A format scores the
//! matched weight over its total weight; the best score wins and ties go to
//! the format listed first in `NotationFormat::ALL`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::formats::chordpro::{is_environment, parse_directive};
use crate::formats::guitar_tabs::is_tab_staff;
use crate::formats::layout::{paren_annotation, star_annotation};
use crate::formats::metadata::parse_meta_line;
use crate::formats::planning_center::markup_annotation;
use crate::models::{Key, NotationFormat};
use crate::parse::line::is_chord_line;
use crate::parse::sections::{bracket_header, colon_header, upper_header};
use crate::parse::{is_chord_token, ChordSyntax};

static BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]\s]+)\]").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDetectionResult {
    pub format: NotationFormat,
    /// Matched indicator weight over total weight, 0..=1
    pub confidence: f64,
    /// Indicators that matched for the chosen format
    pub indicators: Vec<String>,
}

/// Features of a document that indicators test for
#[derive(Debug, Default)]
struct Features {
    directive: bool,
    environment: bool,
    inline_chord: bool,
    inline_number: bool,
    star_annotation: bool,
    colon_header: bool,
    chord_above_lyric: bool,
    letter_chord_line: bool,
    number_line: bool,
    paren_annotation: bool,
    bracket_header: bool,
    key_field: bool,
    tab_staff: bool,
    markup: bool,
    upper_header: bool,
}

impl Features {
    fn scan(text: &str) -> Self {
        let nashville_key = Key::c_major();
        let numbers = ChordSyntax::Nashville(&nashville_key);
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        let mut f = Features::default();

        for (i, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some((name, _)) = parse_directive(line) {
                f.directive = true;
                f.environment |= is_environment(&name);
                continue;
            }
            if is_tab_staff(line) {
                f.tab_staff = true;
                continue;
            }
            if let Some((name, _)) = parse_meta_line(line) {
                f.key_field |= name == "key";
                continue;
            }
            if markup_annotation(line).is_some() {
                f.markup = true;
                continue;
            }
            if star_annotation(line).is_some() {
                f.star_annotation = true;
                continue;
            }
            if paren_annotation(line).is_some() {
                f.paren_annotation = true;
                continue;
            }
            if colon_header(line).is_some() {
                f.colon_header = true;
                continue;
            }
            if bracket_header(line).is_some() {
                f.bracket_header = true;
                continue;
            }
            if upper_header(line).is_some() {
                f.upper_header = true;
                continue;
            }

            for caps in BRACKET.captures_iter(line) {
                let token = &caps[1];
                if is_chord_token(token, ChordSyntax::Letter) {
                    f.inline_chord = true;
                } else if is_chord_token(token, numbers) {
                    f.inline_number = true;
                }
            }

            if is_chord_line(line, ChordSyntax::Letter) {
                f.letter_chord_line = true;
                let next = lines.get(i + 1).copied().unwrap_or("");
                if !next.trim().is_empty()
                    && !is_chord_line(next, ChordSyntax::Letter)
                    && colon_header(next).is_none()
                    && bracket_header(next).is_none()
                    && !next.contains('[')
                {
                    f.chord_above_lyric = true;
                }
            } else if is_chord_line(line, numbers) {
                f.number_line = true;
            }
        }
        f
    }
}

type Indicator = (&'static str, u32, fn(&Features) -> bool);

const CHORDPRO: &[Indicator] = &[
    ("directive", 3, |f: &Features| f.directive),
    ("environment", 2, |f: &Features| f.environment),
    ("inline_chord", 1, |f: &Features| f.inline_chord),
];

const ONSONG: &[Indicator] = &[
    ("inline_chord", 2, |f: &Features| f.inline_chord),
    ("star_annotation", 2, |f: &Features| f.star_annotation),
    ("colon_header", 1, |f: &Features| f.colon_header),
];

const SONGBOOK_PRO: &[Indicator] = &[
    ("chord_above_lyric", 3, |f: &Features| f.chord_above_lyric),
    ("paren_annotation", 2, |f: &Features| f.paren_annotation),
    ("bracket_header", 1, |f: &Features| f.bracket_header),
];

const NASHVILLE: &[Indicator] = &[
    ("number_chords", 3, |f: &Features| f.number_line || f.inline_number),
    ("number_lines_only", 2, |f: &Features| f.number_line && !f.letter_chord_line && !f.inline_chord),
    ("key_field", 1, |f: &Features| f.key_field),
];

const GUITAR_TABS: &[Indicator] = &[
    ("tab_staff", 3, |f: &Features| f.tab_staff),
    ("colon_header", 1, |f: &Features| f.colon_header),
    ("chord_above_lyric", 1, |f: &Features| f.chord_above_lyric),
];

const PLANNING_CENTER: &[Indicator] = &[
    ("markup", 3, |f: &Features| f.markup),
    ("upper_header", 2, |f: &Features| f.upper_header),
    ("inline_chord", 1, |f: &Features| f.inline_chord),
];

fn indicators(format: NotationFormat) -> &'static [Indicator] {
    match format {
        NotationFormat::ChordPro => CHORDPRO,
        NotationFormat::OnSong => ONSONG,
        NotationFormat::SongbookPro => SONGBOOK_PRO,
        NotationFormat::Nashville => NASHVILLE,
        NotationFormat::GuitarTabs => GUITAR_TABS,
        NotationFormat::PlanningCenter => PLANNING_CENTER,
    }
}

fn score(format: NotationFormat, features: &Features) -> (f64, Vec<String>) {
    let table = indicators(format);
    let total: u32 = table.iter().map(|(_, weight, _)| weight).sum();
    let mut matched = 0;
    let mut names = Vec::new();
    for (name, weight, test) in table {
        if test(features) {
            matched += weight;
            names.push(name.to_string());
        }
    }
    (matched as f64 / total as f64, names)
}

/// Best-guess source format of `text`. Never fails; a document with no
/// indicators at all comes back as ChordPro with confidence 0.
pub fn detect_format(text: &str) -> FormatDetectionResult {
    let features = Features::scan(text);
    let mut best = FormatDetectionResult {
        format: NotationFormat::ALL[0],
        confidence: -1.0,
        indicators: Vec::new(),
    };

    for format in NotationFormat::ALL {
        let (confidence, indicators) = score(format, &features);
        log::debug!("detect_format: {} scored {:.2}", format, confidence);
        if confidence > best.confidence {
            best = FormatDetectionResult { format, confidence, indicators };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chordpro() {
        let result = detect_format("{title: Amazing Grace}\n{start_of_verse}\n[C]Amazing [F]grace\n{end_of_verse}\n");
        assert_eq!(result.format, NotationFormat::ChordPro);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.indicators, vec!["directive", "environment", "inline_chord"]);
    }

    #[test]
    fn test_onsong() {
        let result = detect_format("Amazing Grace\n\nVerse 1:\n[C]Amazing [F]grace\n*Softly\n");
        assert_eq!(result.format, NotationFormat::OnSong);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_songbook_pro() {
        let result = detect_format("[Verse 1]\nC       F\nAmazing grace\n(Softly)\n");
        assert_eq!(result.format, NotationFormat::SongbookPro);
    }

    #[test]
    fn test_nashville() {
        let result = detect_format("Key: G\n\nVerse:\n1       4\nAmazing grace\n");
        assert_eq!(result.format, NotationFormat::Nashville);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_guitar_tabs() {
        let result = detect_format("Intro:\ne|---0---|\nB|---1---|\n\nVerse:\nC       G\nAmazing grace\n");
        assert_eq!(result.format, NotationFormat::GuitarTabs);
    }

    #[test]
    fn test_planning_center() {
        let result = detect_format("VERSE 1\n[C]Amazing [F]grace\n<b>Repeat</b>\n");
        assert_eq!(result.format, NotationFormat::PlanningCenter);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_plain_text_falls_back_to_first_format() {
        let result = detect_format("just some words\nand more words\n");
        assert_eq!(result.format, NotationFormat::ChordPro);
        assert_eq!(result.confidence, 0.0);
        assert!(result.indicators.is_empty());
    }
}

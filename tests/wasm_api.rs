//! WASM API smoke tests
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use chordsheet_wasm::api::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn field(value: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(name)).unwrap()
}

#[wasm_bindgen_test]
fn test_detect_format() {
    let result = detect_format("{title: Song}\n{soc}\n[C]Hi\n{eoc}\n").unwrap();
    assert_eq!(field(&result, "format").as_string().as_deref(), Some("chordpro"));
}

#[wasm_bindgen_test]
fn test_convert_chordsheet() {
    let result = convert_chordsheet(
        "{title: Amazing Grace}\n[C]Amazing [F]grace",
        Some("chordpro".into()),
        "onsong",
        None,
        Some("D".into()),
    )
    .unwrap();
    assert_eq!(field(&result, "success").as_bool(), Some(true));
    let output = field(&result, "output").as_string().unwrap();
    assert!(output.contains("[D]Amazing [G]grace"));
}

#[wasm_bindgen_test]
fn test_parse_then_render() {
    let parsed = parse_chordsheet("[Verse 1]\nC       F\nAmazing grace\n", "songbook_pro").unwrap();
    let rendered = render_chordsheet(field(&parsed, "sheet"), "chordpro").unwrap();
    let text = field(&rendered, "text").as_string().unwrap();
    assert!(text.contains("[C]Amazing [F]grace"));
}

#[wasm_bindgen_test]
fn test_transpose_chord() {
    assert_eq!(transpose_chord("F/C", 7, Some("C".into())).unwrap(), "C/G");
    assert!(transpose_chord("Q", 1, None).is_err());
}

#[wasm_bindgen_test]
fn test_key_distance_and_formats() {
    assert_eq!(key_distance("C", "F#").unwrap(), 6);
    let formats = list_formats().unwrap();
    assert_eq!(js_sys::Array::from(&formats).length(), 6);
}

// Round-trip and grammar checks for the color text codec
use color_snap::color::{decode, decode_with_format, encode, ColorFormat, ColorValue};
use proptest::prelude::*;

/// One 8-bit quantization step, plus float slack
const RGB_TOLERANCE: f64 = 0.5 / 255.0 + 1e-9;
/// Integer degree / percent quantization propagated back into RGB
const HUE_SPACE_TOLERANCE: f64 = 0.02;

fn assert_close(original: &ColorValue, decoded: &ColorValue, tolerance: f64) {
    for (a, b) in [
        (original.red(), decoded.red()),
        (original.green(), decoded.green()),
        (original.blue(), decoded.blue()),
    ] {
        assert!(
            (a - b).abs() <= tolerance,
            "component drifted: {} vs {} (tolerance {})",
            a,
            b,
            tolerance
        );
    }
}

fn unit() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(1.0), 0.0..=1.0_f64]
}

proptest! {
    #[test]
    fn hex_and_rgb_roundtrip_within_one_step(r in unit(), g in unit(), b in unit(), a in unit()) {
        let original = ColorValue::new(r, g, b, a).unwrap();
        for format in [ColorFormat::Hex, ColorFormat::Rgb] {
            let text = encode(&original, format);
            let decoded = decode(&text).unwrap();
            assert_close(&original, &decoded, RGB_TOLERANCE);
            prop_assert_eq!(decoded.alpha(), 1.0);
        }
    }

    #[test]
    fn hsl_and_hsb_roundtrip_within_quantization(r in unit(), g in unit(), b in unit()) {
        let original = ColorValue::opaque(r, g, b).unwrap();
        for format in [ColorFormat::Hsl, ColorFormat::Hsb] {
            let text = encode(&original, format);
            let decoded = decode(&text).unwrap();
            assert_close(&original, &decoded, HUE_SPACE_TOLERANCE);
        }
    }

    #[test]
    fn eight_bit_colors_survive_hex_exactly(r: u8, g: u8, b: u8) {
        let original = ColorValue::from_rgb8(r, g, b);
        let text = encode(&original, ColorFormat::Hex);
        prop_assert_eq!(decode(&text), Some(original));
        prop_assert_eq!(encode(&original, ColorFormat::Hex), text);
    }

    #[test]
    fn encoded_hue_stays_below_full_turn(r in unit(), g in unit(), b in unit()) {
        let color = ColorValue::opaque(r, g, b).unwrap();
        for format in [ColorFormat::Hsl, ColorFormat::Hsb] {
            let text = encode(&color, format);
            let hue: u16 = text[4..].split(',').next().unwrap().trim().parse().unwrap();
            prop_assert!(hue < 360, "{}", text);
        }
    }

    #[test]
    fn decode_never_panics(text in ".{0,40}") {
        let _ = decode(&text);
    }
}

#[test]
fn reference_hex_value() {
    let color = decode("#1A2B3C").unwrap();
    assert_eq!(color.red(), 26.0 / 255.0);
    assert_eq!(color.green(), 43.0 / 255.0);
    assert_eq!(color.blue(), 60.0 / 255.0);
    assert_eq!(color.alpha(), 1.0);
    assert_eq!(encode(&color, ColorFormat::Hex), "#1A2B3C");
}

#[test]
fn rgb_range_is_enforced() {
    assert!(decode("rgb(255, 0, 128)").is_some());
    assert!(decode("rgb(256, 0, 0)").is_none());
}

#[test]
fn hsl_reference_values() {
    let gray = decode("hsl(0, 0%, 50%)").unwrap();
    assert_eq!((gray.red(), gray.green(), gray.blue()), (0.5, 0.5, 0.5));

    let green = decode("hsl(120, 100%, 50%)").unwrap();
    assert!(green.red().abs() < 1e-12);
    assert!((green.green() - 1.0).abs() < 1e-12);
    assert!(green.blue().abs() < 1e-12);
}

#[test]
fn each_grammar_is_recognised_in_priority_order() {
    let samples = [
        ("#0A0B0C", true),
        ("rgb(10, 11, 12)", true),
        ("hsl(10, 11%, 12%)", true),
        ("hsb(10, 11%, 12%)", true),
        ("hsv(10, 11%, 12%)", false),
        ("#0A0B0", false),
    ];
    for (text, expected) in samples {
        assert_eq!(decode(text).is_some(), expected, "{}", text);
    }
}

#[test]
fn detected_format_matches_input_grammar() {
    let samples = [
        ("#0A0B0C", ColorFormat::Hex),
        (" RGB(10, 11, 12) ", ColorFormat::Rgb),
        ("hsl(10, 11%, 12%)", ColorFormat::Hsl),
        ("hsb(10, 11%, 12%)", ColorFormat::Hsb),
    ];
    for (text, expected) in samples {
        let (value, detected) = decode_with_format(text).expect(text);
        assert_eq!(detected, expected, "{}", text);
        assert_eq!(decode(text), Some(value));
    }
    assert_eq!(decode_with_format("rgb(256, 0, 0)"), None);
}

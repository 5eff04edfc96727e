use super::*;
use serde_json::json;

#[test]
fn glow_constant_matches_hex() {
    assert_eq!(Color::from_hex("#00FF41").unwrap(), Color::GLOW);
    assert_eq!(Color::from_hex("00ff41").unwrap(), Color::GLOW);
    assert_eq!(Color::GLOW.to_rgba8(), [0x00, 0xFF, 0x41, 0xFF]);
    assert_eq!(Color::GLOW.to_hex(), "#00FF41");
}

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 1.0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
}

#[test]
fn parses_rgba_object_and_array() {
    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 1.0));

    let c: Color = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 0.9));

    assert!(serde_json::from_value::<Color>(json!([0.1, 0.2])).is_err());
}

#[test]
fn rejects_malformed_hex() {
    assert!(Color::from_hex("#12345").is_err());
    assert!(Color::from_hex("#GGHHII").is_err());
    assert!(Color::from_hex("#ééé").is_err());
}

#[test]
fn serializes_as_hex_string() {
    let v = serde_json::to_value(Color::GLOW.with_alpha(0.5)).unwrap();
    assert_eq!(v, json!("#00FF4180"));
}

#[test]
fn premul_scales_by_alpha() {
    let p = Color::GLOW.with_alpha(0.5).to_rgba8_premul();
    assert_eq!(p.a, 128);
    assert_eq!(p.g, 128);
    assert_eq!(p.r, 0);
}

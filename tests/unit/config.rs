use super::*;

#[test]
fn defaults_match_reference_constants() {
    let cfg = GlowConfig::default();
    assert_eq!(cfg.color.to_hex(), "#00FF41");
    assert_eq!(cfg.background.to_hex(), "#000000");
    assert_eq!(cfg.spawn_probability, 0.1);
    assert_eq!(cfg.trace.speed, 0.8);
    assert_eq!(cfg.trace.kill_ms, 10_000.0);
    assert_eq!(cfg.trace.fade_ms, 2_000.0);
    assert_eq!(cfg.trace.trail_capacity, 80);
    assert_eq!(cfg.trace.turn_probability, 0.03);
    assert_eq!(cfg.trace.flicker_full_probability, 0.9);
    assert_eq!(cfg.trace.flicker_dim, 0.3);
    assert_eq!(cfg.chips.size, 50.0);
    assert_eq!(cfg.chips.glow_blur, 12.0);
    assert_eq!(cfg.chips.labels[0], "ZYRO_v2k26");
    assert_eq!(cfg.chips.labels[3], "CORE_LOGIC");
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_other_defaults() {
    let cfg = GlowConfig::from_json_str(
        r##"{ "color": "#FF00FF", "trace": { "turn_probability": 0.0 } }"##,
    )
    .unwrap();
    assert_eq!(cfg.color.to_hex(), "#FF00FF");
    assert_eq!(cfg.trace.turn_probability, 0.0);
    assert_eq!(cfg.trace.speed, 0.8);
    assert_eq!(cfg.chips, ChipConfig::default());
}

#[test]
fn unknown_fields_are_rejected() {
    let err = GlowConfig::from_json_str(r#"{ "speed": 2.0 }"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = GlowConfig::from_json_str(r#"{ "spawn_probability": 1.5 }"#).unwrap_err();
    assert!(err.to_string().contains("spawn_probability"));

    let err = GlowConfig::from_json_str(r#"{ "trace": { "fade_ms": 20000 } }"#).unwrap_err();
    assert!(err.to_string().contains("fade_ms"));

    let err = GlowConfig::from_json_str(r#"{ "trace": { "trail_capacity": 0 } }"#).unwrap_err();
    assert!(err.to_string().contains("trail_capacity"));
}

#[test]
fn oversized_trail_capacity_is_rejected() {
    let err = GlowConfig::from_json_str(r#"{ "trace": { "trail_capacity": 1000000000000 } }"#)
        .unwrap_err();
    assert!(err.to_string().contains("trail_capacity"));

    let mut cfg = GlowConfig::default();
    cfg.trace.trail_capacity = usize::MAX;
    assert!(cfg.validate().is_err());
    cfg.trace.trail_capacity = MAX_TRAIL_CAPACITY;
    cfg.validate().unwrap();
}

#[test]
fn config_roundtrips_through_json() {
    let cfg = GlowConfig::default();
    let s = serde_json::to_string(&cfg).unwrap();
    assert_eq!(GlowConfig::from_json_str(&s).unwrap(), cfg);
}

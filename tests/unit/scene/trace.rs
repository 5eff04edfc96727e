use std::f64::consts::{FRAC_PI_2, PI};

use super::*;
use crate::foundation::core::Canvas;
use crate::foundation::rng::{ScriptedRandom, StdRandom};
use crate::render::recording::{RecordingSurface, SurfaceCall};

fn no_turns() -> TraceConfig {
    TraceConfig {
        turn_probability: 0.0,
        ..TraceConfig::default()
    }
}

#[test]
fn new_trace_starts_with_anchor_only() {
    let anchor = Point::new(85.0, 125.0);
    for heading in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
        let t = TraceEntity::new(anchor, heading, 0.0, 80);
        assert_eq!(t.trail().to_vec(), vec![anchor]);
        assert_eq!(t.position(), anchor);
        assert_eq!(t.heading(), heading);
        assert_eq!(t.opacity(), 1.0);
        assert_eq!(t.flicker(), 1.0);
        assert!(!t.is_expired());
    }
}

#[test]
fn heading_zero_moves_exactly_along_x() {
    let params = TraceConfig::default();
    let mut rng = ScriptedRandom::constant(0.99);
    let mut t = TraceEntity::new(Point::new(10.0, 20.0), 0.0, 0.0, params.trail_capacity);

    assert_eq!(t.update(16.0, &params, &mut rng), TraceStatus::Alive);
    assert!((t.position().x - 10.8).abs() < 1e-12);
    assert_eq!(t.position().y, 20.0);
    assert_eq!(rng.drawn(), 1);
}

#[test]
fn five_unit_steps_from_hundred() {
    let params = TraceConfig {
        speed: 1.0,
        ..no_turns()
    };
    let mut rng = StdRandom::seeded(3);
    let mut t = TraceEntity::new(Point::new(100.0, 100.0), 0.0, 0.0, params.trail_capacity);
    for i in 1..=5 {
        t.update(f64::from(i) * 16.0, &params, &mut rng);
    }
    assert_eq!(t.position(), Point::new(105.0, 100.0));
    assert_eq!(t.trail().len(), 6);
}

#[test]
fn trail_never_exceeds_capacity() {
    let params = TraceConfig::default();
    let mut rng = StdRandom::seeded(11);
    let mut t = TraceEntity::new(Point::new(0.0, 0.0), 0.0, 0.0, params.trail_capacity);
    for i in 0..500 {
        t.update(f64::from(i), &params, &mut rng);
        assert!(t.trail().len() <= 80);
    }
    assert_eq!(t.trail().len(), 80);
    assert_eq!(t.trail().newest(), Some(t.position()));
}

#[test]
fn reaching_kill_time_is_terminal_and_freezes_state() {
    let params = TraceConfig::default();
    let mut rng = ScriptedRandom::constant(0.5);
    let mut t = TraceEntity::new(Point::new(50.0, 50.0), 0.0, 1_000.0, params.trail_capacity);
    t.update(1_500.0, &params, &mut rng);
    let position = t.position();
    let trail = t.trail().clone();

    assert_eq!(t.update(11_000.0, &params, &mut rng), TraceStatus::Expired);
    assert_eq!(t.opacity(), 0.0);
    assert!(t.is_expired());
    assert_eq!(t.position(), position);
    assert_eq!(t.trail(), &trail);

    let drawn = rng.drawn();
    assert_eq!(t.update(11_016.0, &params, &mut rng), TraceStatus::Expired);
    assert_eq!(t.position(), position);
    assert_eq!(rng.drawn(), drawn);
}

#[test]
fn opacity_ramps_down_monotonically_in_fade_window() {
    let params = TraceConfig::default();
    let mut rng = StdRandom::seeded(5);
    let mut t = TraceEntity::new(Point::new(0.0, 0.0), 0.0, 0.0, params.trail_capacity);

    t.update(8_000.0, &params, &mut rng);
    assert_eq!(t.opacity(), 1.0);
    assert_eq!(t.flicker(), 1.0);

    let mut last = t.opacity();
    let mut now = 8_000.0;
    while now < 10_000.0 {
        now += 16.0;
        t.update(now, &params, &mut rng);
        assert!(t.opacity() <= last);
        assert!((0.0..=1.0).contains(&t.opacity()));
        assert!(t.flicker() == 1.0 || t.flicker() == 0.3);
        last = t.opacity();
    }
    assert!(t.is_expired());
    assert_eq!(t.opacity(), 0.0);
}

#[test]
fn opacity_halfway_through_fade_is_half() {
    let params = no_turns();
    let mut rng = ScriptedRandom::constant(0.0);
    let mut t = TraceEntity::new(Point::new(0.0, 0.0), 0.0, 0.0, params.trail_capacity);
    t.update(9_000.0, &params, &mut rng);
    assert!((t.opacity() - 0.5).abs() < 1e-12);
}

#[test]
fn flicker_is_resampled_only_inside_fade_window() {
    let params = no_turns();
    let mut t = TraceEntity::new(Point::new(0.0, 0.0), 0.0, 0.0, params.trail_capacity);

    let mut dim = ScriptedRandom::constant(0.95);
    t.update(7_000.0, &params, &mut dim);
    assert_eq!(t.flicker(), 1.0);

    t.update(8_500.0, &params, &mut dim);
    assert_eq!(t.flicker(), 0.3);

    let mut bright = ScriptedRandom::constant(0.05);
    t.update(8_600.0, &params, &mut bright);
    assert_eq!(t.flicker(), 1.0);
}

#[test]
fn random_turn_rotates_by_quarter_turn() {
    let params = TraceConfig::default();
    let mut t = TraceEntity::new(Point::new(0.0, 0.0), 0.0, 0.0, params.trail_capacity);

    // turn fires, then picks the positive direction
    let mut rng = ScriptedRandom::new([0.0, 0.2], 0.99);
    t.update(16.0, &params, &mut rng);
    assert_eq!(t.heading(), FRAC_PI_2);
    assert!(t.position().x.abs() < 1e-12);
    assert!((t.position().y - 0.8).abs() < 1e-12);

    // turn fires, then picks the negative direction
    let mut rng = ScriptedRandom::new([0.0, 0.7], 0.99);
    t.update(32.0, &params, &mut rng);
    assert_eq!(t.heading(), 0.0);
}

#[test]
fn draw_emits_trail_then_head_with_combined_alpha() {
    let params = no_turns();
    let mut rng = ScriptedRandom::constant(0.95);
    let mut t = TraceEntity::new(Point::new(10.0, 10.0), 0.0, 0.0, params.trail_capacity);
    t.update(9_000.0, &params, &mut rng);

    let mut surface = RecordingSurface::new(Canvas::new(100, 100));
    let log = surface.log();
    t.draw(&mut surface, Color::GLOW, &params).unwrap();

    let calls = log.snapshot();
    assert_eq!(calls.len(), 2);
    let SurfaceCall::StrokePolyline { points, style } = &calls[0] else {
        panic!("expected polyline, got {:?}", calls[0]);
    };
    assert_eq!(points, &t.trail().to_vec());
    assert!((style.alpha - 0.5 * 0.3).abs() < 1e-12);
    assert_eq!(style.glow_blur, 8.0);
    assert_eq!(style.line_width, 1.5);

    let SurfaceCall::FillRect { rect, .. } = &calls[1] else {
        panic!("expected head rect, got {:?}", calls[1]);
    };
    assert_eq!(rect.width(), 4.0);
    assert_eq!(rect.height(), 4.0);
    assert!((rect.center() - t.position()).hypot() < 1e-9);
}

#[test]
fn expired_trace_draws_nothing() {
    let params = TraceConfig::default();
    let mut rng = ScriptedRandom::constant(0.5);
    let mut t = TraceEntity::new(Point::new(10.0, 10.0), 0.0, 0.0, params.trail_capacity);
    t.update(10_000.0, &params, &mut rng);

    let mut surface = RecordingSurface::new(Canvas::new(100, 100));
    let log = surface.log();
    t.draw(&mut surface, Color::GLOW, &params).unwrap();
    assert!(log.is_empty());
}

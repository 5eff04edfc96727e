use std::f64::consts::PI;

use super::*;
use crate::assets::color::Color;
use crate::foundation::clock::VirtualClock;
use crate::foundation::rng::{ScriptedRandom, StdRandom};
use crate::render::recording::{CallLog, RecordingSurface, SurfaceCall};
use crate::session::headless::HeadlessHost;

const CHIP_CALLS: usize = 44;

type TestLoop = AnimationLoop<RecordingSurface, ScriptedRandom, VirtualClock>;

struct Rig {
    host: HeadlessHost,
    anim: TestLoop,
    log: CallLog,
    clock: VirtualClock,
}

fn mount(config: GlowConfig, rng: ScriptedRandom) -> Rig {
    let viewport = Canvas::new(800, 600);
    let mut host = HeadlessHost::new(viewport);
    let surface = RecordingSurface::new(viewport);
    let log = surface.log();
    let clock = VirtualClock::new();
    let anim = AnimationLoop::mount(
        &mut host,
        Some(surface),
        config,
        rng,
        clock.clone(),
        CancelToken::new(),
    )
    .expect("mounted");
    Rig {
        host,
        anim,
        log,
        clock,
    }
}

fn quiet() -> Rig {
    mount(GlowConfig::default(), ScriptedRandom::constant(0.99))
}

fn always_spawn() -> GlowConfig {
    GlowConfig {
        spawn_probability: 1.0,
        ..GlowConfig::default()
    }
}

fn advance(rig: &mut Rig, ms: f64) -> FrameOutcome {
    rig.clock.advance(ms);
    let handle = rig.host.next_frame().expect("frame scheduled");
    rig.anim.on_frame(&mut rig.host, handle).unwrap()
}

#[test]
fn mount_without_surface_is_silent_none() {
    let mut host = HeadlessHost::new(Canvas::new(800, 600));
    let anim: Option<TestLoop> = AnimationLoop::mount(
        &mut host,
        None,
        GlowConfig::default(),
        ScriptedRandom::constant(0.0),
        VirtualClock::new(),
        CancelToken::new(),
    );
    assert!(anim.is_none());
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.queued_frames(), 0);
}

#[test]
fn mount_with_failing_surface_cleans_up() {
    let mut host = HeadlessHost::new(Canvas::new(800, 600));
    let anim: Option<TestLoop> = AnimationLoop::mount(
        &mut host,
        Some(RecordingSurface::failing(Canvas::new(1, 1))),
        GlowConfig::default(),
        ScriptedRandom::constant(0.99),
        VirtualClock::new(),
        CancelToken::new(),
    );
    assert!(anim.is_none());
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.queued_frames(), 0);
}

#[test]
fn mount_with_cancelled_token_is_none() {
    let mut host = HeadlessHost::new(Canvas::new(800, 600));
    let token = CancelToken::new();
    token.cancel();
    let anim: Option<TestLoop> = AnimationLoop::mount(
        &mut host,
        Some(RecordingSurface::new(Canvas::new(1, 1))),
        GlowConfig::default(),
        ScriptedRandom::constant(0.99),
        VirtualClock::new(),
        token,
    );
    assert!(anim.is_none());
}

#[test]
fn mount_sizes_surface_draws_first_frame_and_schedules() {
    let rig = quiet();
    let calls = rig.log.snapshot();
    assert_eq!(calls[0], SurfaceCall::Resize(Canvas::new(800, 600)));
    assert_eq!(calls[1], SurfaceCall::Clear(Color::BLACK));
    assert_eq!(calls.len(), 2 + CHIP_CALLS);

    assert!(rig.anim.is_mounted());
    assert_eq!(rig.anim.frames_drawn(), 1);
    assert_eq!(rig.host.queued_frames(), 1);
    assert_eq!(rig.host.listener_count(), 1);
    assert!(rig.anim.traces().is_empty());
}

#[test]
fn anchors_follow_viewport() {
    let rig = quiet();
    assert_eq!(
        rig.anim.anchors(),
        [
            Point::new(85.0, 125.0),
            Point::new(715.0, 125.0),
            Point::new(85.0, 475.0),
            Point::new(715.0, 475.0),
        ]
    );
}

#[test]
fn certain_spawn_adds_exactly_one_trace_at_an_anchor() {
    // spawn, anchor index 1, heading index 2, then no turns
    let rig = mount(always_spawn(), ScriptedRandom::new([0.0, 0.3, 0.6], 0.99));
    let traces = rig.anim.traces();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].trail().oldest(), Some(rig.anim.anchors()[1]));
    assert_eq!(traces[0].heading(), PI);
    assert_eq!(traces[0].trail().len(), 2);
}

#[test]
fn certain_spawn_with_real_randomness_lands_on_an_anchor() {
    let viewport = Canvas::new(800, 600);
    let mut host = HeadlessHost::new(viewport);
    let anim = AnimationLoop::mount(
        &mut host,
        Some(RecordingSurface::new(viewport)),
        always_spawn(),
        StdRandom::seeded(42),
        VirtualClock::new(),
        CancelToken::new(),
    )
    .expect("mounted");
    assert_eq!(anim.traces().len(), 1);
    let origin = anim.traces()[0].trail().oldest().expect("non-empty trail");
    assert!(anim.anchors().contains(&origin));
    let quarter_turns = anim.traces()[0].heading() / (PI / 2.0);
    assert!((quarter_turns - quarter_turns.round()).abs() < 1e-9);
}

#[test]
fn frame_clears_then_chips_then_traces() {
    let mut rig = mount(always_spawn(), ScriptedRandom::constant(0.0));
    rig.log.clear();

    assert_eq!(advance(&mut rig, 16.0), FrameOutcome::Drawn);
    let calls = rig.log.snapshot();
    assert_eq!(calls[0], SurfaceCall::Clear(Color::BLACK));
    assert!(matches!(calls[1], SurfaceCall::StrokeRect { .. }));
    assert_eq!(rig.anim.traces().len(), 2);
    // two traces, each a trail polyline and a head marker
    assert_eq!(calls.len(), 1 + CHIP_CALLS + 4);
    assert!(matches!(
        calls[1 + CHIP_CALLS],
        SurfaceCall::StrokePolyline { .. }
    ));
    assert!(matches!(calls.last(), Some(SurfaceCall::FillRect { .. })));
}

#[test]
fn traces_keep_spawn_order() {
    let mut rig = mount(always_spawn(), ScriptedRandom::constant(0.5));
    for _ in 0..5 {
        advance(&mut rig, 16.0);
    }
    let created: Vec<f64> = rig
        .anim
        .traces()
        .iter()
        .map(|t| t.created_at_ms())
        .collect();
    assert_eq!(created, vec![0.0, 16.0, 32.0, 48.0, 64.0, 80.0]);
}

#[test]
fn expired_traces_are_culled_after_their_last_draw() {
    let mut config = GlowConfig {
        spawn_probability: 0.5,
        ..GlowConfig::default()
    };
    config.trace.kill_ms = 100.0;
    config.trace.fade_ms = 50.0;
    let mut rig = mount(config, ScriptedRandom::new([0.0, 0.0, 0.0], 0.99));
    assert_eq!(rig.anim.traces().len(), 1);

    advance(&mut rig, 50.0);
    assert_eq!(rig.anim.traces().len(), 1);

    rig.log.clear();
    advance(&mut rig, 50.0);
    assert!(rig.anim.traces().is_empty());
    assert_eq!(rig.log.len(), 1 + CHIP_CALLS);
}

#[test]
fn stale_handle_is_ignored() {
    let mut rig = quiet();
    let before = rig.log.len();
    let outcome = rig
        .anim
        .on_frame(&mut rig.host, FrameHandle(9_999))
        .unwrap();
    assert_eq!(outcome, FrameOutcome::Stale);
    assert_eq!(rig.log.len(), before);
    assert_eq!(rig.host.queued_frames(), 1);
}

#[test]
fn each_frame_schedules_exactly_one_successor() {
    let mut rig = quiet();
    for _ in 0..3 {
        assert_eq!(advance(&mut rig, 16.0), FrameOutcome::Drawn);
        assert_eq!(rig.host.queued_frames(), 1);
    }
    assert_eq!(rig.host.requested_count(), 4);
    assert_eq!(rig.anim.frames_drawn(), 4);
}

#[test]
fn resize_keeps_traces_and_moves_chips() {
    let mut rig = mount(always_spawn(), ScriptedRandom::constant(0.0));
    let positions: Vec<Point> = rig.anim.traces().iter().map(|t| t.position()).collect();

    rig.anim.on_resize(Canvas::new(1000, 700)).unwrap();
    let after: Vec<Point> = rig.anim.traces().iter().map(|t| t.position()).collect();
    assert_eq!(positions, after);
    assert_eq!(rig.anim.viewport(), Canvas::new(1000, 700));
    assert_eq!(rig.anim.anchors()[3], Point::new(915.0, 575.0));
    assert_eq!(
        rig.log.snapshot().last(),
        Some(&SurfaceCall::Resize(Canvas::new(1000, 700)))
    );
}

#[test]
fn teardown_makes_every_entry_point_inert() {
    let mut rig = mount(always_spawn(), ScriptedRandom::constant(0.0));
    let handle = rig.anim.pending_frame().expect("pending frame");

    let surface = rig.anim.teardown(&mut rig.host);
    assert!(surface.is_some());
    assert!(rig.anim.token().is_cancelled());
    assert_eq!(rig.host.queued_frames(), 0);
    assert_eq!(rig.host.cancelled_count(), 1);
    assert_eq!(rig.host.listener_count(), 0);
    assert!(rig.anim.traces().is_empty());

    let before = rig.log.len();
    assert_eq!(
        rig.anim.on_frame(&mut rig.host, handle).unwrap(),
        FrameOutcome::Inert
    );
    rig.anim.on_resize(Canvas::new(10, 10)).unwrap();
    assert_eq!(rig.log.len(), before);
    assert_eq!(rig.host.queued_frames(), 0);
    assert!(rig.anim.teardown(&mut rig.host).is_none());
}

#[test]
fn external_cancel_stops_the_loop() {
    let mut rig = quiet();
    let handle = rig.host.next_frame().expect("frame scheduled");
    rig.anim.token().clone().cancel();

    let before = rig.log.len();
    assert_eq!(
        rig.anim.on_frame(&mut rig.host, handle).unwrap(),
        FrameOutcome::Inert
    );
    assert_eq!(rig.log.len(), before);
    assert_eq!(rig.host.queued_frames(), 0);
    assert_eq!(rig.anim.pending_frame(), None);
    assert_eq!(rig.host.listener_count(), 1);

    rig.anim.teardown(&mut rig.host);
    assert_eq!(rig.host.listener_count(), 0);
    assert_eq!(rig.host.cancelled_count(), 0);
}

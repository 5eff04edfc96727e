use super::*;

#[test]
fn seeded_streams_are_reproducible() {
    let mut a = StdRandom::seeded(7);
    let mut b = StdRandom::seeded(7);
    for _ in 0..32 {
        let (x, y) = (a.next_unit(), b.next_unit());
        assert_eq!(x.to_bits(), y.to_bits());
        assert!((0.0..1.0).contains(&x));
    }
}

#[test]
fn chance_respects_extremes() {
    let mut r = StdRandom::seeded(1);
    for _ in 0..100 {
        assert!(!r.chance(0.0));
        assert!(r.chance(1.0));
    }
}

#[test]
fn scripted_replays_then_falls_back() {
    let mut r = ScriptedRandom::new([0.25, 0.75], 0.5);
    assert_eq!(r.next_unit(), 0.25);
    assert_eq!(r.next_unit(), 0.75);
    assert_eq!(r.next_unit(), 0.5);
    assert_eq!(r.next_unit(), 0.5);
    assert_eq!(r.drawn(), 4);
}

#[test]
fn pick_index_stays_in_range() {
    let mut r = ScriptedRandom::new([0.0, 0.24, 0.25, 0.999, 1.0], 0.0);
    assert_eq!(r.pick_index(4), 0);
    assert_eq!(r.pick_index(4), 0);
    assert_eq!(r.pick_index(4), 1);
    assert_eq!(r.pick_index(4), 3);
    assert_eq!(r.pick_index(4), 3);
    assert_eq!(r.pick_index(0), 0);
}

use retro_frame::animation::{AnimationParam, AnimationState, Param};
use retro_frame::error::Error;

/// Tick until settled, panicking if `bound` ticks are not enough.
fn settle(p: &mut AnimationParam, bound: u32) -> u32 {
    for n in 0..bound {
        if p.is_settled() {
            return n;
        }
        p.tick();
    }
    assert!(p.is_settled(), "param did not settle within {bound} ticks");
    bound
}

#[test]
fn repeated_ticks_reach_target_exactly() {
    let mut p = AnimationParam::settled_at(0.0);
    p.set_target(1.0, 3).unwrap();
    // Snapping may need one tick beyond the nominal count when the float
    // steps accumulate short, never more.
    settle(&mut p, 4);
    // Exact equality, not approximate: settlement must be detectable.
    assert_eq!(p.current(), 1.0);
}

#[test]
fn settlement_is_idempotent() {
    let mut p = AnimationParam::settled_at(2.0);
    p.set_target(-1.5, 7).unwrap();
    settle(&mut p, 100);
    assert_eq!(p.current(), -1.5);
    let settled = p;
    p.tick();
    assert_eq!(p, settled);
}

#[test]
fn awkward_step_counts_still_settle_exactly() {
    // 1/7 steps accumulate float error; the final snap must cancel it.
    let mut p = AnimationParam::settled_at(0.0);
    p.set_target(1.0, 7).unwrap();
    settle(&mut p, 8);
    assert_eq!(p.current(), 1.0);
}

#[test]
fn steps_below_float_resolution_still_settle() {
    // At this magnitude the per-tick step is smaller than one ulp, so the
    // addition makes no progress; the param must snap instead of animating
    // forever.
    let mut p = AnimationParam::settled_at(1_000_000.0);
    p.set_target(1_000_000.0625, 1_000_000).unwrap();
    settle(&mut p, 10_000);
    assert_eq!(p.current(), 1_000_000.0625);
}

#[test]
fn zero_steps_is_rejected_without_mutation() {
    let mut p = AnimationParam::settled_at(0.25);
    p.set_target(0.75, 4).unwrap();
    let before = p;
    let err = p.set_target(1.0, 0).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(p, before);
}

#[test]
fn state_settles_only_when_every_param_settles() {
    let mut state = AnimationState::default();
    assert!(state.is_settled());
    state.set_target(Param::AngleY, 90.0, 5).unwrap();
    state.set_target(Param::Alpha, 1.0, 10).unwrap();
    assert!(!state.is_settled());
    for _ in 0..6 {
        state.tick();
    }
    // AngleY is done, Alpha still in motion.
    assert!(state.param(Param::AngleY).is_settled());
    assert!(!state.is_settled());
    for _ in 0..6 {
        state.tick();
    }
    assert!(state.is_settled());
    assert_eq!(state.alpha(), 1.0);
}

#[test]
fn snap_to_front_settles_immediately() {
    let mut state = AnimationState::powered_on();
    state.zoom().unwrap();
    state.tick();
    assert!(!state.is_settled());
    state.snap_to_front();
    assert!(state.is_settled());
    assert_eq!(state.alpha(), 1.0);
}

#[test]
fn rotate_returns_to_original_angle() {
    let mut state = AnimationState::default();
    state.rotate().unwrap();
    for _ in 0..62 {
        state.tick();
    }
    assert!(state.is_settled());
    assert_eq!(state.param(Param::AngleY).current(), 0.0);
}

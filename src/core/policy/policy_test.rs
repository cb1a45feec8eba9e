use super::*;

fn ctx(
    phase: TickPhase,
    watch_count: usize,
    app_state: AppState,
) -> PolicyContext {
    PolicyContext {
        phase,
        watch_count,
        app_state,
    }
}

fn object(hash: u64) -> WatchedObject {
    WatchedObject {
        hash,
        name: format!("T{hash}"),
        msg: String::new(),
    }
}

#[test]
fn test_unconditional_always_collects() {
    let policy = UnconditionalPolicy;
    for state in [
        AppState::Foreground,
        AppState::Background,
        AppState::Other,
        AppState::Unknown,
    ] {
        assert_eq!(policy.decide(&ctx(TickPhase::Collect, 0, state)), Decision::Act);
    }
}

#[test]
fn test_unconditional_dumps_only_with_watched_objects() {
    let policy = UnconditionalPolicy;
    assert_eq!(
        policy.decide(&ctx(TickPhase::Dump, 0, AppState::Unknown)),
        Decision::Skip
    );
    assert_eq!(
        policy.decide(&ctx(TickPhase::Dump, 1, AppState::Unknown)),
        Decision::Act
    );
}

#[test]
fn test_retained_count_uses_visible_threshold_in_foreground() {
    let policy = RetainedCountPolicy::new(5, 1);

    assert_eq!(
        policy.decide(&ctx(TickPhase::Collect, 4, AppState::Foreground)),
        Decision::Skip
    );
    assert_eq!(
        policy.decide(&ctx(TickPhase::Collect, 5, AppState::Foreground)),
        Decision::Act
    );
}

#[test]
fn test_retained_count_uses_invisible_threshold_in_background() {
    let policy = RetainedCountPolicy::new(5, 1);

    assert_eq!(
        policy.decide(&ctx(TickPhase::Dump, 0, AppState::Background)),
        Decision::Skip
    );
    assert_eq!(
        policy.decide(&ctx(TickPhase::Dump, 1, AppState::Background)),
        Decision::Act
    );
}

#[test]
fn test_retained_count_other_state_acts_without_threshold() {
    let policy = RetainedCountPolicy::new(100, 100);
    assert_eq!(
        policy.decide(&ctx(TickPhase::Dump, 0, AppState::Other)),
        Decision::Act
    );
}

#[test]
fn test_retained_count_unknown_state_never_acts() {
    let policy = RetainedCountPolicy::new(0, 0);
    for phase in [TickPhase::Collect, TickPhase::Dump] {
        assert_eq!(
            policy.decide(&ctx(phase, 1000, AppState::Unknown)),
            Decision::Skip
        );
    }
}

#[test]
fn test_zero_threshold_acts_on_empty_registry() {
    let policy = RetainedCountPolicy::new(0, 0);
    assert_eq!(
        policy.decide(&ctx(TickPhase::Collect, 0, AppState::Foreground)),
        Decision::Act
    );
}

#[test]
fn test_survivors_intersects_by_hash_in_after_order() {
    let before = vec![object(1), object(2), object(3)];
    let after = vec![object(4), object(3), object(1)];

    let hashes: Vec<u64> = survivors(&before, &after).iter().map(|o| o.hash).collect();
    assert_eq!(hashes, vec![3, 1]);
}

#[test]
fn test_survivors_empty_inputs() {
    assert!(survivors(&[], &[object(1)]).is_empty());
    assert!(survivors(&[object(1)], &[]).is_empty());
}

#[test]
fn test_decision_is_act() {
    assert!(Decision::Act.is_act());
    assert!(!Decision::Skip.is_act());
}

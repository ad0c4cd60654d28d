use std::time::Duration;

use super::PersistScheduler;

fn scheduler() -> PersistScheduler {
    PersistScheduler::new(Duration::from_millis(200))
}

#[test]
fn test_arm_without_dirty_keys_does_nothing() {
    let mut scheduler = scheduler();

    assert!(scheduler.arm().is_none());
    assert!(!scheduler.is_pending());
}

#[test]
fn test_arm_hands_out_window_and_token() {
    let mut scheduler = scheduler();
    scheduler.mark_dirty();

    let armed = scheduler.arm().unwrap();
    assert_eq!(armed.window, Duration::from_millis(200));
    assert!(!armed.token.is_cancelled());
    assert!(scheduler.is_pending());
}

#[test]
fn test_rearm_cancels_previous_timer() {
    let mut scheduler = scheduler();
    scheduler.mark_dirty();

    let first = scheduler.arm().unwrap();
    let second = scheduler.arm().unwrap();

    assert!(first.token.is_cancelled());
    assert!(!second.token.is_cancelled());
    assert!(second.generation > first.generation);

    // Superseded timer must not write
    assert!(!scheduler.settle(first.generation));
    assert!(scheduler.settle(second.generation));
    assert!(!scheduler.is_dirty());
    assert!(!scheduler.is_pending());
}

#[test]
fn test_settle_only_once() {
    let mut scheduler = scheduler();
    scheduler.mark_dirty();
    let armed = scheduler.arm().unwrap();

    assert!(scheduler.settle(armed.generation));
    assert!(!scheduler.settle(armed.generation));
}

#[test]
fn test_cancelled_timer_cannot_settle() {
    let mut scheduler = scheduler();
    scheduler.mark_dirty();
    let armed = scheduler.arm().unwrap();

    scheduler.cancel();

    assert!(armed.token.is_cancelled());
    assert!(!scheduler.settle(armed.generation));
    // still dirty, the next update re-arms
    assert!(scheduler.is_dirty());
    assert!(scheduler.arm().is_some());
}

#[test]
fn test_dirty_flag_keeps_rearming_until_written() {
    let mut scheduler = scheduler();
    scheduler.mark_dirty();
    scheduler.arm().unwrap();

    // An update that touches only non persisted keys still restarts the window
    let rearmed = scheduler.arm().unwrap();
    assert!(scheduler.settle(rearmed.generation));

    // Nothing dirty anymore: further updates do not arm
    assert!(scheduler.arm().is_none());
}

#[test]
fn test_settle_now() {
    let mut scheduler = scheduler();
    assert!(!scheduler.settle_now());

    scheduler.mark_dirty();
    let armed = scheduler.arm().unwrap();

    assert!(scheduler.settle_now());
    assert!(armed.token.is_cancelled());
    assert!(!scheduler.is_pending());
    assert!(!scheduler.settle_now());
}

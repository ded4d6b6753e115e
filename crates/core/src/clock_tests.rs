// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

use super::*;

#[test]
fn fake_clock_starts_at_known_epoch() {
    let clock = FakeClock::new();
    assert_eq!(clock.epoch_secs(), 1_000_000);
}

#[test]
fn fake_clock_advance_moves_both_timelines() {
    let clock = FakeClock::new();
    let before = clock.now();

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.epoch_secs(), 1_000_090);
    assert_eq!(clock.now() - before, Duration::from_secs(90));
}

#[test]
fn fake_clock_set_epoch_secs() {
    let clock = FakeClock::new();
    clock.set_epoch_secs(42);
    assert_eq!(clock.epoch_secs(), 42);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_secs(5));
    assert_eq!(other.epoch_secs(), 1_000_005);
}

#[test]
fn system_clock_epoch_is_plausible() {
    let clock = SystemClock;
    // After 2020, before 2100.
    assert!(clock.epoch_secs() > 1_577_836_800);
    assert!(clock.epoch_secs() < 4_102_444_800);
}

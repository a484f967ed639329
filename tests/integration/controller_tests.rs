//! Integration tests for the AppService → FSM → actuator pipeline.
//!
//! These run on the host (x86_64) and verify the full chain from a
//! humidity sample or countdown expiry down to valve and countdown
//! commands, without any real hardware.

use crate::mock_hw::{CaptureSink, HwCall, LogSink, MockHardware, StalledSink};

use irristation::app::ports::SensorPort;
use irristation::app::service::AppService;
use irristation::config::SystemConfig;
use irristation::fsm::StateId;

fn make_app() -> (AppService, MockHardware, LogSink, CaptureSink) {
    let config = SystemConfig::default();
    let mut app = AppService::new(config);
    let hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut sink);
    (app, hw, sink, CaptureSink::new())
}

/// Feed one sample at the given humidity through the full pipeline.
fn sample(
    app: &mut AppService,
    hw: &mut MockHardware,
    sink: &mut LogSink,
    status: &mut CaptureSink,
    percent: u8,
) {
    hw.set_humidity(percent);
    let reading = hw.read_moisture();
    app.on_sample(reading, hw, sink, status);
}

// ── Boot state ────────────────────────────────────────────────

#[test]
fn starts_idle_with_valve_closed_and_nothing_armed() {
    let (app, hw, _sink, _status) = make_app();
    assert_eq!(app.state(), StateId::Idle);
    assert!(!hw.valve_open());
    assert!(hw.arm_calls().is_empty());
}

// ── Scenario: dry soil triggers a full cycle ──────────────────

#[test]
fn dry_sample_opens_valve_and_arms_both_stages() {
    let (mut app, mut hw, mut sink, mut status) = make_app();

    sample(&mut app, &mut hw, &mut sink, &mut status, 35);

    assert_eq!(app.state(), StateId::Watering);
    assert!(hw.valve_open());

    // One arming, both match points in the same call, durations straight
    // from config — the cooldown is an absolute offset from activation.
    let config = app.current_config();
    assert_eq!(
        hw.arm_calls(),
        vec![(
            u32::from(config.watering_duration_secs),
            config.cooldown_duration_secs
        )]
    );

    // The arm must precede the valve-open command so an open valve is
    // always guarded by a live countdown.
    let arm_idx = hw
        .calls
        .iter()
        .position(|c| matches!(c, HwCall::ArmCountdown { .. }))
        .unwrap();
    let open_idx = hw
        .calls
        .iter()
        .position(|c| matches!(c, HwCall::OpenValve))
        .unwrap();
    assert!(arm_idx < open_idx);
}

#[test]
fn wet_sample_is_reported_but_does_nothing() {
    let (mut app, mut hw, mut sink, mut status) = make_app();

    sample(&mut app, &mut hw, &mut sink, &mut status, 55);

    assert_eq!(app.state(), StateId::Idle);
    assert!(!hw.valve_open());
    assert!(hw.arm_calls().is_empty());
    assert_eq!(app.last_humidity(), 55);
    assert!(sink.contains("Reading"), "reading event still emitted");
    assert!(!status.bytes.is_empty(), "status line still transmitted");
}

#[test]
fn full_cycle_waters_cools_down_and_becomes_eligible_again() {
    let (mut app, mut hw, mut sink, mut status) = make_app();

    // t=0: dry → valve opens.
    sample(&mut app, &mut hw, &mut sink, &mut status, 35);
    assert_eq!(app.state(), StateId::Watering);

    // t=+20s: stage one → valve closes, cooldown begins.
    app.on_stage_one_expired(&mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Cooldown);
    assert!(!hw.valve_open());

    // Still dry during cooldown — no action.
    for _ in 0..5 {
        sample(&mut app, &mut hw, &mut sink, &mut status, 20);
    }
    assert_eq!(app.state(), StateId::Cooldown);
    assert!(!hw.valve_open());

    // t=+3600s from the original trigger: stage two → Idle.
    app.on_stage_two_expired(&mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.cycles_completed(), 1);

    // Eligible again: the next dry sample starts a second cycle.
    sample(&mut app, &mut hw, &mut sink, &mut status, 35);
    assert_eq!(app.state(), StateId::Watering);
    assert_eq!(hw.arm_calls().len(), 2);
}

// ── Re-trigger suppression ────────────────────────────────────

#[test]
fn dry_samples_while_watering_never_restart_the_cycle() {
    let (mut app, mut hw, mut sink, mut status) = make_app();

    sample(&mut app, &mut hw, &mut sink, &mut status, 10);
    assert_eq!(app.state(), StateId::Watering);

    // Very dry soil sampled every period while the valve is open.
    for _ in 0..30 {
        sample(&mut app, &mut hw, &mut sink, &mut status, 10);
    }

    assert_eq!(app.state(), StateId::Watering);
    assert!(hw.valve_open());
    assert_eq!(hw.arm_calls().len(), 1, "the countdown is never re-armed");
    let opens = hw
        .calls
        .iter()
        .filter(|c| matches!(c, HwCall::OpenValve))
        .count();
    assert_eq!(opens, 1, "the valve position changed exactly once");
}

#[test]
fn stage_two_before_stage_one_is_ignored_while_watering() {
    let (mut app, mut hw, mut sink, mut status) = make_app();
    sample(&mut app, &mut hw, &mut sink, &mut status, 10);

    // FIFO ordering makes this unreachable in production; the machine
    // still refuses to jump states on it.
    app.on_stage_two_expired(&mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Watering);
    assert!(hw.valve_open());
}

#[test]
fn stale_expiries_in_idle_are_no_ops() {
    let (mut app, mut hw, mut sink, _status) = make_app();

    app.on_stage_one_expired(&mut hw, &mut sink);
    app.on_stage_two_expired(&mut hw, &mut sink);

    assert_eq!(app.state(), StateId::Idle);
    assert!(!hw.valve_open());
    assert!(hw.arm_calls().is_empty());
}

// ── Reporting path ────────────────────────────────────────────

#[test]
fn every_sample_emits_one_status_token() {
    let (mut app, mut hw, mut sink, mut status) = make_app();

    sample(&mut app, &mut hw, &mut sink, &mut status, 35);
    let frame: Vec<u8> = b"Moisture: 30%"
        .iter()
        .copied()
        .chain(std::iter::repeat(0x08).take(13))
        .collect();
    assert_eq!(status.bytes, frame);

    status.bytes.clear();
    sample(&mut app, &mut hw, &mut sink, &mut status, 55);
    assert_eq!(&status.bytes[..13], b"Moisture: 50%");
}

#[test]
fn stalled_status_line_never_blocks_the_cycle() {
    let config = SystemConfig::default();
    let mut app = AppService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut stalled = StalledSink;
    app.start(&mut sink);

    hw.set_humidity(35);
    let reading = hw.read_moisture();
    app.on_sample(reading, &mut hw, &mut sink, &mut stalled);

    // Every byte was dropped, the watering cycle still ran.
    assert_eq!(app.state(), StateId::Watering);
    assert!(hw.valve_open());

    app.on_stage_one_expired(&mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Cooldown);
    assert!(!hw.valve_open());
}

// ── Event stream ──────────────────────────────────────────────

#[test]
fn cycle_emits_structured_events_in_order() {
    let (mut app, mut hw, mut sink, mut status) = make_app();

    sample(&mut app, &mut hw, &mut sink, &mut status, 35);
    app.on_stage_one_expired(&mut hw, &mut sink);
    app.on_stage_two_expired(&mut hw, &mut sink);

    let ordered = ["Started", "Reading", "ValveOpened", "ValveClosed", "CycleComplete"];
    let mut last = 0;
    for needle in ordered {
        let pos = sink
            .events
            .iter()
            .position(|e| e.contains(needle))
            .unwrap_or_else(|| panic!("missing event {needle}"));
        assert!(pos >= last, "{needle} out of order");
        last = pos;
    }
}

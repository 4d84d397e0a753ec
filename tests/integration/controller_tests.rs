//! Integration tests for the sweep controller: sampler → idle timer →
//! sweeper over a mock host with a manual clock.

use crate::mock_hw::{MockHost, RecordingSink};

use stairsweep::app::events::{SensorChannel, StairEvent};
use stairsweep::pins::PinAssignment;
use stairsweep::staircase::{Direction, StaircaseController, SweepSettings};

const TOP: u8 = 12;
const BOTTOM: u8 = 13;
const SWITCH: u8 = 14;

/// Host loop period used by these tests.
const TICK_MS: u32 = 50;

fn settings() -> SweepSettings {
    SweepSettings {
        segment_delay_ms: 100,
        on_time_ms: 10_000,
        pins: PinAssignment::new(Some(TOP), Some(BOTTOM), Some(SWITCH)),
        toggle_power: false,
    }
}

fn enabled(settings: SweepSettings) -> (StaircaseController, MockHost, RecordingSink) {
    let mut ctl = StaircaseController::new(settings);
    let mut hw = MockHost::new(4);
    let mut sink = RecordingSink::new();
    ctl.enable(true, &mut hw, &mut sink);
    (ctl, hw, sink)
}

fn run(ctl: &mut StaircaseController, hw: &mut MockHost, sink: &mut RecordingSink, ms: u32) {
    for _ in 0..ms / TICK_MS {
        hw.advance(TICK_MS);
        ctl.tick(hw, sink);
    }
}

/// Tick until `done` holds; returns the host time at that point.
fn run_until(
    ctl: &mut StaircaseController,
    hw: &mut MockHost,
    sink: &mut RecordingSink,
    limit_ms: u32,
    done: impl Fn(&StaircaseController, &MockHost) -> bool,
) -> Option<u32> {
    for _ in 0..limit_ms / TICK_MS {
        hw.advance(TICK_MS);
        ctl.tick(hw, sink);
        if done(ctl, hw) {
            return Some(hw.now);
        }
    }
    None
}

// ── Enable / disable ──────────────────────────────────────────

#[test]
fn enable_parks_frontiers_and_syncs_transition() {
    let (ctl, hw, sink) = enabled(settings());
    let ctx = ctl.context();

    assert!(ctl.is_enabled());
    assert!(ctl.lights_on());
    assert_eq!((ctx.range.min, ctx.range.max), (0, 4));
    assert_eq!(ctx.top_index, 4);
    assert_eq!(ctx.bottom_index, -1);
    assert_eq!(ctx.disable_index, -1);
    assert!(ctx.frontiers_closed());
    assert_eq!(hw.transition_ms, 100);
    assert_eq!(hw.triggers, 1);
    assert_eq!(hw.configured, vec![TOP, BOTTOM, SWITCH]);
    assert_eq!(sink.events, vec![StairEvent::Enabled]);
}

#[test]
fn disable_restores_every_active_segment() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.switch_all_off();
    hw.segments[2].active = false;

    ctl.enable(false, &mut hw, &mut sink);

    assert!(!ctl.is_enabled());
    assert_eq!(hw.lit(), vec![0, 1, 3]);
    assert!(hw.notifies >= 1);
    assert!(sink.contains(&StairEvent::Disabled));
}

#[test]
fn disable_powers_output_back_on_when_following_power() {
    let (mut ctl, mut hw, mut sink) = enabled(SweepSettings {
        toggle_power: true,
        ..settings()
    });
    // Switch low forces the lights off on the first tick.
    run(&mut ctl, &mut hw, &mut sink, TICK_MS);
    assert!(!ctl.lights_on());
    hw.output_on = false;

    ctl.enable(false, &mut hw, &mut sink);

    assert!(hw.output_on);
    assert!(sink.contains(&StairEvent::PowerToggled { output_on: true }));
}

#[test]
fn tick_is_a_no_op_while_disabled_or_updating() {
    let mut ctl = StaircaseController::new(settings());
    let mut hw = MockHost::new(4);
    let mut sink = RecordingSink::new();
    hw.advance(500);
    assert!(!ctl.tick(&mut hw, &mut sink));
    assert_eq!(hw.reads, 0);

    ctl.enable(true, &mut hw, &mut sink);
    hw.updating = true;
    hw.set_level(BOTTOM, true);
    hw.advance(500);
    assert!(!ctl.tick(&mut hw, &mut sink));
    assert_eq!(hw.reads, 0);
    assert!(hw.writes.is_empty());
}

// ── Sampler ───────────────────────────────────────────────────

#[test]
fn second_scan_within_scan_delay_is_a_no_op() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    let before = ctl.status();
    let reads = hw.reads;
    hw.set_level(TOP, true);
    hw.advance(40);
    assert!(!ctl.tick(&mut hw, &mut sink));

    assert_eq!(ctl.status(), before);
    assert_eq!(hw.reads, reads);
    assert!(!sink.contains(&StairEvent::SensorChanged {
        channel: SensorChannel::Top,
        active: true,
    }));
}

#[test]
fn bottom_pulse_sweeps_downwards_from_the_last_segment() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    hw.set_level(BOTTOM, true);
    run(&mut ctl, &mut hw, &mut sink, 100);
    assert_eq!(ctl.context().last_direction, Direction::Down);
    assert_eq!(ctl.context().bottom_index, 3);

    hw.set_level(BOTTOM, false);
    run(&mut ctl, &mut hw, &mut sink, 1_000);

    assert_eq!(hw.written(true), vec![3, 2, 1, 0]);
    assert!(hw.written(false).is_empty());
    assert_eq!(ctl.context().bottom_index, -1);
    assert!(ctl.context().frontiers_closed());
    assert!(sink.contains(&StairEvent::SensorChanged {
        channel: SensorChannel::Bottom,
        active: true,
    }));
    assert!(sink.contains(&StairEvent::SensorChanged {
        channel: SensorChannel::Bottom,
        active: false,
    }));
}

#[test]
fn sustained_top_trigger_completes_the_on_sweep() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    hw.set_level(TOP, true);
    run(&mut ctl, &mut hw, &mut sink, 100);
    assert_eq!(ctl.context().top_index, 0);
    assert_eq!(ctl.context().last_direction, Direction::Up);

    // One sweep step every 150 ms at this tick rate; four segments.
    let done = run_until(&mut ctl, &mut hw, &mut sink, 4 * 150 + TICK_MS, |c, _| {
        c.context().top_index == c.context().range.max
    });

    assert!(done.is_some());
    assert_eq!(hw.written(true), vec![0, 1, 2, 3]);
}

#[test]
fn switch_off_records_edges_but_never_lights() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    run(&mut ctl, &mut hw, &mut sink, TICK_MS);
    assert!(!ctl.lights_on());
    sink.clear();

    hw.set_level(BOTTOM, true);
    run(&mut ctl, &mut hw, &mut sink, 300);
    hw.set_level(BOTTOM, false);
    hw.set_level(TOP, true);
    run(&mut ctl, &mut hw, &mut sink, 300);

    assert!(!ctl.lights_on());
    assert!(sink.contains(&StairEvent::SensorChanged {
        channel: SensorChannel::Bottom,
        active: true,
    }));
    assert!(sink.contains(&StairEvent::SensorChanged {
        channel: SensorChannel::Top,
        active: true,
    }));
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, StairEvent::LightsOn { .. }))
    );
    assert!(hw.written(true).is_empty());
}

#[test]
fn override_is_consumed_by_one_scan() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    ctl.post_override(stairsweep::staircase::InputChannel::Top);
    run(&mut ctl, &mut hw, &mut sink, 100);
    assert!(ctl.status().top_sensor);

    run(&mut ctl, &mut hw, &mut sink, 100);
    assert!(!ctl.status().top_sensor);
    assert_eq!(
        sink.count(&StairEvent::SensorChanged {
            channel: SensorChannel::Top,
            active: false,
        }),
        1
    );
}

// ── Idle timer ────────────────────────────────────────────────

#[test]
fn lights_go_off_after_on_time_then_sweep_off_in_direction() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    hw.set_level(BOTTOM, true);
    run(&mut ctl, &mut hw, &mut sink, 100);
    hw.set_level(BOTTOM, false);
    run(&mut ctl, &mut hw, &mut sink, 100);
    let released_at = ctl.context().last_switch_ms;

    let off_at = run_until(&mut ctl, &mut hw, &mut sink, 12_000, |c, _| !c.lights_on());
    let off_at = off_at.expect("lights never went off");
    let elapsed = off_at.wrapping_sub(released_at);
    assert!(elapsed > 10_000, "off too early: {elapsed} ms");
    assert!(elapsed <= 10_100, "off too late: {elapsed} ms");
    assert!(sink.contains(&StairEvent::LightsOff {
        direction: Direction::Down,
    }));

    run(&mut ctl, &mut hw, &mut sink, 1_000);
    assert_eq!(hw.written(false), vec![3, 2, 1, 0]);
    assert!(hw.lit().is_empty());
}

#[test]
fn active_sensor_holds_lights_past_on_time() {
    let (mut ctl, mut hw, mut sink) = enabled(SweepSettings {
        on_time_ms: 1_000,
        ..settings()
    });
    hw.set_level(SWITCH, true);
    hw.set_level(TOP, true);
    run(&mut ctl, &mut hw, &mut sink, 5_000);

    assert!(ctl.lights_on());

    hw.set_level(TOP, false);
    let off = run_until(&mut ctl, &mut hw, &mut sink, 2_000, |c, _| !c.lights_on());
    assert!(off.is_some());
    assert!(sink.contains(&StairEvent::LightsOff {
        direction: Direction::Up,
    }));
}

// ── Power follow ──────────────────────────────────────────────

#[test]
fn output_turns_on_before_the_on_sweep_and_off_after_it() {
    let (mut ctl, mut hw, mut sink) = enabled(SweepSettings {
        on_time_ms: 1_000,
        toggle_power: true,
        ..settings()
    });
    hw.output_on = false;
    hw.set_level(SWITCH, true);

    // Initial on regime times out and sweeps off; output already off.
    run(&mut ctl, &mut hw, &mut sink, 1_500);
    assert!(!ctl.lights_on());
    assert!(!hw.output_on);
    sink.clear();
    hw.writes.clear();

    hw.set_level(TOP, true);
    run(&mut ctl, &mut hw, &mut sink, 100);

    assert!(hw.output_on);
    let power_on = sink
        .position(&StairEvent::PowerToggled { output_on: true })
        .expect("power was not toggled on");
    let lights_on = sink
        .position(&StairEvent::LightsOn {
            direction: Direction::Up,
        })
        .expect("lights did not turn on");
    assert!(power_on < lights_on);
    assert_eq!(hw.toggles, 1);

    run(&mut ctl, &mut hw, &mut sink, 800);
    assert_eq!(hw.written(true), vec![0, 1, 2, 3]);

    hw.set_level(TOP, false);
    run(&mut ctl, &mut hw, &mut sink, 2_000);
    assert!(!ctl.lights_on());
    assert!(!hw.output_on);
    assert!(sink.contains(&StairEvent::PowerToggled { output_on: false }));
}

// ── Host range changes ────────────────────────────────────────

#[test]
fn shrinking_range_keeps_top_trigger_working() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    hw.segments[3].active = false;
    run(&mut ctl, &mut hw, &mut sink, TICK_MS);
    let ctx = ctl.context();
    assert_eq!((ctx.range.min, ctx.range.max), (0, 3));
    assert_eq!(ctx.top_index, 3);
    assert_eq!(ctx.bottom_index, -1);
    assert!(ctx.frontiers_closed());

    hw.writes.clear();
    hw.set_level(TOP, true);
    run(&mut ctl, &mut hw, &mut sink, 1_000);
    assert_eq!(hw.written(true), vec![0, 1, 2]);
    assert_eq!(ctl.context().top_index, 3);
}

#[test]
fn moving_main_segment_reparks_bottom_frontier() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    run(&mut ctl, &mut hw, &mut sink, 200);

    hw.main_segment = 1;
    run(&mut ctl, &mut hw, &mut sink, TICK_MS);
    let ctx = ctl.context();
    assert_eq!((ctx.range.min, ctx.range.max), (1, 4));
    assert_eq!(ctx.bottom_index, 0);
    assert_eq!(ctx.disable_index, 0);
    assert!(ctx.frontiers_closed());

    hw.writes.clear();
    hw.set_level(BOTTOM, true);
    run(&mut ctl, &mut hw, &mut sink, 1_000);
    assert_eq!(hw.written(true), vec![3, 2, 1]);
}

#[test]
fn shrink_during_on_sweep_clamps_and_finishes() {
    let (mut ctl, mut hw, mut sink) = enabled(settings());
    hw.set_level(SWITCH, true);
    hw.set_level(TOP, true);
    run(&mut ctl, &mut hw, &mut sink, 150);
    assert!(ctl.context().top_index < 4);

    hw.segments[3].active = false;
    hw.segments[2].active = false;
    run(&mut ctl, &mut hw, &mut sink, 1_000);
    let ctx = ctl.context();
    assert_eq!(ctx.range.max, 2);
    assert_eq!(ctx.top_index, 2);
    assert!(ctx.frontiers_closed());
    assert_eq!(hw.written(true), vec![0, 1]);
}

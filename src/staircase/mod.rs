//! Staircase sweep controller.
//!
//! One [`StaircaseController`] drives a linear range of LED segments from
//! two motion sensors and a bypass switch.  The host calls [`tick`] from
//! its loop; each tick runs three phases over a shared [`SweepContext`]:
//!
//! ```text
//!  tick ─▶ sampler (every 100 ms) ─▶ idle timer (while on) ─▶ sweeper (every segment_delay_ms)
//!             │                          │                        │
//!        edges, direction,          start off-sweep         move frontiers,
//!        power on, lights on        after on_time_ms        render, power off
//! ```
//!
//! [`tick`]: StaircaseController::tick

pub mod context;
pub mod sampler;

mod idle;
mod sweeper;

use log::info;
use serde::Serialize;

use crate::app::events::StairEvent;
use crate::app::ports::{EventSink, StairHost};

pub use context::{Direction, SegmentRange, SweepContext, SweepSettings};
pub use sampler::{InputChannel, SCAN_DELAY_MS};

/// Snapshot exposed through the host's JSON state API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StairStatus {
    #[serde(rename = "top-sensor")]
    pub top_sensor: bool,
    #[serde(rename = "bottom-sensor")]
    pub bottom_sensor: bool,
    #[serde(rename = "enable-switch")]
    pub enable_switch: bool,
    pub on: bool,
    #[serde(rename = "topIndex")]
    pub top_index: i16,
    #[serde(rename = "bottomIndex")]
    pub bottom_index: i16,
    #[serde(rename = "disableIndex")]
    pub disable_index: i16,
}

/// The sensor-driven segment-sweep state machine.
pub struct StaircaseController {
    ctx: SweepContext,
}

impl StaircaseController {
    pub fn new(settings: SweepSettings) -> Self {
        Self {
            ctx: SweepContext::new(settings),
        }
    }

    /// Swap in new tunables.  Takes effect on the next tick; pins are read
    /// from the new assignment from the next scan on.
    pub fn apply_settings(&mut self, settings: SweepSettings) {
        self.ctx.settings = settings;
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one host loop iteration.
    ///
    /// A no-op while disabled or while the strip is mid-update.  Returns
    /// `true` when a motion sensor changed during this tick.
    pub fn tick(&mut self, hw: &mut impl StairHost, sink: &mut impl EventSink) -> bool {
        if !self.ctx.enabled || hw.is_updating() {
            return false;
        }
        self.ctx.rebase(SegmentRange::from_store(hw));
        let now = hw.now_ms();

        let changed = sampler::sample(&mut self.ctx, hw, sink, now);
        if self.ctx.lights_on {
            idle::check(&mut self.ctx, sink, now);
        }
        sweeper::advance(&mut self.ctx, hw, sink, now);
        changed
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter or leave the enabled state.
    ///
    /// Enabling parks every frontier at the edge of the current range and
    /// syncs the host's transition time to the sweep cadence.  Disabling
    /// restores every active segment to "on" so the strip is left usable.
    pub fn enable(&mut self, on: bool, hw: &mut impl StairHost, sink: &mut impl EventSink) {
        let settings = self.ctx.settings;
        if on {
            for pin in settings.pins.assigned() {
                hw.configure_input(pin);
            }
            self.ctx.range = SegmentRange::from_store(hw);
            self.ctx.park_frontiers();
            hw.set_transition(settings.segment_delay_ms);
            hw.trigger();
            self.ctx.lights_on = true;
            self.ctx.enabled = true;

            info!(
                "staircase enabled: {} ms per step, off after {} s",
                settings.segment_delay_ms,
                settings.on_time_ms / 1000
            );
            sink.emit(&StairEvent::Enabled);
        } else {
            if settings.toggle_power && !self.ctx.lights_on && hw.is_output_off() {
                hw.toggle_output();
                sink.emit(&StairEvent::PowerToggled { output_on: true });
            }
            for id in 0..hw.segment_count() {
                if hw.is_segment_active(id) {
                    hw.set_segment_on(id, true);
                }
            }
            hw.trigger();
            hw.notify_state_changed();
            self.ctx.enabled = false;

            info!("staircase disabled");
            sink.emit(&StairEvent::Disabled);
        }
    }

    /// Queue a simulated activation for the next sensor scan.
    pub fn post_override(&mut self, channel: InputChannel) {
        self.ctx.inbox.post(channel);
    }

    /// Queue an override for `channel` when its debounced state is already
    /// active or `requested` is set, keeping an active input asserted.
    pub fn hold_override(&mut self, channel: InputChannel, requested: bool) {
        let state = match channel {
            InputChannel::Top => self.ctx.top.state,
            InputChannel::Bottom => self.ctx.bottom.state,
            InputChannel::Switch => self.ctx.switch.state,
        };
        if state || requested {
            self.ctx.inbox.post(channel);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.ctx.enabled
    }

    pub fn lights_on(&self) -> bool {
        self.ctx.lights_on
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.ctx.settings
    }

    /// Read-only view of the full state, for diagnostics and tests.
    pub fn context(&self) -> &SweepContext {
        &self.ctx
    }

    pub fn status(&self) -> StairStatus {
        StairStatus {
            top_sensor: self.ctx.top.read,
            bottom_sensor: self.ctx.bottom.read,
            enable_switch: self.ctx.switch.read,
            on: self.ctx.lights_on,
            top_index: self.ctx.top_index,
            bottom_index: self.ctx.bottom_index,
            disable_index: self.ctx.disable_index,
        }
    }
}

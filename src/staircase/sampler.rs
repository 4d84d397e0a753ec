//! Sensor sampler: first tick phase.
//!
//! Every [`SCAN_DELAY_MS`] the two motion sensors and the bypass switch are
//! read, edges are detected against the last debounced state, the direction
//! memory is updated, and the lights may be switched into the "on" regime.
//!
//! Simulated triggers (MQTT `/swipe`, JSON API) never write the sensor
//! state directly.  They are posted to an [`OverrideInbox`] that the next
//! scan drains: the effective value of an input is `override || pin`.

use log::{debug, info};

use crate::app::events::{SensorChannel, StairEvent};
use crate::app::ports::{EventSink, PinPort, StairHost};

use super::context::{Direction, SweepContext};

/// Fixed interval between two sensor scans.
pub const SCAN_DELAY_MS: u32 = 100;

/// The three inputs the sampler reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChannel {
    Top,
    Bottom,
    Switch,
}

impl From<SensorChannel> for InputChannel {
    fn from(channel: SensorChannel) -> Self {
        match channel {
            SensorChannel::Top => Self::Top,
            SensorChannel::Bottom => Self::Bottom,
        }
    }
}

/// Last raw read and last debounced state of one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorInput {
    /// Effective value seen by the most recent scan.
    pub read: bool,
    /// Last confirmed (edge-detected) value.
    pub state: bool,
}

impl SensorInput {
    /// Record a new effective value.  Returns `true` on an edge.
    pub fn sample(&mut self, value: bool) -> bool {
        self.read = value;
        if value == self.state {
            return false;
        }
        self.state = value;
        true
    }
}

/// One-shot overrides drained by exactly one scan.
#[derive(Debug, Default)]
pub struct OverrideInbox {
    pending: heapless::Vec<InputChannel, 3>,
}

/// The overrides a scan consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub top: bool,
    pub bottom: bool,
    pub switch: bool,
}

impl OverrideInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a simulated activation.  Posting the same input twice before
    /// a scan is the same as posting it once.
    pub fn post(&mut self, channel: InputChannel) {
        if !self.pending.contains(&channel) {
            // One slot per channel, never full.
            let _ = self.pending.push(channel);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drain everything posted since the last scan.
    pub fn take(&mut self) -> Overrides {
        let mut out = Overrides::default();
        for channel in &self.pending {
            match channel {
                InputChannel::Top => out.top = true,
                InputChannel::Bottom => out.bottom = true,
                InputChannel::Switch => out.switch = true,
            }
        }
        self.pending.clear();
        out
    }
}

fn read_pin(hw: &mut impl PinPort, pin: Option<u8>) -> bool {
    pin.is_some_and(|p| hw.digital_read(p))
}

/// Run one scan if it is due.  Returns `true` when a motion sensor changed.
pub(super) fn sample(
    ctx: &mut SweepContext,
    hw: &mut impl StairHost,
    sink: &mut impl EventSink,
    now_ms: u32,
) -> bool {
    if now_ms.wrapping_sub(ctx.last_scan_ms) < SCAN_DELAY_MS {
        return false;
    }
    ctx.last_scan_ms = now_ms;

    let overrides = ctx.inbox.take();
    let pins = ctx.settings.pins;
    let bottom = overrides.bottom || read_pin(hw, pins.bottom);
    let top = overrides.top || read_pin(hw, pins.top);
    let switch = overrides.switch || read_pin(hw, pins.switch);

    let mut changed = false;
    if ctx.bottom.sample(bottom) {
        changed = true;
        debug!("bottom sensor -> {}", bottom);
        sink.emit(&StairEvent::SensorChanged {
            channel: SensorChannel::Bottom,
            active: bottom,
        });
    }
    if ctx.top.sample(top) {
        changed = true;
        debug!("top sensor -> {}", top);
        sink.emit(&StairEvent::SensorChanged {
            channel: SensorChannel::Top,
            active: top,
        });
    }
    if ctx.switch.sample(switch) {
        debug!("bypass switch -> {}", switch);
        sink.emit(&StairEvent::SwitchChanged { active: switch });
    }

    if !changed {
        return false;
    }

    ctx.last_switch_ms = now_ms;
    if ctx.top.state || ctx.bottom.state {
        // Both reads were captured above; the top read alone decides.
        ctx.last_direction = Direction::from_top_active(ctx.top.read);
    }

    if !ctx.lights_on && ctx.settings.toggle_power && ctx.frontiers_closed() && hw.is_output_off() {
        hw.toggle_output();
        sink.emit(&StairEvent::PowerToggled { output_on: true });
    }

    if !ctx.switch.state {
        return true;
    }

    if ctx.top.read && ctx.top_index == ctx.range.max {
        ctx.top_index = ctx.range.min;
    }
    if ctx.bottom.read && ctx.bottom_index == ctx.range.before_start() {
        ctx.bottom_index = ctx.range.max - 1;
    }

    if !ctx.lights_on {
        info!("ON -> last sensor {:?}", ctx.last_direction);
        sink.emit(&StairEvent::LightsOn {
            direction: ctx.last_direction,
        });
    }
    ctx.lights_on = true;
    true
}

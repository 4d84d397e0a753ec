//! Idle timer: second tick phase, run only while the lights are on.
//!
//! Starts the off-sweep once the staircase has been quiet for `on_time_ms`,
//! or at once when the bypass switch is off.  With the switch on, a sensor
//! that is still active holds the lights on indefinitely.  A switch that is
//! off skips that hold entirely.

use log::info;

use crate::app::events::StairEvent;
use crate::app::ports::EventSink;

use super::context::{Direction, SweepContext};

pub(super) fn check(ctx: &mut SweepContext, sink: &mut impl EventSink, now_ms: u32) {
    let expired = now_ms.wrapping_sub(ctx.last_switch_ms) > ctx.settings.on_time_ms;
    if !expired && ctx.switch.state {
        return;
    }
    if ctx.switch.state && (ctx.bottom.state || ctx.top.state) {
        return;
    }

    ctx.sweep_direction = ctx.last_direction;
    ctx.disable_index = match ctx.last_direction {
        Direction::Up => ctx.range.min,
        Direction::Down => ctx.range.max - 1,
    };
    ctx.lights_on = false;

    info!("OFF -> last sensor {:?}", ctx.last_direction);
    sink.emit(&StairEvent::LightsOff {
        direction: ctx.sweep_direction,
    });
}

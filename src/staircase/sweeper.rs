//! Segment sweeper: third tick phase.
//!
//! Once per `segment_delay_ms` every frontier advances by one segment:
//!
//! ```text
//!   min-1  min                          max-1  max
//!     │     ├────┬────┬────┬────┬────┬────┤     │
//!  bottom ◀─┤  ◀── bottom_index      top_index ──▶ ├─▶ top
//!  parked   │      disable_index ──▶ (Up)  ◀── (Down)  parked
//! ```
//!
//! `top_index` lights segments walking up to `max`, `bottom_index` lights
//! them walking down to `min - 1`; both may move in the same step.  The
//! off-frontier follows `sweep_direction` and snaps past the range while
//! an on-frontier still occupies the segments ahead of it.

use log::info;

use crate::app::events::StairEvent;
use crate::app::ports::{EventSink, SegmentStore, StairHost};

use super::context::{Direction, SweepContext};

/// Run one sweep step if it is due.
pub(super) fn advance(
    ctx: &mut SweepContext,
    hw: &mut impl StairHost,
    sink: &mut impl EventSink,
    now_ms: u32,
) {
    if now_ms.wrapping_sub(ctx.last_sweep_ms) <= ctx.settings.segment_delay_ms {
        return;
    }
    ctx.last_sweep_ms = now_ms;

    step(ctx, hw);
    hw.trigger();
    hw.notify_state_changed();

    if ctx.settings.toggle_power && ctx.frontiers_closed() && !hw.is_output_off() && !ctx.lights_on {
        info!("staircase idle, switching master output off");
        hw.toggle_output();
        sink.emit(&StairEvent::PowerToggled { output_on: false });
    }
}

/// Move every frontier one segment and apply it to the store.
pub(super) fn step(ctx: &mut SweepContext, store: &mut impl SegmentStore) {
    let range = ctx.range;

    if range.contains(ctx.top_index) {
        store.set_segment_on(ctx.top_index as u8, true);
        ctx.top_index += 1;
    }
    if range.contains(ctx.bottom_index) {
        store.set_segment_on(ctx.bottom_index as u8, true);
        ctx.bottom_index -= 1;
    }

    match ctx.sweep_direction {
        Direction::Up => {
            if ctx.disable_index >= ctx.bottom_index && ctx.bottom_index != range.before_start() {
                ctx.disable_index = range.max;
            }
            if range.contains(ctx.disable_index) {
                store.set_segment_on(ctx.disable_index as u8, false);
                ctx.disable_index += 1;
            }
        }
        Direction::Down => {
            if ctx.disable_index <= ctx.top_index && ctx.top_index != range.max {
                ctx.disable_index = range.before_start();
            }
            if range.contains(ctx.disable_index) {
                store.set_segment_on(ctx.disable_index as u8, false);
                ctx.disable_index -= 1;
            }
        }
    }
}

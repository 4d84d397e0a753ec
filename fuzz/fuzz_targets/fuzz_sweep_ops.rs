//! Fuzz target: `StaircaseController::tick`
//!
//! Each input byte is one host event: a pin level change, an override, a
//! clock jump, or a segment layout change.  After every tick the three
//! frontiers must sit inside the bounds of the host's current range.
//!
//! cargo fuzz run fuzz_sweep_ops

#![no_main]

use libfuzzer_sys::fuzz_target;
use stairsweep::app::events::StairEvent;
use stairsweep::app::ports::{Clock, EventSink, PinPort, PowerPort, SegmentStore};
use stairsweep::pins::PinAssignment;
use stairsweep::staircase::{InputChannel, SegmentRange, StaircaseController, SweepSettings};

struct Host {
    segments: u8,
    /// Bit `i` set when segment `i` is active.
    active: u16,
    main: u8,
    levels: [bool; 3],
    output_on: bool,
    now: u32,
}

impl SegmentStore for Host {
    fn segment_count(&self) -> u8 {
        self.segments
    }
    fn main_segment_id(&self) -> u8 {
        self.main
    }
    fn last_active_segment_id(&self) -> u8 {
        (0..self.segments).rev().find(|&id| self.is_segment_active(id)).unwrap_or(0)
    }
    fn is_segment_active(&self, id: u8) -> bool {
        id < self.segments && self.active & (1 << id) != 0
    }
    fn set_segment_on(&mut self, id: u8, _on: bool) {
        assert!(id < self.segments, "write outside range: {id}");
    }
    fn set_transition(&mut self, _duration_ms: u32) {}
    fn is_updating(&self) -> bool {
        false
    }
    fn trigger(&mut self) {}
    fn notify_state_changed(&mut self) {}
}

impl PowerPort for Host {
    fn is_output_off(&self) -> bool {
        !self.output_on
    }
    fn toggle_output(&mut self) {
        self.output_on = !self.output_on;
    }
}

impl PinPort for Host {
    fn allocate(&mut self, _pins: &[u8]) -> bool {
        true
    }
    fn release(&mut self, _pin: u8) {}
    fn configure_input(&mut self, _pin: u8) {}
    fn digital_read(&mut self, pin: u8) -> bool {
        self.levels.get(usize::from(pin)).copied().unwrap_or(false)
    }
}

impl Clock for Host {
    fn now_ms(&self) -> u32 {
        self.now
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &StairEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&head, ops)) = data.split_first() else {
        return;
    };

    let mut host = Host {
        segments: 1 + head % 16,
        active: u16::MAX,
        main: 0,
        levels: [false; 3],
        output_on: head & 0x80 != 0,
        now: u32::MAX - 5_000,
    };
    let mut ctl = StaircaseController::new(SweepSettings {
        segment_delay_ms: 10 + u32::from(head) * 4,
        on_time_ms: 1_000,
        pins: PinAssignment::new(Some(0), Some(1), Some(2)),
        toggle_power: head & 0x40 != 0,
    });
    ctl.enable(true, &mut host, &mut Discard);

    for &op in ops {
        match op >> 6 {
            0 => host.levels[usize::from(op % 3)] = op & 0x20 != 0,
            1 => ctl.post_override(match op % 3 {
                0 => InputChannel::Top,
                1 => InputChannel::Bottom,
                _ => InputChannel::Switch,
            }),
            2 => host.now = host.now.wrapping_add(u32::from(op & 0x3f) * 50),
            _ if op & 0x20 != 0 => host.main = op % 4,
            _ => host.active ^= 1 << (op % 16),
        }
        ctl.tick(&mut host, &mut Discard);

        let ctx = ctl.context();
        assert_eq!(ctx.range, SegmentRange::from_store(&host));
        let (min, max) = (ctx.range.min, ctx.range.max);
        assert!((min..=max).contains(&ctx.top_index));
        assert!((min - 1..=max - 1).contains(&ctx.bottom_index));
        assert!((min - 1..=max).contains(&ctx.disable_index));
    }
});

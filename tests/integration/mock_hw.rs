//! Mock host for integration tests.
//!
//! Records every segment write, power toggle and pin call so tests can
//! assert on the full history without an LED strip.  Time is manual.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use stairsweep::app::events::StairEvent;
use stairsweep::app::ports::{Clock, EventSink, PinPort, PowerPort, SegmentStore};

// ── Segment table ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub active: bool,
    pub on: bool,
}

// ── MockHost ──────────────────────────────────────────────────

pub struct MockHost {
    pub segments: Vec<Segment>,
    pub main_segment: u8,
    /// Every `set_segment_on` call, in order.
    pub writes: Vec<(u8, bool)>,
    pub output_on: bool,
    pub toggles: u32,
    pub transition_ms: u32,
    pub triggers: u32,
    pub notifies: u32,
    pub updating: bool,

    /// Input levels by GPIO number; unknown pins read low.
    pub levels: HashMap<u8, bool>,
    /// Pins held by another host consumer.
    pub foreign: HashSet<u8>,
    /// Pins currently granted to the staircase.
    pub ours: HashSet<u8>,
    pub released: Vec<u8>,
    pub configured: Vec<u8>,
    pub reads: u32,

    pub now: u32,
}

impl MockHost {
    /// `count` active segments, all on, main segment 0, output on.
    pub fn new(count: u8) -> Self {
        Self {
            segments: vec![
                Segment {
                    active: true,
                    on: true
                };
                usize::from(count)
            ],
            main_segment: 0,
            writes: Vec::new(),
            output_on: true,
            toggles: 0,
            transition_ms: 0,
            triggers: 0,
            notifies: 0,
            updating: false,
            levels: HashMap::new(),
            foreign: HashSet::new(),
            ours: HashSet::new(),
            released: Vec::new(),
            configured: Vec::new(),
            reads: 0,
            now: 1_000,
        }
    }

    pub fn set_level(&mut self, pin: u8, high: bool) {
        self.levels.insert(pin, high);
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }

    /// Segment ids currently on, ascending.
    pub fn lit(&self) -> Vec<u8> {
        (0..self.segments.len() as u8)
            .filter(|&i| self.segments[usize::from(i)].on)
            .collect()
    }

    pub fn switch_all_off(&mut self) {
        for seg in &mut self.segments {
            seg.on = false;
        }
    }

    /// Segment ids written with `on`, in write order.
    pub fn written(&self, on: bool) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(_, v)| *v == on)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl SegmentStore for MockHost {
    fn segment_count(&self) -> u8 {
        self.segments.len() as u8
    }

    fn main_segment_id(&self) -> u8 {
        self.main_segment
    }

    fn last_active_segment_id(&self) -> u8 {
        self.segments
            .iter()
            .rposition(|s| s.active)
            .map_or(0, |i| i as u8)
    }

    fn is_segment_active(&self, id: u8) -> bool {
        self.segments
            .get(usize::from(id))
            .is_some_and(|s| s.active)
    }

    fn set_segment_on(&mut self, id: u8, on: bool) {
        self.writes.push((id, on));
        if let Some(seg) = self.segments.get_mut(usize::from(id)) {
            seg.on = on;
        }
    }

    fn set_transition(&mut self, duration_ms: u32) {
        self.transition_ms = duration_ms;
    }

    fn is_updating(&self) -> bool {
        self.updating
    }

    fn trigger(&mut self) {
        self.triggers += 1;
    }

    fn notify_state_changed(&mut self) {
        self.notifies += 1;
    }
}

impl PowerPort for MockHost {
    fn is_output_off(&self) -> bool {
        !self.output_on
    }

    fn toggle_output(&mut self) {
        self.output_on = !self.output_on;
        self.toggles += 1;
    }
}

impl PinPort for MockHost {
    fn allocate(&mut self, pins: &[u8]) -> bool {
        if pins
            .iter()
            .any(|p| self.foreign.contains(p) || self.ours.contains(p))
        {
            return false;
        }
        self.ours.extend(pins.iter().copied());
        true
    }

    fn release(&mut self, pin: u8) {
        if self.ours.remove(&pin) {
            self.released.push(pin);
        }
    }

    fn configure_input(&mut self, pin: u8) {
        self.configured.push(pin);
    }

    fn digital_read(&mut self, pin: u8) -> bool {
        self.reads += 1;
        self.levels.get(&pin).copied().unwrap_or(false)
    }
}

impl Clock for MockHost {
    fn now_ms(&self) -> u32 {
        self.now
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<StairEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, wanted: &StairEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }

    pub fn contains(&self, wanted: &StairEvent) -> bool {
        self.count(wanted) > 0
    }

    /// Index of the first occurrence of `wanted`.
    pub fn position(&self, wanted: &StairEvent) -> Option<usize> {
        self.events.iter().position(|e| e == wanted)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &StairEvent) {
        self.events.push(*event);
    }
}

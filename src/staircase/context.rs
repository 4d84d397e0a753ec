//! Shared mutable state threaded through the three tick phases.
//!
//! The sampler, idle timer and sweeper all read and write the same
//! [`SweepContext`]: sensor states, the direction memory, and the three
//! frontier indices.  One tick runs all phases back to back, so no phase
//! ever sees another half-done.

use serde::Serialize;

use crate::app::ports::SegmentStore;
use crate::config::StaircaseConfig;
use crate::pins::PinAssignment;

use super::sampler::{OverrideInbox, SensorInput};

/// Direction of travel, remembered from the last triggering sensor.
///
/// `Up` means the top sensor was active when the edge was seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
}

impl Direction {
    /// Direction implied by the top sensor's current effective read.
    pub fn from_top_active(top_active: bool) -> Self {
        if top_active { Self::Up } else { Self::Down }
    }
}

/// Half-open range of segment ids under control, `min..max`.
///
/// Indices are `i16` so the "one before the range" position `min - 1`
/// is representable even when `min` is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentRange {
    pub min: i16,
    pub max: i16,
}

impl SegmentRange {
    /// Build a range, collapsing an inverted one to empty.
    pub fn new(min: i16, max: i16) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Main segment through the last active one.
    pub fn from_store(store: &impl SegmentStore) -> Self {
        let min = i16::from(store.main_segment_id());
        let max = i16::from(store.last_active_segment_id()) + 1;
        Self::new(min, max)
    }

    pub fn contains(&self, index: i16) -> bool {
        index >= self.min && index < self.max
    }

    /// Parking position of the bottom and off frontiers.
    pub fn before_start(&self) -> i16 {
        self.min - 1
    }
}

/// Tunables copied out of [`StaircaseConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    pub segment_delay_ms: u32,
    pub on_time_ms: u32,
    pub pins: PinAssignment,
    pub toggle_power: bool,
}

impl From<&StaircaseConfig> for SweepSettings {
    fn from(config: &StaircaseConfig) -> Self {
        Self {
            segment_delay_ms: config.segment_delay_ms,
            on_time_ms: config.on_time_ms,
            pins: config.pins,
            toggle_power: config.toggle_power,
        }
    }
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self::from(&StaircaseConfig::default())
    }
}

/// The single blackboard every phase works on.
#[derive(Debug)]
pub struct SweepContext {
    pub settings: SweepSettings,

    // -- Lifecycle --
    pub enabled: bool,
    /// Staircase is in the "on" regime.
    pub lights_on: bool,

    // -- Direction memory --
    pub last_direction: Direction,
    /// Direction of the active off-sweep.
    pub sweep_direction: Direction,

    // -- Frontiers --
    pub range: SegmentRange,
    /// On-frontier moving up from the top end; parked at `range.max`.
    pub top_index: i16,
    /// On-frontier moving down from the bottom end; parked at `range.min - 1`.
    pub bottom_index: i16,
    /// Off-frontier, moving in `sweep_direction`.
    pub disable_index: i16,

    // -- Inputs --
    pub top: SensorInput,
    pub bottom: SensorInput,
    pub switch: SensorInput,
    pub inbox: OverrideInbox,

    // -- Cadences (ms, wrapping) --
    pub last_scan_ms: u32,
    pub last_sweep_ms: u32,
    pub last_switch_ms: u32,
}

impl SweepContext {
    pub fn new(settings: SweepSettings) -> Self {
        Self {
            settings,
            enabled: false,
            lights_on: false,
            last_direction: Direction::default(),
            sweep_direction: Direction::default(),
            range: SegmentRange::default(),
            top_index: 0,
            bottom_index: 0,
            disable_index: 0,
            top: SensorInput::default(),
            bottom: SensorInput::default(),
            switch: SensorInput::default(),
            inbox: OverrideInbox::new(),
            last_scan_ms: 0,
            last_sweep_ms: 0,
            last_switch_ms: 0,
        }
    }

    /// Both on-frontiers parked at their terminal position: nothing left
    /// to reveal.
    pub fn frontiers_closed(&self) -> bool {
        self.top_index == self.range.max && self.bottom_index == self.range.before_start()
    }

    /// Park every frontier at its terminal position.
    pub fn park_frontiers(&mut self) {
        self.top_index = self.range.max;
        self.bottom_index = self.range.before_start();
        self.disable_index = self.range.before_start();
    }

    /// Move onto a new segment range, keeping every frontier in its band.
    ///
    /// A frontier parked at the old terminal position is re-parked at the
    /// new one; a frontier mid-sweep is clamped.
    pub fn rebase(&mut self, next: SegmentRange) {
        let prev = self.range;
        if prev == next {
            return;
        }
        self.range = next;

        self.top_index = if self.top_index == prev.max {
            next.max
        } else {
            self.top_index.clamp(next.min, next.max)
        };
        self.bottom_index = if self.bottom_index == prev.before_start() {
            next.before_start()
        } else {
            self.bottom_index.clamp(next.before_start(), next.max - 1)
        };
        self.disable_index = if self.disable_index == prev.before_start() {
            next.before_start()
        } else if self.disable_index == prev.max {
            next.max
        } else {
            self.disable_index.clamp(next.before_start(), next.max)
        };
    }
}

//! Outbound staircase events.
//!
//! The controller emits these through the [`EventSink`](super::ports::EventSink)
//! port.  The log adapter prints them; the MQTT adapter turns sensor edges
//! into `motion/<n>` publications.

use crate::staircase::Direction;

/// Which motion sensor an event or command refers to.
///
/// The discriminant is the MQTT channel number (`<topic>/motion/<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorChannel {
    Top = 0,
    Bottom = 1,
}

impl SensorChannel {
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Structured events emitted by the staircase core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StairEvent {
    /// A motion sensor's debounced state changed.
    SensorChanged { channel: SensorChannel, active: bool },

    /// The bypass switch's debounced state changed.
    SwitchChanged { active: bool },

    /// Lights entered the "on" regime.
    LightsOn { direction: Direction },

    /// The idle timer started an off-sweep.
    LightsOff { direction: Direction },

    /// The host's master output was toggled by us.
    PowerToggled { output_on: bool },

    /// Subsystem enabled (indices re-initialised).
    Enabled,

    /// Subsystem disabled (segments restored).
    Disabled,

    /// Pin allocation failed; the subsystem was disabled.
    PinConflict,
}

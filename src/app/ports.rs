//! Port traits: the boundary between the sweep controller and the host firmware.
//!
//! ```text
//!   Host firmware ──▶ Port trait ──▶ StaircaseService / StaircaseController
//! ```
//!
//! The host owns the LED strip, the master power flag, the pin manager and
//! the clock.  It implements these traits (directly, or through the
//! reference adapters in [`crate::adapters`]) and passes itself into every
//! call, so the core never touches a global.

use crate::config::StaircaseConfig;

use super::events::StairEvent;

// ───────────────────────────────────────────────────────────────
// Segment store (domain ↔ LED strip)
// ───────────────────────────────────────────────────────────────

/// Access to the host's segment table and renderer.
pub trait SegmentStore {
    /// Number of segment slots the host manages.
    fn segment_count(&self) -> u8;

    /// First segment of the staircase (the host's main segment).
    fn main_segment_id(&self) -> u8;

    /// Highest segment id currently in use.
    fn last_active_segment_id(&self) -> u8;

    /// Whether segment `id` is configured and in use.
    fn is_segment_active(&self, id: u8) -> bool;

    /// Set the "on" option of segment `id`.
    fn set_segment_on(&mut self, id: u8, on: bool);

    /// Cross-fade duration used by the renderer.
    fn set_transition(&mut self, duration_ms: u32);

    /// `true` while the strip is pushing a frame out; ticks are skipped.
    fn is_updating(&self) -> bool;

    /// Ask the renderer to redraw on its next frame.
    fn trigger(&mut self);

    /// Propagate "state changed" to UI / sync / colour-update listeners.
    fn notify_state_changed(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Master power
// ───────────────────────────────────────────────────────────────

/// The host's global light output flag.
pub trait PowerPort {
    /// `true` when the whole strip is switched off.
    fn is_output_off(&self) -> bool;

    /// Flip the global output on ↔ off.
    fn toggle_output(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Pin manager
// ───────────────────────────────────────────────────────────────

/// Host pin manager plus raw digital input access.
pub trait PinPort {
    /// Claim every pin in `pins` or none of them.  An empty slice succeeds.
    fn allocate(&mut self, pins: &[u8]) -> bool;

    /// Give `pin` back to the host.  Releasing a pin we don't own is a no-op.
    fn release(&mut self, pin: u8);

    /// Configure `pin` as a plain digital input.
    fn configure_input(&mut self, pin: u8);

    /// Current logic level of `pin` (`true` = high / active).
    fn digital_read(&mut self, pin: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.  Wraps like an Arduino `millis()`;
/// every comparison in the core uses `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Everything the controller needs from the host in one bound.
///
/// Blanket-implemented, so a host struct (or the test mock) just implements
/// the four ports and is passed as `&mut impl StairHost`.
pub trait StairHost: SegmentStore + PowerPort + PinPort + Clock {}

impl<T: SegmentStore + PowerPort + PinPort + Clock> StairHost for T {}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / MQTT)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`StairEvent`]s through this port.
/// Adapters decide where they go (serial log, MQTT motion topics, tests).
pub trait EventSink {
    fn emit(&mut self, event: &StairEvent);
}

/// Fan an event out to two sinks, e.g. `(LogEventSink, MqttMotionSink)`.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &StairEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the staircase configuration as an opaque record.
///
/// Implementations return values as stored; range clamping is the
/// caller's job (see [`StaircaseConfig::normalized`]).
pub trait ConfigPort {
    /// Load configuration.  [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<StaircaseConfig, ConfigError>;

    /// Persist configuration.
    fn save(&self, config: &StaircaseConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration loading, JSON or [`ConfigPort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No `staircase` section / no stored record (first boot).
    NotFound,
    /// Stored record could not be decoded.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from pin ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// At least one requested pin is owned by another consumer.
    Conflict,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Conflict => write!(f, "pin already allocated"),
        }
    }
}

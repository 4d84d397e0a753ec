//! Sensor / switch pin assignments and their ownership lease.
//!
//! Pins arrive from configuration as signed integers where any negative
//! value means "not fitted".  [`PinAssignment`] normalises that into
//! `Option<u8>` once, so the rest of the crate never sees `-1`.
//!
//! [`PinLease`] tracks which of the assigned pins this controller currently
//! holds from the host's pin manager.  Acquisition is all-or-nothing: either
//! every missing pin is granted, or none is.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{PinError, PinPort};

/// Raw value used on the wire for an absent pin.
pub const PIN_ABSENT: i16 = -1;

/// Normalise a raw configured pin number.  Negative or out-of-range values
/// mean "disabled".
pub fn normalize(raw: i64) -> Option<u8> {
    u8::try_from(raw).ok()
}

/// Wire representation of an optional pin.
pub fn to_raw(pin: Option<u8>) -> i16 {
    pin.map_or(PIN_ABSENT, i16::from)
}

/// The three inputs this controller reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinAssignment {
    /// Motion sensor / trigger at the top of the staircase.
    pub top: Option<u8>,
    /// Motion sensor / trigger at the bottom of the staircase.
    pub bottom: Option<u8>,
    /// Hardware bypass switch gating motion triggers.
    pub switch: Option<u8>,
}

impl PinAssignment {
    pub fn new(top: Option<u8>, bottom: Option<u8>, switch: Option<u8>) -> Self {
        Self {
            top,
            bottom,
            switch,
        }
    }

    /// Build from raw configured numbers (negative = absent).
    pub fn from_raw(top: i64, bottom: i64, switch: i64) -> Self {
        Self::new(normalize(top), normalize(bottom), normalize(switch))
    }

    /// Pins in fixed order: top, bottom, switch.
    pub fn as_array(&self) -> [Option<u8>; 3] {
        [self.top, self.bottom, self.switch]
    }

    /// Iterator over the pins that are actually assigned.
    pub fn assigned(&self) -> impl Iterator<Item = u8> {
        self.as_array().into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned().next().is_none()
    }
}

/// Bookkeeping for the pins currently granted by the host pin manager.
#[derive(Debug, Default)]
pub struct PinLease {
    held: PinAssignment,
}

impl PinLease {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins currently held.
    pub fn held(&self) -> PinAssignment {
        self.held
    }

    /// Make the lease match `wanted`.
    ///
    /// Held pins whose role changed are released first; roles already held
    /// with the same pin are kept untouched.  The remaining pins are then
    /// requested in a single all-or-nothing allocation.  On failure the
    /// lease keeps only the untouched roles and the caller decides whether
    /// to drop those too.
    pub fn acquire(&mut self, hw: &mut impl PinPort, wanted: &PinAssignment) -> Result<(), PinError> {
        self.release_changed(hw, wanted);

        let held = self.held.as_array();
        let mut missing: heapless::Vec<u8, 3> = heapless::Vec::new();
        for (have, want) in held.iter().zip(wanted.as_array()) {
            if let (None, Some(pin)) = (have, want) {
                // At most three roles, capacity cannot be exceeded.
                let _ = missing.push(pin);
            }
        }

        if !missing.is_empty() && !hw.allocate(&missing) {
            warn!("pins {:?} already owned elsewhere", missing.as_slice());
            return Err(PinError::Conflict);
        }

        self.held = *wanted;
        debug!("pin lease now {:?}", self.held);
        Ok(())
    }

    /// Release every held pin whose role is assigned differently in `next`.
    pub fn release_changed(&mut self, hw: &mut impl PinPort, next: &PinAssignment) {
        let slots = [
            (&mut self.held.top, next.top),
            (&mut self.held.bottom, next.bottom),
            (&mut self.held.switch, next.switch),
        ];
        for (held, want) in slots {
            if *held != want {
                if let Some(pin) = held.take() {
                    hw.release(pin);
                }
            }
        }
    }

    /// Return every held pin to the host.
    pub fn release_all(&mut self, hw: &mut impl PinPort) {
        for pin in self.held.assigned() {
            hw.release(pin);
        }
        self.held = PinAssignment::default();
    }
}

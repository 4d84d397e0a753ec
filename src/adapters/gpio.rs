//! GPIO pin-manager adapter.
//!
//! [`GpioPinBank`] implements [`PinPort`] over a set of
//! `embedded_hal::digital::InputPin`s, each registered under its GPIO
//! number.  It tracks ownership the way a host pin manager does, so the
//! all-or-nothing allocation rule is enforced even without a host.
//!
//! A read error from the HAL reads as low (inactive).

use embedded_hal::digital::InputPin;
use log::{debug, warn};

use crate::app::ports::PinPort;

/// Who currently owns a registered pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOwner {
    Free,
    Staircase,
    /// Claimed by another host consumer.
    Other,
}

struct Slot<P> {
    gpio: u8,
    pin: P,
    owner: PinOwner,
    input: bool,
}

pub struct GpioPinBank<P: InputPin> {
    slots: Vec<Slot<P>>,
}

impl<P: InputPin> Default for GpioPinBank<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: InputPin> GpioPinBank<P> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register `pin` as GPIO `gpio`, replacing any earlier registration.
    pub fn register(&mut self, gpio: u8, pin: P) {
        self.slots.retain(|s| s.gpio != gpio);
        self.slots.push(Slot {
            gpio,
            pin,
            owner: PinOwner::Free,
            input: false,
        });
    }

    /// Mark `gpio` as held by another consumer.  Returns `false` when the
    /// pin is unknown or not free.
    pub fn reserve(&mut self, gpio: u8) -> bool {
        match self.slot_mut(gpio) {
            Some(slot) if slot.owner == PinOwner::Free => {
                slot.owner = PinOwner::Other;
                true
            }
            _ => false,
        }
    }

    pub fn owner(&self, gpio: u8) -> Option<PinOwner> {
        self.slots.iter().find(|s| s.gpio == gpio).map(|s| s.owner)
    }

    /// Whether `gpio` has been configured as an input since its last allocation.
    pub fn is_input(&self, gpio: u8) -> bool {
        self.slots.iter().any(|s| s.gpio == gpio && s.input)
    }

    fn slot_mut(&mut self, gpio: u8) -> Option<&mut Slot<P>> {
        self.slots.iter_mut().find(|s| s.gpio == gpio)
    }
}

impl<P: InputPin> PinPort for GpioPinBank<P> {
    fn allocate(&mut self, pins: &[u8]) -> bool {
        let all_free = pins
            .iter()
            .all(|&gpio| self.owner(gpio) == Some(PinOwner::Free));
        if !all_free {
            warn!("GPIO: allocation of {:?} refused", pins);
            return false;
        }
        for &gpio in pins {
            if let Some(slot) = self.slot_mut(gpio) {
                slot.owner = PinOwner::Staircase;
            }
        }
        debug!("GPIO: allocated {:?}", pins);
        true
    }

    fn release(&mut self, gpio: u8) {
        if let Some(slot) = self.slot_mut(gpio) {
            if slot.owner == PinOwner::Staircase {
                slot.owner = PinOwner::Free;
                slot.input = false;
                debug!("GPIO: released {}", gpio);
            }
        }
    }

    fn configure_input(&mut self, gpio: u8) {
        // The HAL pin type is already an input; only record the request.
        if let Some(slot) = self.slot_mut(gpio) {
            slot.input = true;
        }
    }

    fn digital_read(&mut self, gpio: u8) -> bool {
        self.slot_mut(gpio)
            .is_some_and(|slot| slot.pin.is_high().unwrap_or(false))
    }
}

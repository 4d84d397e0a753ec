//! Crate-wide error type.
//!
//! A single `Error` enum that the config and pin paths convert into, so a
//! host can handle every staircase failure with one match.  All variants
//! are `Copy`.

use core::fmt;

pub use crate::app::ports::{ConfigError, PinError};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible staircase operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is missing or could not be decoded or stored.
    Config(ConfigError),
    /// A sensor or switch pin is owned by another consumer.
    Pins(PinError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Pins(e) => write!(f, "pins: {e}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PinError> for Error {
    fn from(e: PinError) -> Self {
        Self::Pins(e)
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

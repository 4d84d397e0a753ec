//! Stairsweep: motion-triggered staircase light sweeps.
//!
//! A plugin for an addressable-LED host firmware.  Two motion sensors and a
//! bypass switch drive an "on" or "off" wave across the host's segments in
//! the direction of travel, and the lights time out once the stairs are
//! quiet.  The host implements the [`app::ports`] traits and drives
//! [`app::service::StaircaseService`] from its loop.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod staircase;

pub use app::service::StaircaseService;
pub use error::{Error, Result};

//! Application layer: the plugin surface around the sweep controller.
//!
//! Configuration, pin leasing, MQTT and JSON handling live here; the
//! state machine itself is in [`crate::staircase`].  All interaction with
//! the host happens through the **port traits** in [`ports`].

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;

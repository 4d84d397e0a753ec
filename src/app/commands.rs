//! Inbound commands to the staircase service.
//!
//! These represent actions requested by the outside world (MQTT, JSON API,
//! host settings page) that [`StaircaseService`](super::service::StaircaseService)
//! interprets.

use crate::config::StaircaseConfig;

use super::events::SensorChannel;

/// Control topic, relative to the device topic.
pub const SWIPE_TOPIC: &str = "/swipe";

/// Payloads accepted on the `<deviceTopic>/swipe` MQTT topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeCommand {
    /// Someone is walking up: simulate the bottom sensor.
    Up,
    /// Someone is walking down: simulate the top sensor.
    Down,
    /// Enable the subsystem.
    On,
    /// Disable the subsystem.
    Off,
}

impl TryFrom<&str> for SwipeCommand {
    type Error = ();

    fn try_from(payload: &str) -> Result<Self, Self::Error> {
        match payload {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(()),
        }
    }
}

/// Commands that adapters can send into the service.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// One-shot simulated trigger of a motion sensor.
    Trigger(SensorChannel),

    /// One-shot simulated activation of the bypass switch.
    OverrideSwitch,

    /// Enable or disable the whole subsystem.
    SetEnabled(bool),

    /// Replace the configuration (settings page / provisioning).
    Reconfigure(StaircaseConfig),
}

impl From<SwipeCommand> for AppCommand {
    fn from(cmd: SwipeCommand) -> Self {
        match cmd {
            SwipeCommand::Up => Self::Trigger(SensorChannel::Bottom),
            SwipeCommand::Down => Self::Trigger(SensorChannel::Top),
            SwipeCommand::On => Self::SetEnabled(true),
            SwipeCommand::Off => Self::SetEnabled(false),
        }
    }
}

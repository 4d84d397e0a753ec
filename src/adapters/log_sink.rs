//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured staircase events to the
//! host logger (serial console in production).  Pair it with the MQTT sink
//! as a tuple to get both.

use log::{debug, info, warn};

use crate::app::events::{SensorChannel, StairEvent};
use crate::app::ports::EventSink;

/// Adapter that logs every [`StairEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(active: bool) -> &'static str {
    if active { "on" } else { "off" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &StairEvent) {
        match event {
            StairEvent::SensorChanged { channel, active } => {
                let name = match channel {
                    SensorChannel::Top => "top",
                    SensorChannel::Bottom => "bottom",
                };
                debug!("SENSOR | {} -> {}", name, on_off(*active));
            }
            StairEvent::SwitchChanged { active } => {
                debug!("SENSOR | switch -> {}", on_off(*active));
            }
            StairEvent::LightsOn { direction } => {
                info!("LIGHTS | on, direction={:?}", direction);
            }
            StairEvent::LightsOff { direction } => {
                info!("LIGHTS | off, sweep={:?}", direction);
            }
            StairEvent::PowerToggled { output_on } => {
                info!("POWER | master output {}", on_off(*output_on));
            }
            StairEvent::Enabled => {
                info!("STATE | enabled");
            }
            StairEvent::Disabled => {
                info!("STATE | disabled");
            }
            StairEvent::PinConflict => {
                warn!("STATE | pin conflict, subsystem disabled");
            }
        }
    }
}

//! Staircase configuration parameters
//!
//! Persisted by the host as a `staircase` section of its JSON config, and
//! optionally as a binary blob through [`ConfigPort`](crate::app::ports::ConfigPort).
//! Key names match the settings page the host already renders.

use core::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::app::ports::ConfigError;
use crate::pins::{self, PinAssignment};

/// Name of the JSON section owned by this controller.
pub const SECTION: &str = "staircase";

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_SEGMENT_DELAY: &str = "segment-delay-ms";
pub const KEY_ON_TIME: &str = "on-time-s";
pub const KEY_TOP_PIN: &str = "topPIRorTrigger_pin";
pub const KEY_BOTTOM_PIN: &str = "bottomPIRorTrigger_pin";
pub const KEY_SWITCH_PIN: &str = "enableSwitch_pin";
pub const KEY_TOGGLE_POWER: &str = "toggle-on-off";

/// Accepted delay between sweep steps.
pub const SEGMENT_DELAY_MS: RangeInclusive<u32> = 10..=10_000;
/// Accepted idle timeout, in seconds (max 15 minutes).
pub const ON_TIME_SECS: RangeInclusive<u32> = 1..=900;

/// Runtime configuration of the staircase controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaircaseConfig {
    /// Master on/off for the subsystem.
    pub enabled: bool,
    /// Delay between two sweep steps (milliseconds).
    pub segment_delay_ms: u32,
    /// Idle time before the lights sweep off (milliseconds).
    pub on_time_ms: u32,
    /// Sensor and switch inputs.
    pub pins: PinAssignment,
    /// Follow staircase on/off with the host's master power.
    pub toggle_power: bool,
}

impl Default for StaircaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            segment_delay_ms: 150,
            on_time_ms: 10_000,
            pins: PinAssignment::default(),
            toggle_power: false,
        }
    }
}

impl StaircaseConfig {
    /// Copy with delay and timeout clamped into their accepted ranges.
    pub fn normalized(mut self) -> Self {
        self.segment_delay_ms = clamp_segment_delay(i64::from(self.segment_delay_ms));
        self.on_time_ms = clamp_on_time_secs(i64::from(self.on_time_ms / 1000)) * 1000;
        self
    }

    /// Merge the `staircase` section of `root` over the current values.
    ///
    /// Fields that are missing or of the wrong type keep their current
    /// value; numeric fields are clamped.  Returns `Ok(true)` when the
    /// stored record is complete (carries `toggle-on-off`), `Ok(false)` when
    /// the host should re-save it.
    pub fn merge_json(&mut self, root: &Value) -> Result<bool, ConfigError> {
        let section = root
            .get(SECTION)
            .filter(|s| s.is_object())
            .ok_or(ConfigError::NotFound)?;
        let record: ConfigRecord =
            serde_json::from_value(section.clone()).map_err(|_| ConfigError::Corrupted)?;

        if let Some(enabled) = record.enabled {
            self.enabled = enabled;
        }
        if let Some(delay) = record.segment_delay_ms {
            self.segment_delay_ms = clamp_segment_delay(delay);
        }
        if let Some(secs) = record.on_time_secs {
            self.on_time_ms = clamp_on_time_secs(secs) * 1000;
        }
        if let Some(raw) = record.top_pin {
            self.pins.top = pins::normalize(raw);
        }
        if let Some(raw) = record.bottom_pin {
            self.pins.bottom = pins::normalize(raw);
        }
        if let Some(raw) = record.switch_pin {
            self.pins.switch = pins::normalize(raw);
        }
        if let Some(toggle) = record.toggle_power {
            self.toggle_power = toggle;
        }

        Ok(section.get(KEY_TOGGLE_POWER).is_some_and(|v| !v.is_null()))
    }

    /// Write the `staircase` section into a host config object.
    pub fn write_json(&self, root: &mut Map<String, Value>) {
        let record = ConfigRecord {
            enabled: Some(self.enabled),
            segment_delay_ms: Some(i64::from(self.segment_delay_ms)),
            on_time_secs: Some(i64::from(self.on_time_ms / 1000)),
            top_pin: Some(i64::from(pins::to_raw(self.pins.top))),
            bottom_pin: Some(i64::from(pins::to_raw(self.pins.bottom))),
            switch_pin: Some(i64::from(pins::to_raw(self.pins.switch))),
            toggle_power: Some(self.toggle_power),
        };
        // A struct of plain scalars always converts.
        if let Ok(value) = serde_json::to_value(record) {
            root.insert(SECTION.into(), value);
        }
    }
}

/// Wire layout of the `staircase` config section.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigRecord {
    #[serde(rename = "enabled", default, deserialize_with = "lenient")]
    enabled: Option<bool>,
    #[serde(rename = "segment-delay-ms", default, deserialize_with = "lenient")]
    segment_delay_ms: Option<i64>,
    #[serde(rename = "on-time-s", default, deserialize_with = "lenient")]
    on_time_secs: Option<i64>,
    #[serde(rename = "topPIRorTrigger_pin", default, deserialize_with = "lenient")]
    top_pin: Option<i64>,
    #[serde(rename = "bottomPIRorTrigger_pin", default, deserialize_with = "lenient")]
    bottom_pin: Option<i64>,
    #[serde(rename = "enableSwitch_pin", default, deserialize_with = "lenient")]
    switch_pin: Option<i64>,
    #[serde(rename = "toggle-on-off", default, deserialize_with = "lenient")]
    toggle_power: Option<bool>,
}

/// Accept any JSON value; a value of the wrong type reads as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn clamp_segment_delay(raw: i64) -> u32 {
    raw.clamp(
        i64::from(*SEGMENT_DELAY_MS.start()),
        i64::from(*SEGMENT_DELAY_MS.end()),
    ) as u32
}

fn clamp_on_time_secs(raw: i64) -> u32 {
    raw.clamp(i64::from(*ON_TIME_SECS.start()), i64::from(*ON_TIME_SECS.end())) as u32
}

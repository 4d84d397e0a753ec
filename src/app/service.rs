//! Application service: the plugin surface the host firmware drives.
//!
//! [`StaircaseService`] owns the configuration, the pin lease and the
//! [`StaircaseController`].  Host ports are injected at call sites, so the
//! whole service runs against mock adapters in tests.
//!
//! ```text
//!  cfg JSON / ConfigPort ──▶ ┌──────────────────────┐ ──▶ EventSink
//!  MQTT /swipe, state JSON ─▶│  StaircaseService     │
//!                  StairHost ◀│  lease · controller   │
//!                            └──────────────────────┘
//! ```

use log::{info, warn};
use serde_json::{Map, Value};

use crate::config::{KEY_ENABLED, SECTION, StaircaseConfig};
use crate::error;
use crate::pins::{PinAssignment, PinLease};
use crate::staircase::{InputChannel, StairStatus, StaircaseController, SweepSettings};

use super::commands::{AppCommand, SWIPE_TOPIC, SwipeCommand};
use super::events::StairEvent;
use super::ports::{ConfigError, ConfigPort, EventSink, StairHost};

/// Key of the host's info-panel object.
const INFO_USER_KEY: &str = "u";

/// Write-side override keys of the state record.
const OVERRIDE_KEYS: [(&str, InputChannel); 3] = [
    ("top-sensor", InputChannel::Top),
    ("bottom-sensor", InputChannel::Bottom),
    ("enable-switch", InputChannel::Switch),
];

// ───────────────────────────────────────────────────────────────
// StaircaseService
// ───────────────────────────────────────────────────────────────

pub struct StaircaseService {
    config: StaircaseConfig,
    controller: StaircaseController,
    lease: PinLease,
    init_done: bool,
}

impl StaircaseService {
    /// Construct the service from configuration.
    ///
    /// Nothing touches the host until [`setup`](Self::setup).
    pub fn new(config: StaircaseConfig) -> Self {
        let config = config.normalized();
        let controller = StaircaseController::new(SweepSettings::from(&config));
        Self {
            config,
            controller,
            lease: PinLease::new(),
            init_done: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Lease the pins and apply the configured enable state.
    ///
    /// Called once by the host after the config has been read, and again
    /// internally whenever a reload changes the pin assignment.
    pub fn setup(&mut self, hw: &mut impl StairHost, sink: &mut impl EventSink) {
        self.set_enabled(self.config.enabled, hw, sink);
        self.init_done = true;
    }

    /// One host loop iteration.  Returns `true` when a sensor changed.
    pub fn tick(&mut self, hw: &mut impl StairHost, sink: &mut impl EventSink) -> bool {
        self.controller.tick(hw, sink)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (MQTT, JSON API, settings page).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl StairHost,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Trigger(channel) => self.controller.post_override(channel.into()),
            AppCommand::OverrideSwitch => self.controller.post_override(InputChannel::Switch),
            AppCommand::SetEnabled(on) => self.set_enabled(on, hw, sink),
            AppCommand::Reconfigure(config) => self.reconfigure(config.normalized(), hw, sink),
        }
    }

    /// Handle a message on a subscribed topic, already stripped of the
    /// device prefix.  Returns `true` when the message was consumed.
    pub fn on_mqtt_message(
        &mut self,
        topic: &str,
        payload: &str,
        hw: &mut impl StairHost,
        sink: &mut impl EventSink,
    ) -> bool {
        if topic != SWIPE_TOPIC {
            return false;
        }
        match SwipeCommand::try_from(payload) {
            Ok(cmd) => {
                self.handle_command(cmd.into(), hw, sink);
                true
            }
            Err(()) => {
                warn!("ignoring swipe payload {:?}", payload);
                false
            }
        }
    }

    // ── Config JSON ───────────────────────────────────────────

    /// Read the `staircase` section of the host config.
    ///
    /// Returns `true` when the stored record is complete; `false` when it
    /// is missing or predates the `toggle-on-off` key, in which case the
    /// host should write the current values back.
    pub fn read_config_json(
        &mut self,
        root: &Value,
        hw: &mut impl StairHost,
        sink: &mut impl EventSink,
    ) -> bool {
        let mut next = self.config.clone();
        let complete = match next.merge_json(root) {
            Ok(complete) => complete,
            Err(ConfigError::NotFound) => {
                info!("{SECTION}: no config found, using defaults");
                return false;
            }
            Err(e) => {
                warn!("{SECTION}: config rejected: {e}");
                return false;
            }
        };

        if self.init_done {
            info!("{SECTION}: config (re)loaded");
        } else {
            info!("{SECTION}: config loaded");
        }
        self.reconfigure(next, hw, sink);
        complete
    }

    /// Write the `staircase` section of the host config.
    pub fn write_config_json(&self, root: &mut Map<String, Value>) {
        self.config.write_json(root);
    }

    /// Load the binary config record and apply it.
    pub fn load_config(
        &mut self,
        storage: &impl ConfigPort,
        hw: &mut impl StairHost,
        sink: &mut impl EventSink,
    ) -> error::Result<()> {
        let config = storage.load()?;
        self.reconfigure(config.normalized(), hw, sink);
        Ok(())
    }

    /// Persist the current config through `storage`.
    pub fn save_config(&self, storage: &impl ConfigPort) -> error::Result<()> {
        storage.save(&self.config)?;
        info!("{SECTION}: config saved");
        Ok(())
    }

    // ── State JSON ────────────────────────────────────────────

    /// Expose the live status under the `staircase` section.
    pub fn write_state_json(&self, root: &mut Map<String, Value>) {
        let Ok(Value::Object(status)) = serde_json::to_value(self.controller.status()) else {
            return;
        };
        if let Some(section) = object_entry(root, SECTION) {
            section.extend(status);
        }
    }

    /// Apply a state update from the JSON API.
    ///
    /// `enabled` toggles the subsystem; the sensor keys post one-shot
    /// overrides that keep an already active input asserted.  Ignored
    /// until [`setup`](Self::setup) has run.
    pub fn read_state_json(
        &mut self,
        root: &Value,
        hw: &mut impl StairHost,
        sink: &mut impl EventSink,
    ) {
        if !self.init_done {
            return;
        }
        let Some(section) = root.get(SECTION).and_then(Value::as_object) else {
            return;
        };

        if let Some(on) = section.get(KEY_ENABLED).and_then(parse_enabled) {
            if on != self.controller.is_enabled() {
                self.set_enabled(on, hw, sink);
            }
        }
        for (key, channel) in OVERRIDE_KEYS {
            let requested = section.get(key).is_some_and(is_truthy);
            self.controller.hold_override(channel, requested);
        }
    }

    /// Add the enable/disable toggle button to the host info panel.
    pub fn write_info_json(&self, root: &mut Map<String, Value>) {
        let (next, icon) = if self.controller.is_enabled() {
            ("false", "on")
        } else {
            ("true", "off")
        };
        let button = format!(
            "<button class=\"btn btn-xs\" onclick=\"requestJson({{{SECTION}:{{{KEY_ENABLED}:{next}}}}});\">\
             <i class=\"icons {icon}\">&#xe08f;</i></button>"
        );
        if let Some(user) = object_entry(root, INFO_USER_KEY) {
            user.insert(SECTION.into(), Value::Array(vec![Value::String(button)]));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &StaircaseConfig {
        &self.config
    }

    pub fn controller(&self) -> &StaircaseController {
        &self.controller
    }

    pub fn is_enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    pub fn status(&self) -> StairStatus {
        self.controller.status()
    }

    /// Pins currently leased from the host.
    pub fn held_pins(&self) -> PinAssignment {
        self.lease.held()
    }

    pub fn is_initialized(&self) -> bool {
        self.init_done
    }

    // ── Internal ──────────────────────────────────────────────

    /// Enable (leasing the pins first) or disable (returning them).
    ///
    /// A pin conflict turns an enable into a disable.
    fn set_enabled(&mut self, on: bool, hw: &mut impl StairHost, sink: &mut impl EventSink) {
        let on = on && self.claim_pins(hw, sink).is_ok();
        self.config.enabled = on;
        self.controller.enable(on, hw, sink);
        if !on {
            self.lease.release_all(hw);
        }
    }

    /// Lease every configured pin.  On conflict the assignment is cleared
    /// so the subsystem never runs on a partial pin set.
    fn claim_pins(&mut self, hw: &mut impl StairHost, sink: &mut impl EventSink) -> error::Result<()> {
        if let Err(e) = self.lease.acquire(hw, &self.config.pins) {
            self.lease.release_all(hw);
            self.config.pins = PinAssignment::default();
            self.controller.apply_settings(SweepSettings::from(&self.config));
            sink.emit(&StairEvent::PinConflict);
            return Err(e.into());
        }
        Ok(())
    }

    /// Swap in `next`.  After setup, a pin change releases the pins that
    /// moved and re-runs setup; an enable change alone just toggles.
    fn reconfigure(&mut self, next: StaircaseConfig, hw: &mut impl StairHost, sink: &mut impl EventSink) {
        let pins_changed = next.pins != self.config.pins;
        self.config = next;
        self.controller.apply_settings(SweepSettings::from(&self.config));

        if !self.init_done {
            return;
        }
        if pins_changed {
            self.lease.release_changed(hw, &self.config.pins);
            self.setup(hw, sink);
        } else if self.config.enabled != self.controller.is_enabled() {
            self.set_enabled(self.config.enabled, hw, sink);
        }
    }
}

/// `enabled` arrives as a bool or as a checkbox string, where only
/// `"off"` means off.
fn parse_enabled(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(on) => Some(*on),
        Value::String(s) => Some(s != "off"),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// The object stored under `key`, created (or replaced) if needed.
fn object_entry<'a>(root: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let entry = root
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut()
}

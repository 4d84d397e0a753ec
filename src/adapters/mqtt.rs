//! MQTT adapter.
//!
//! [`MqttMotionSink`] implements [`EventSink`]: every sensor edge becomes a
//! publication on `<deviceTopic>/motion/<n>` (0 = top, 1 = bottom) with
//! payload `on` / `off`, QoS 0, not retained.  Nothing is sent while the
//! client is disconnected.
//!
//! The host forwards inbound messages to
//! [`StaircaseService::on_mqtt_message`](crate::app::service::StaircaseService::on_mqtt_message)
//! after [`MqttMotionSink::on_connect`] has subscribed the control topic.

use core::fmt::Write;

use log::{debug, warn};

use crate::app::commands::SWIPE_TOPIC;
use crate::app::events::StairEvent;
use crate::app::ports::EventSink;

/// Longest topic we build, device topic included.
pub const MAX_TOPIC_LEN: usize = 64;

pub type Topic = heapless::String<MAX_TOPIC_LEN>;

/// Delivery level used for every staircase message.
const QOS_AT_MOST_ONCE: u8 = 0;

/// The host's MQTT client, reduced to what the staircase uses.
pub trait MqttClient {
    fn is_connected(&self) -> bool;
    fn publish(&mut self, topic: &str, qos: u8, retain: bool, payload: &[u8]);
    fn subscribe(&mut self, topic: &str, qos: u8);
}

/// Publishes sensor edges under a device topic.
pub struct MqttMotionSink<C: MqttClient> {
    client: C,
    device_topic: Topic,
}

impl<C: MqttClient> MqttMotionSink<C> {
    /// `device_topic` longer than [`MAX_TOPIC_LEN`] is treated as unset.
    pub fn new(client: C, device_topic: &str) -> Self {
        let device_topic = Topic::try_from(device_topic).unwrap_or_else(|()| {
            warn!("MQTT: device topic too long, publishing disabled");
            Topic::new()
        });
        Self {
            client,
            device_topic,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Subscribe the `/swipe` control topic.  Skipped without a device topic.
    pub fn on_connect(&mut self) {
        if self.device_topic.is_empty() {
            return;
        }
        if let Some(topic) = self.topic(format_args!("{}{}", self.device_topic, SWIPE_TOPIC)) {
            debug!("MQTT: subscribing {}", topic);
            self.client.subscribe(&topic, QOS_AT_MOST_ONCE);
        }
    }

    fn publish_motion(&mut self, channel: u8, active: bool) {
        if self.device_topic.is_empty() || !self.client.is_connected() {
            return;
        }
        let Some(topic) = self.topic(format_args!("{}/motion/{}", self.device_topic, channel)) else {
            return;
        };
        let payload: &[u8] = if active { b"on" } else { b"off" };
        self.client.publish(&topic, QOS_AT_MOST_ONCE, false, payload);
    }

    fn topic(&self, args: core::fmt::Arguments<'_>) -> Option<Topic> {
        let mut topic = Topic::new();
        if topic.write_fmt(args).is_err() {
            warn!("MQTT: topic exceeds {} bytes", MAX_TOPIC_LEN);
            return None;
        }
        Some(topic)
    }
}

impl<C: MqttClient> EventSink for MqttMotionSink<C> {
    fn emit(&mut self, event: &StairEvent) {
        if let StairEvent::SensorChanged { channel, active } = event {
            self.publish_motion(channel.index(), *active);
        }
    }
}

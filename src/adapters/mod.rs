//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                        |
//! |------------|------------|------------------------------------|
//! | `gpio`     | PinPort    | `embedded-hal` input pins          |
//! | `log_sink` | EventSink  | Serial log output                  |
//! | `mqtt`     | EventSink  | Host MQTT client (motion topics)   |
//! | `nvs`      | ConfigPort | Namespaced blob store              |
//! | `time`     | Clock      | `std::time::Instant`               |
//!
//! The segment store and master power stay with the host firmware, which
//! owns the LED strip.

pub mod gpio;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;

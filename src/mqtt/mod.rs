//! # MQTT Integration Module
//!
//! Broker connectivity for the monitor and the test publisher.
//!
//! ```text
//! mqtt/
//! ├── config.rs           - Connection parameters and rumqttc options
//! ├── message_manager.rs  - Received message representation
//! └── mqtt_handler.rs     - Monitor connection state machine and receive loop
//! ```
//!
//! The receive loop processes one publish to completion before polling for
//! the next, so delivery order is whatever the broker provides.

pub mod config;
pub mod message_manager;
pub mod mqtt_handler;

pub use config::MqttConfig;
pub use message_manager::MQTTMessage;
pub use mqtt_handler::{deliver, MonitorConnection};

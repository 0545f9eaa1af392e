//! # voice-monitor
//!
//! Terminal tooling for the voice assistant's MQTT traffic: a live monitor
//! that classifies and formats every message under the assistant namespace,
//! and a publisher that sends canned messages for testing.
//!
//! ```text
//! broker ──► mqtt::MonitorConnection ──► monitor::MonitorSession ──► ui::TerminalSink ──► stdout
//!                                          │
//!                                          └─ classify: topic → category → filter → payload
//! ```
//!
//! - **[`classify`]**: the stateless classification pipeline
//! - **[`monitor`]**: per-session state and formatted entries
//! - **[`mqtt`]**: broker connection and receive loop
//! - **[`publisher`]**: test message templates and sequences
//! - **[`ui`]**: colored terminal output
//! - **[`config`]**: settings file and command line overrides

pub mod classify;
pub mod config;
pub mod error;
pub mod monitor;
pub mod mqtt;
pub mod publisher;
pub mod ui;

pub use classify::{Category, CategoryDescriptor, SubscriptionFilter, TopicPath};
pub use config::{Overrides, Settings};
pub use error::MonitorError;
pub use monitor::{EntrySink, FormattedEntry, MonitorSession};

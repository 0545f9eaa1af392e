//! Error definitions for the monitor and publisher

use thiserror::Error;

/// Errors surfaced to the operator
///
/// Classification and payload interpretation never produce these; a bad
/// message is always rendered as a fallback entry instead.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Connection to the broker failed or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The broker refused or the client failed to queue a subscription
    #[error("Subscribe error: {0}")]
    Subscribe(String),

    /// Publishing a message failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Configuration file could not be read, parsed or written
    #[error("Config error: {0}")]
    Config(String),

    /// Payload given on the command line is not usable
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rumqttc::ClientError> for MonitorError {
    fn from(e: rumqttc::ClientError) -> Self {
        MonitorError::Publish(e.to_string())
    }
}

impl From<rumqttc::ConnectionError> for MonitorError {
    fn from(e: rumqttc::ConnectionError) -> Self {
        MonitorError::Connection(e.to_string())
    }
}

//! Monitor connection with statum state machine
//!
//! ```text
//! Configured ──connect()──► Subscribed ──run_until_cancelled()──► Closed
//! ```
//!
//! `connect` waits for the broker's ConnAck and queues the wildcard
//! subscription. The run loop re-subscribes on every later ConnAck, since
//! sessions are clean, and hands each publish to the monitor session one at a
//! time. Transport errors end the run; reconnecting is left to the operator.

use std::io;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS, SubscribeReasonCode};
use statum::{machine, state};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::config::MqttConfig;
use super::message_manager::MQTTMessage;
use crate::error::MonitorError;
use crate::monitor::{EntrySink, MonitorSession};

const REQUEST_CAPACITY: usize = 100;
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

#[state]
#[derive(Debug, Clone)]
pub enum ConnectionPhase {
    Configured, // Client built, nothing sent yet
    Subscribed, // ConnAck received, subscription queued
    Closed,     // Loop left, client disconnected
}

#[machine]
pub struct MonitorConnection<S: ConnectionPhase> {
    client: AsyncClient,
    eventloop: EventLoop,
    pattern: String,
    messages_received: usize,
}

impl<S: ConnectionPhase> MonitorConnection<S> {
    async fn subscribe(&mut self) -> Result<(), MonitorError> {
        debug!("Subscribing to {}", self.pattern);
        self.client
            .subscribe(self.pattern.clone(), QoS::AtMostOnce)
            .await
            .map_err(|e| MonitorError::Subscribe(e.to_string()))
    }
}

impl MonitorConnection<Configured> {
    pub fn create(config: &MqttConfig, pattern: impl Into<String>) -> Self {
        let (client, eventloop) = AsyncClient::new(config.options(), REQUEST_CAPACITY);
        info!("Monitor connection configured for {}", config);

        Self::new(client, eventloop, pattern.into(), 0)
    }

    /// Waits for the broker to accept the connection, then subscribes
    pub async fn connect(mut self) -> Result<MonitorConnection<Subscribed>, MonitorError> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    debug!("ConnAck: {:?}", ack);
                    self.subscribe().await?;
                    info!("Connected, subscription to {} queued", self.pattern);
                    return Ok(self.transition());
                }
                Ok(event) => trace!("Event before ConnAck: {:?}", event),
                Err(e) => {
                    error!("Connection failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }
}

impl MonitorConnection<Subscribed> {
    /// Feeds every publish through `session` until `cancel` fires
    ///
    /// A failing message never ends the loop; a failing transport does.
    pub async fn run_until_cancelled<K: EntrySink>(
        mut self,
        session: &mut MonitorSession,
        sink: &mut K,
        cancel: CancellationToken,
    ) -> Result<MonitorConnection<Closed>, MonitorError> {
        info!("Monitoring {}", self.pattern);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cancellation received, leaving monitor loop");
                    break;
                }

                polled = self.eventloop.poll() => match polled {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let message = MQTTMessage::from_publish(&publish);
                        self.messages_received += 1;
                        deliver(session, sink, &message)?;
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        warn!("Broker session restarted, subscribing again");
                        self.subscribe().await?;
                    }
                    Ok(Event::Incoming(Packet::SubAck(ack))) => {
                        if ack
                            .return_codes
                            .iter()
                            .any(|code| matches!(code, SubscribeReasonCode::Failure)) {
                            return Err(MonitorError::Subscribe(format!(
                                "Broker rejected subscription to {}",
                                self.pattern
                            )));
                        }
                        info!("Subscription to {} confirmed", self.pattern);
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        return Err(MonitorError::Connection(
                            "Broker closed the connection".to_string(),
                        ));
                    }
                    Ok(event) => trace!("Ignoring event: {:?}", event),
                    Err(e) => {
                        error!("Connection lost: {}", e);
                        return Err(e.into());
                    }
                }
            }
        }

        Ok(self.disconnect().await)
    }

    async fn disconnect(mut self) -> MonitorConnection<Closed> {
        if self.client.try_disconnect().is_ok() {
            // One more poll flushes the Disconnect packet
            let flushed = tokio::time::timeout(DISCONNECT_GRACE, async {
                loop {
                    match self.eventloop.poll().await {
                        Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
            })
            .await;
            if flushed.is_err() {
                debug!("Disconnect not flushed within {:?}", DISCONNECT_GRACE);
            }
        }

        info!(
            "Monitor connection closed after {} messages",
            self.messages_received
        );
        self.transition()
    }
}

impl MonitorConnection<Closed> {
    /// Publishes received, including those the filter dropped
    pub fn messages_received(&self) -> usize {
        self.messages_received
    }
}

/// Runs one message through the session and writes it if admitted
///
/// Returns whether the message was admitted.
pub fn deliver<K: EntrySink>(
    session: &mut MonitorSession,
    sink: &mut K,
    message: &MQTTMessage,
) -> io::Result<bool> {
    match session.process_at(message.topic(), message.payload(), message.timestamp()) {
        Some(entry) => {
            sink.emit(&entry, session.accepted())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

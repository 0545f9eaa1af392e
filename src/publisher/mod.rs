//! # Test Publisher
//!
//! Sends canned assistant messages so a running monitor can be exercised
//! without the backend. The event loop is driven in a background task; the
//! publisher itself only queues requests on the client.

pub mod templates;

pub use templates::Template;

use std::time::Duration;

use rumqttc::{AsyncClient, Event, Outgoing, Packet, QoS};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::MonitorError;
use crate::mqtt::MqttConfig;

const REQUEST_CAPACITY: usize = 10;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One message of a scripted sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStep {
    pub description: String,
    pub topic: String,
    pub payload: Value,
}

impl SequenceStep {
    fn new(description: &str, topic: String, payload: Value) -> Self {
        Self {
            description: description.to_string(),
            topic,
            payload,
        }
    }
}

/// The messages one voice command produces, from upload to completion
pub fn voice_command_sequence(namespace: &str, owner: &str) -> Vec<SequenceStep> {
    let audio_id = templates::generate_audio_id();
    let status_topic = Template::Status.topic(namespace, owner);

    vec![
        SequenceStep::new(
            "📥 Status: audio received",
            status_topic.clone(),
            templates::status_payload(&audio_id, "received", 10, "Audio received, starting processing"),
        ),
        SequenceStep::new(
            "🎙️  Status: transcribing",
            status_topic.clone(),
            templates::status_payload(&audio_id, "transcribing", 50, "Processing with Whisper..."),
        ),
        SequenceStep::new(
            "📝 Transcription",
            Template::Transcription.topic(namespace, owner),
            Template::Transcription.payload(&audio_id, owner),
        ),
        SequenceStep::new(
            "😊 Emotion analysis",
            Template::Emotion.topic(namespace, owner),
            Template::Emotion.payload(&audio_id, owner),
        ),
        SequenceStep::new(
            "✅ Task created",
            Template::Task.topic(namespace, owner),
            Template::Task.payload(&audio_id, owner),
        ),
        SequenceStep::new(
            "📢 Notification",
            Template::Notification.topic(namespace, owner),
            Template::Notification.payload(&audio_id, owner),
        ),
        SequenceStep::new(
            "✅ Status: completed",
            status_topic,
            templates::status_payload(&audio_id, "completed", 100, "Processing completed successfully"),
        ),
    ]
}

/// Topic for a free-form test message
///
/// Topics outside the namespace are placed under `<namespace>/test/`.
pub fn custom_topic(namespace: &str, topic: &str) -> String {
    let prefix = format!("{}/", namespace);
    if topic.starts_with(&prefix) {
        topic.to_string()
    } else {
        format!("{}test/{}", prefix, topic.trim_start_matches('/'))
    }
}

pub struct Publisher {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

impl Publisher {
    /// Connects and waits for the broker's ConnAck
    pub async fn connect(config: &MqttConfig) -> Result<Self, MonitorError> {
        let (client, mut eventloop) = AsyncClient::new(config.options(), REQUEST_CAPACITY);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => break,
                Ok(event) => debug!("Event before ConnAck: {:?}", event),
                Err(e) => {
                    error!("Publisher connection failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        info!("Publisher connected to {}", config);

        let driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Publisher event loop stopped: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self { client, driver })
    }

    pub async fn publish_json(&self, topic: &str, payload: &Value) -> Result<(), MonitorError> {
        let body = serde_json::to_string_pretty(payload)
            .map_err(|e| MonitorError::InvalidPayload(e.to_string()))?;
        self.publish_raw(topic, body.into_bytes()).await
    }

    pub async fn publish_raw(&self, topic: &str, payload: Vec<u8>) -> Result<(), MonitorError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await?;
        debug!("Queued publish to {}", topic);
        Ok(())
    }

    /// Publishes each step, waiting `delay` between steps
    pub async fn publish_sequence<F>(
        &self,
        steps: &[SequenceStep],
        delay: Duration,
        mut on_step: F,
    ) -> Result<(), MonitorError>
    where
        F: FnMut(usize, &SequenceStep),
    {
        for (i, step) in steps.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(delay).await;
            }
            on_step(i + 1, step);
            self.publish_json(&step.topic, &step.payload).await?;
        }
        Ok(())
    }

    /// Disconnects once queued publishes are flushed
    pub async fn shutdown(self) -> Result<(), MonitorError> {
        self.client.disconnect().await?;
        if tokio::time::timeout(SHUTDOWN_GRACE, self.driver).await.is_err() {
            warn!("Publisher did not shut down within {:?}", SHUTDOWN_GRACE);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Category, SubscriptionFilter};
    use crate::monitor::MonitorSession;

    #[test]
    fn test_custom_topic() {
        assert_eq!(custom_topic("audio", "audio/test/mine"), "audio/test/mine");
        assert_eq!(custom_topic("audio", "mine"), "audio/test/mine");
        assert_eq!(custom_topic("audio", "/mine"), "audio/test/mine");
        assert_eq!(custom_topic("audio", "audiox/a"), "audio/test/audiox/a");
    }

    #[test]
    fn test_sequence_shape() {
        let steps = voice_command_sequence("audio", "single-user");
        assert_eq!(steps.len(), 7);
        assert_eq!(steps[0].payload["progress"], 10);
        assert_eq!(steps[6].payload["status"], "completed");

        let audio_id = &steps[0].payload["audio_id"];
        assert!(steps
            .iter()
            .filter(|s| s.topic.starts_with("audio/status/"))
            .all(|s| &s.payload["audio_id"] == audio_id));
    }

    #[test]
    fn test_sequence_through_monitor() {
        let steps = voice_command_sequence("audio", "single-user");
        let mut session = MonitorSession::new(SubscriptionFilter::for_owner("single-user"), false);

        let entries: Vec<_> = steps
            .iter()
            .filter_map(|s| session.process(&s.topic, s.payload.to_string().as_bytes()))
            .collect();

        assert_eq!(entries.len(), steps.len());
        assert_eq!(session.accepted(), 7);
        assert_eq!(entries[2].descriptor.category, Category::Transcription);
        assert!(entries[6].to_string().contains("100%"));
    }
}

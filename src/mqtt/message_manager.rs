use chrono::{DateTime, Local};
use rumqttc::Publish;
use std::fmt;

/// A publish as received from the broker, stamped on arrival
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MQTTMessage {
    topic: String,
    payload: Vec<u8>,
    timestamp: DateTime<Local>,
}

impl fmt::Display for MQTTMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} bytes)",
            self.timestamp.format("%H:%M:%S"),
            self.topic,
            self.payload.len()
        )
    }
}

impl MQTTMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        MQTTMessage {
            topic: topic.into(),
            payload: payload.into(),
            timestamp: Local::now(),
        }
    }

    pub fn from_publish(publish: &Publish) -> Self {
        Self::new(publish.topic.clone(), publish.payload.to_vec())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::QoS;

    #[test]
    fn test_from_publish() {
        let publish = Publish::new("audio/status/u", QoS::AtMostOnce, br#"{"status":"ok"}"#.to_vec());
        let message = MQTTMessage::from_publish(&publish);

        assert_eq!(message.topic(), "audio/status/u");
        assert_eq!(message.payload(), br#"{"status":"ok"}"#);
        assert!(message.to_string().ends_with("audio/status/u (15 bytes)"));
    }
}

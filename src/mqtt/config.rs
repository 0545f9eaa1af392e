use rumqttc::MqttOptions;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::config::BrokerSettings;

/// Resolved connection parameters for one broker
#[derive(Debug, Clone, PartialEq)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: Duration,
    pub credentials: Option<(String, String)>,
}

impl MqttConfig {
    /// Client options with a unique client id so several monitors can share a broker
    pub fn options(&self) -> MqttOptions {
        let suffix = Uuid::new_v4().simple().to_string();
        let client_id = format!("{}-{}", self.client_id, &suffix[..8]);

        let mut options = MqttOptions::new(client_id, self.host.clone(), self.port);
        options.set_keep_alive(self.keep_alive);
        if let Some((user, pw)) = &self.credentials {
            options.set_credentials(user.clone(), pw.clone());
        }
        options
    }
}

impl From<&BrokerSettings> for MqttConfig {
    fn from(broker: &BrokerSettings) -> Self {
        let credentials = match (&broker.username, &broker.password) {
            (Some(user), Some(pw)) => Some((user.clone(), pw.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        };

        MqttConfig {
            host: broker.host.clone(),
            port: broker.port,
            client_id: broker.client_id.clone(),
            // rumqttc rejects keep alive intervals under five seconds
            keep_alive: Duration::from_secs(broker.keep_alive_secs.max(5)),
            credentials,
        }
    }
}

impl fmt::Display for MqttConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.credentials {
            Some((user, _)) => write!(f, "{}@{}:{}", user, self.host, self.port),
            None => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_broker_settings() {
        let broker = BrokerSettings {
            host: "192.168.3.3".to_string(),
            username: Some("voice".to_string()),
            password: Some("secret".to_string()),
            keep_alive_secs: 1,
            ..BrokerSettings::default()
        };
        let config = MqttConfig::from(&broker);

        assert_eq!(config.port, 1883);
        assert_eq!(config.keep_alive, Duration::from_secs(5));
        assert_eq!(config.to_string(), "voice@192.168.3.3:1883");
    }

    #[test]
    fn test_client_ids_are_unique() {
        let config = MqttConfig::from(&BrokerSettings::default());
        let a = config.options();
        let b = config.options();

        assert!(a.client_id().starts_with("voice-monitor-"));
        assert_ne!(a.client_id(), b.client_id());
        assert_eq!(a.broker_address(), ("localhost".to_string(), 1883));
    }
}

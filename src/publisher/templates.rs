//! Canned payloads in the shapes the assistant backend publishes

use chrono::{Duration as ChronoDuration, Local, SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::classify::Category;

/// One message kind the publisher can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Transcription,
    Status,
    Notification,
    Task,
    Emotion,
    ClientApp,
    System,
}

impl Template {
    pub const ALL: [Template; 7] = [
        Template::Transcription,
        Template::Status,
        Template::Notification,
        Template::Task,
        Template::Emotion,
        Template::ClientApp,
        Template::System,
    ];

    pub fn category(self) -> Category {
        match self {
            Template::Transcription => Category::Transcription,
            Template::Status => Category::Status,
            Template::Notification => Category::Notification,
            Template::Task => Category::Task,
            Template::Emotion => Category::Emotion,
            Template::ClientApp => Category::ClientApp,
            Template::System => Category::System,
        }
    }

    /// System messages are broadcast and carry no owner level
    pub fn topic(self, namespace: &str, owner: &str) -> String {
        match self {
            Template::System => format!("{}/{}", namespace, self.category().token()),
            _ => format!("{}/{}/{}", namespace, self.category().token(), owner),
        }
    }

    pub fn payload(self, audio_id: &str, owner: &str) -> Value {
        match self {
            Template::Transcription => json!({
                "audio_id": audio_id,
                "text": "Recuérdame llamar a Juan Pérez mañana por la mañana para hablar sobre el proyecto",
                "confidence": 0.92,
                "language": "es",
                "duration": 60.5,
                "timestamp": timestamp(),
                "source": "whisper-backend",
                "user_id": owner,
            }),
            Template::Status => status_payload(audio_id, "transcribing", 75, "Processing audio with Whisper..."),
            Template::Notification => json!({
                "type": "task_created",
                "title": "New task created",
                "message": "Task created: Call client Juan Pérez",
                "priority": "high",
                "action_url": "/tasks/12345",
                "timestamp": timestamp(),
                "metadata": {
                    "task_id": generate_task_id(),
                    "audio_id": audio_id,
                    "source": "voice_command",
                },
            }),
            Template::Task => json!({
                "task": {
                    "id": generate_task_id(),
                    "title": "Call client Juan Pérez",
                    "description": "Follow up on the Q1 project proposal",
                    "priority": "high",
                    "due_date": offset_timestamp(ChronoDuration::days(1)),
                    "category": "sales",
                    "estimated_duration": 30,
                    "created_from_audio": audio_id,
                },
                "trigger": {
                    "voice_command": "Recuérdame llamar a Juan Pérez mañana",
                    "confidence": 0.92,
                    "extracted_entities": {
                        "person": "Juan Pérez",
                        "action": "llamar",
                        "when": "mañana",
                    },
                },
                "timestamp": timestamp(),
            }),
            Template::Emotion => json!({
                "audio_id": audio_id,
                "emotions": {
                    "joy": 0.75,
                    "trust": 0.60,
                    "stress": 0.25,
                    "neutral": 0.10,
                },
                "primary_emotion": "joy",
                "energy_level": "high",
                "speech_rate": "normal",
                "confidence": 0.83,
                "analysis_model": "emotion-ai-v2",
                "timestamp": timestamp(),
            }),
            Template::ClientApp => json!({
                "action": "recording_started",
                "audio_id": audio_id,
                "duration_planned": 60,
                "quality": "high",
                "device_info": {
                    "model": "M2101K6P",
                    "os": "Android 12",
                    "app_version": "1.0.0",
                },
                "timestamp": timestamp(),
            }),
            Template::System => json!({
                "type": "service_health",
                "services": {
                    "whisper_service": "healthy",
                    "mqtt_broker": "healthy",
                    "mongodb": "healthy",
                    "n8n": "healthy",
                },
                "total_uptime": 3600,
                "timestamp": timestamp(),
            }),
        }
    }
}

/// A processing status update
pub fn status_payload(audio_id: &str, status: &str, progress: u8, message: &str) -> Value {
    json!({
        "audio_id": audio_id,
        "status": status,
        "progress": progress,
        "message": message,
        "timestamp": timestamp(),
        "estimated_completion": offset_timestamp(ChronoDuration::seconds(30)),
    })
}

/// `<yyyymmdd_hhmmss>_<8 hex>`
pub fn generate_audio_id() -> String {
    let unique = Uuid::new_v4().simple().to_string();
    format!("{}_{}", Local::now().format("%Y%m%d_%H%M%S"), &unique[..8])
}

pub fn generate_task_id() -> String {
    let unique = Uuid::new_v4().simple().to_string();
    format!("task_{}", &unique[..8])
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn offset_timestamp(offset: ChronoDuration) -> String {
    (Utc::now() + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, interpret, PayloadView, TopicPath};

    #[test]
    fn test_topics() {
        assert_eq!(
            Template::Transcription.topic("audio", "single-user"),
            "audio/transcription/single-user"
        );
        assert_eq!(
            Template::ClientApp.topic("audio", "single-user"),
            "audio/flutter/single-user"
        );
        assert_eq!(Template::System.topic("audio", "single-user"), "audio/system");
    }

    #[test]
    fn test_templates_classify_as_their_category() {
        let audio_id = generate_audio_id();
        for template in Template::ALL {
            let topic = TopicPath::parse(&template.topic("audio", "u"));
            assert_eq!(classify(&topic).category, template.category());

            let raw = template.payload(&audio_id, "u").to_string();
            let view = interpret(template.category(), raw.as_bytes()).view;
            assert!(
                !matches!(view, PayloadView::Generic { .. } | PayloadView::Undecodable { .. }),
                "{:?} decoded to {:?}",
                template,
                view
            );
        }
    }

    #[test]
    fn test_emotion_template_primary_is_joy() {
        let raw = Template::Emotion.payload("a", "u").to_string();
        match interpret(Category::Emotion, raw.as_bytes()).view {
            PayloadView::Emotion { primary, .. } => assert_eq!(primary.label, "joy"),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_generated_ids() {
        let audio_id = generate_audio_id();
        assert_eq!(audio_id.len(), "20250101_120000_".len() + 8);
        assert!(generate_task_id().starts_with("task_"));
        assert_ne!(generate_task_id(), generate_task_id());
    }
}

//! Payload interpretation
//!
//! Decodes a message body into a typed record for its category and extracts
//! the handful of fields worth showing. Anything that does not decode, or
//! does not fit the record for its category, degrades to a generic or raw
//! view; interpretation itself never fails.

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::category::Category;

/// Characters of transcript text shown before truncation
pub const TRANSCRIPT_DISPLAY_LEN: usize = 150;
/// Characters of an undecodable body shown before truncation
pub const RAW_PREVIEW_LEN: usize = 200;
/// Characters of pretty-printed JSON shown for uncategorised payloads
pub const GENERIC_PREVIEW_LEN: usize = 300;
/// Characters of compact JSON shown for client app payloads
pub const CLIENT_APP_PREVIEW_LEN: usize = 150;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TranscriptionPayload {
    pub text: Option<String>,
    pub confidence: Option<f64>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusPayload {
    pub status: Option<String>,
    pub progress: Option<Number>,
    /// Ids are strings from the backend but numbers from some clients
    pub audio_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskInfo {
    pub title: Option<String>,
    /// Either a level name or a number
    pub priority: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPayload {
    pub task: Option<TaskInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmotionPayload {
    /// Label to score, in the order the publisher wrote them
    pub emotions: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientAppPayload {
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub services: Option<Map<String, Value>>,
}

/// A decoded body, typed by category where the shape fits
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    Transcription(TranscriptionPayload),
    Status(StatusPayload),
    Notification(NotificationPayload),
    Task(TaskPayload),
    Emotion(EmotionPayload),
    ClientApp(ClientAppPayload),
    System(SystemPayload),
    /// Valid JSON without a typed record (unknown category or shape mismatch)
    Generic(Value),
}

impl DecodedPayload {
    /// Populates the record matching `category`, or falls back to `Generic`
    pub fn from_value(category: Category, value: Value) -> Self {
        if !value.is_object() {
            return DecodedPayload::Generic(value);
        }

        let typed = match category {
            Category::Transcription => {
                typed_record(&value).map(DecodedPayload::Transcription)
            }
            Category::Status => typed_record(&value).map(DecodedPayload::Status),
            Category::Notification => typed_record(&value).map(DecodedPayload::Notification),
            Category::Task => typed_record(&value).map(DecodedPayload::Task),
            Category::Emotion => typed_record(&value).map(DecodedPayload::Emotion),
            Category::ClientApp => typed_record(&value).map(DecodedPayload::ClientApp),
            Category::System => typed_record(&value).map(DecodedPayload::System),
            Category::DiagnosticTest | Category::Other | Category::Invalid => None,
        };

        typed.unwrap_or(DecodedPayload::Generic(value))
    }
}

fn typed_record<T: for<'de> Deserialize<'de>>(value: &Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Payload does not fit its category record: {}", e);
            None
        }
    }
}

/// One label with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEmotion {
    pub label: String,
    pub score: f64,
}

/// Highest-scoring emotion. On equal scores the first key encountered wins.
///
/// Entries whose value is not a number are skipped.
pub fn primary_emotion(emotions: &Map<String, Value>) -> Option<ScoredEmotion> {
    scored_emotions(emotions)
        .into_iter()
        .fold(None, |best: Option<ScoredEmotion>, candidate| match best {
            Some(current) if candidate.score <= current.score => Some(current),
            _ => Some(candidate),
        })
}

fn scored_emotions(emotions: &Map<String, Value>) -> Vec<ScoredEmotion> {
    emotions
        .iter()
        .filter_map(|(label, score)| {
            score.as_f64().map(|score| ScoredEmotion {
                label: label.clone(),
                score,
            })
        })
        .collect()
}

/// Display fields extracted from one message
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadView {
    Transcription {
        text: String,
        confidence: f64,
        language: String,
    },
    Status {
        status: String,
        progress: String,
        audio_id: String,
    },
    Notification {
        message: String,
        kind: String,
    },
    Task {
        title: String,
        priority: String,
    },
    Emotion {
        primary: ScoredEmotion,
        all: Vec<ScoredEmotion>,
    },
    ClientApp {
        action: String,
        preview: String,
    },
    System {
        kind: String,
        services: Vec<(String, String)>,
    },
    Generic {
        preview: String,
    },
    /// Body was not JSON; holds a truncated copy of the text
    Undecodable {
        preview: String,
    },
}

impl PayloadView {
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, PayloadView::Undecodable { .. })
    }
}

/// Result of interpreting one message body
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub view: PayloadView,
    /// The decoded document, kept for verbose output
    pub document: Option<Value>,
}

impl Interpretation {
    pub fn is_decode_failure(&self) -> bool {
        self.view.is_decode_failure()
    }
}

/// Decodes `raw` and extracts the display fields for `category`
pub fn interpret(category: Category, raw: &[u8]) -> Interpretation {
    let document: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!("Payload is not JSON: {}", e);
            let text = String::from_utf8_lossy(raw);
            return Interpretation {
                view: PayloadView::Undecodable {
                    preview: truncate_display(&text, RAW_PREVIEW_LEN),
                },
                document: None,
            };
        }
    };

    let view = extract(DecodedPayload::from_value(category, document.clone()), &document);
    Interpretation {
        view,
        document: Some(document),
    }
}

fn extract(decoded: DecodedPayload, document: &Value) -> PayloadView {
    match decoded {
        DecodedPayload::Transcription(p) => PayloadView::Transcription {
            text: truncate_display(p.text.as_deref().unwrap_or_default(), TRANSCRIPT_DISPLAY_LEN),
            confidence: p.confidence.unwrap_or(0.0),
            language: p.language.unwrap_or_else(|| "unknown".to_string()),
        },
        DecodedPayload::Status(p) => PayloadView::Status {
            status: p.status.unwrap_or_else(|| "unknown".to_string()),
            progress: p
                .progress
                .map(|n| n.to_string())
                .unwrap_or_else(|| "0".to_string()),
            audio_id: p
                .audio_id
                .as_ref()
                .map(value_text)
                .unwrap_or_else(|| "N/A".to_string()),
        },
        DecodedPayload::Notification(p) => PayloadView::Notification {
            message: p.message.unwrap_or_default(),
            kind: p.kind.unwrap_or_else(|| "info".to_string()),
        },
        DecodedPayload::Task(TaskPayload { task: Some(task) }) => PayloadView::Task {
            title: task.title.unwrap_or_else(|| "Untitled".to_string()),
            priority: task
                .priority
                .as_ref()
                .map(value_text)
                .unwrap_or_else(|| "normal".to_string()),
        },
        DecodedPayload::Emotion(EmotionPayload {
            emotions: Some(emotions),
        }) => match primary_emotion(&emotions) {
            Some(primary) => PayloadView::Emotion {
                primary,
                all: scored_emotions(&emotions),
            },
            None => generic_view(document),
        },
        DecodedPayload::ClientApp(p) => PayloadView::ClientApp {
            action: p.action.unwrap_or_else(|| "unknown".to_string()),
            preview: truncate_display(&document.to_string(), CLIENT_APP_PREVIEW_LEN),
        },
        DecodedPayload::System(SystemPayload {
            kind: Some(kind),
            services,
        }) => PayloadView::System {
            kind,
            services: services
                .map(|services| {
                    services
                        .iter()
                        .map(|(name, state)| (name.clone(), value_text(state)))
                        .collect()
                })
                .unwrap_or_default(),
        },
        DecodedPayload::Task(_)
        | DecodedPayload::Emotion(_)
        | DecodedPayload::System(_)
        | DecodedPayload::Generic(_) => generic_view(document),
    }
}

fn generic_view(document: &Value) -> PayloadView {
    let pretty = serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
    PayloadView::Generic {
        preview: truncate_display(&pretty, GENERIC_PREVIEW_LEN),
    }
}

/// Strings without their JSON quotes, everything else in JSON notation
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keeps the first `max` characters, marking the cut with an ellipsis
pub fn truncate_display(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    #[test]
    fn test_emotion_primary() {
        let raw = br#"{"emotions": {"joy": 0.75, "calm": 0.60}}"#;
        let interpretation = interpret(Category::Emotion, raw);
        match interpretation.view {
            PayloadView::Emotion { primary, all } => {
                assert_eq!(primary.label, "joy");
                assert_eq!(primary.score, 0.75);
                assert_eq!(all.len(), 2);
                assert_eq!(all[1].label, "calm");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_emotion_tie_keeps_first_key() {
        let raw = br#"{"emotions": {"stress": 0.5, "calm": 0.5, "joy": 0.1}}"#;
        match interpret(Category::Emotion, raw).view {
            PayloadView::Emotion { primary, .. } => assert_eq!(primary.label, "stress"),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_primary_emotion_skips_non_numbers() {
        let emotions = json!({"mood": "good", "calm": 0.2});
        let emotions = emotions.as_object().unwrap();
        let primary = primary_emotion(emotions).unwrap();
        assert_eq!(primary.label, "calm");
    }

    #[test]
    fn test_empty_emotions_fall_back_to_generic() {
        let view = interpret(Category::Emotion, br#"{"emotions": {}}"#).view;
        assert!(matches!(view, PayloadView::Generic { .. }));
    }

    #[test]
    fn test_malformed_payload() {
        for category in [Category::Status, Category::Emotion, Category::Other, Category::Invalid] {
            let interpretation = interpret(category, b"not-json{");
            assert!(interpretation.is_decode_failure());
            assert_eq!(
                interpretation.view,
                PayloadView::Undecodable {
                    preview: "not-json{".to_string()
                }
            );
            assert!(interpretation.document.is_none());
        }
    }

    #[test]
    fn test_malformed_payload_is_truncated() {
        let raw = "x".repeat(RAW_PREVIEW_LEN + 50);
        match interpret(Category::Status, raw.as_bytes()).view {
            PayloadView::Undecodable { preview } => {
                assert_eq!(preview.len(), RAW_PREVIEW_LEN + ELLIPSIS.len());
                assert!(preview.ends_with("..."));
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_transcription_fields() {
        let text = "a".repeat(TRANSCRIPT_DISPLAY_LEN + 10);
        let raw = bytes(json!({"text": text, "confidence": 0.923, "language": "es"}));
        match interpret(Category::Transcription, &raw).view {
            PayloadView::Transcription {
                text,
                confidence,
                language,
            } => {
                assert_eq!(text.chars().count(), TRANSCRIPT_DISPLAY_LEN + 3);
                assert_eq!(confidence, 0.923);
                assert_eq!(language, "es");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_transcription_defaults() {
        match interpret(Category::Transcription, b"{}").view {
            PayloadView::Transcription {
                text,
                confidence,
                language,
            } => {
                assert_eq!(text, "");
                assert_eq!(confidence, 0.0);
                assert_eq!(language, "unknown");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_status_fields() {
        let raw = br#"{"status":"transcribing","progress":50,"audio_id":"a1"}"#;
        assert_eq!(
            interpret(Category::Status, raw).view,
            PayloadView::Status {
                status: "transcribing".to_string(),
                progress: "50".to_string(),
                audio_id: "a1".to_string(),
            }
        );
    }

    #[test]
    fn test_loose_field_types_keep_category_view() {
        let raw = br#"{"status":"transcribing","progress":50,"audio_id":12345,"message":{"step":2}}"#;
        assert_eq!(
            interpret(Category::Status, raw).view,
            PayloadView::Status {
                status: "transcribing".to_string(),
                progress: "50".to_string(),
                audio_id: "12345".to_string(),
            }
        );

        let raw = br#"{"type":"alert","message":"disk low","priority":3,"title":null}"#;
        assert_eq!(
            interpret(Category::Notification, raw).view,
            PayloadView::Notification {
                message: "disk low".to_string(),
                kind: "alert".to_string(),
            }
        );

        let raw = br#"{"text":"hola","confidence":0.8,"language":"es","audio_id":7}"#;
        let view = interpret(Category::Transcription, raw).view;
        assert!(matches!(view, PayloadView::Transcription { .. }));

        let raw = br#"{"task":{"id":991,"title":"Call Juan","priority":1}}"#;
        assert_eq!(
            interpret(Category::Task, raw).view,
            PayloadView::Task {
                title: "Call Juan".to_string(),
                priority: "1".to_string(),
            }
        );
    }

    #[test]
    fn test_shape_mismatch_falls_back_to_generic() {
        let raw = br#"{"text": "hi", "confidence": "high"}"#;
        let view = interpret(Category::Transcription, raw).view;
        assert!(matches!(view, PayloadView::Generic { .. }));
    }

    #[test]
    fn test_non_object_json_is_generic() {
        let view = interpret(Category::Status, b"42").view;
        assert_eq!(
            view,
            PayloadView::Generic {
                preview: "42".to_string()
            }
        );
    }

    #[test]
    fn test_task_fields_and_fallback() {
        let raw = br#"{"task": {"title": "Call Juan", "priority": "high"}}"#;
        assert_eq!(
            interpret(Category::Task, raw).view,
            PayloadView::Task {
                title: "Call Juan".to_string(),
                priority: "high".to_string(),
            }
        );

        let view = interpret(Category::Task, br#"{"title": "loose"}"#).view;
        assert!(matches!(view, PayloadView::Generic { .. }));
    }

    #[test]
    fn test_notification_defaults() {
        assert_eq!(
            interpret(Category::Notification, br#"{"message": "hello"}"#).view,
            PayloadView::Notification {
                message: "hello".to_string(),
                kind: "info".to_string(),
            }
        );
    }

    #[test]
    fn test_system_services() {
        let raw = br#"{"type": "service_health", "services": {"mqtt_broker": "healthy", "uptime": 3}}"#;
        assert_eq!(
            interpret(Category::System, raw).view,
            PayloadView::System {
                kind: "service_health".to_string(),
                services: vec![
                    ("mqtt_broker".to_string(), "healthy".to_string()),
                    ("uptime".to_string(), "3".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_interpretation_is_idempotent() {
        let raw = br#"{"emotions": {"joy": 0.75, "calm": 0.60}, "audio_id": "a"}"#;
        for category in Category::KNOWN {
            assert_eq!(interpret(category, raw), interpret(category, raw));
        }
    }

    #[test]
    fn test_truncate_display_multibyte() {
        assert_eq!(truncate_display("ñandú", 3), "ñan...");
        assert_eq!(truncate_display("ñandú", 5), "ñandú");
        assert_eq!(truncate_display("", 0), "");
    }
}

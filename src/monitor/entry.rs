//! Formatted output for one accepted message

use std::fmt;

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::classify::{CategoryDescriptor, Interpretation, PayloadView};

/// How a piece of a detail line is emphasised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    /// Main value of the line
    Strong,
    /// Quoted user content such as transcripts
    Quote,
    /// Decode failures
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::Plain,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::Strong,
        }
    }

    pub fn quote(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::Quote,
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::Alert,
        }
    }
}

/// One indented line under the entry header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub spans: Vec<Span>,
}

impl DetailLine {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }
}

impl fmt::Display for DetailLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for span in &self.spans {
            write!(f, "{}", span.text)?;
        }
        Ok(())
    }
}

/// Header plus detail lines for one message
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedEntry {
    pub timestamp: String,
    pub descriptor: &'static CategoryDescriptor,
    pub topic: String,
    pub details: Vec<DetailLine>,
    pub decode_failure: bool,
}

impl FormattedEntry {
    pub fn build(
        descriptor: &'static CategoryDescriptor,
        topic: &str,
        interpretation: &Interpretation,
        received_at: DateTime<Local>,
        verbose: bool,
    ) -> Self {
        let mut details = detail_lines(&interpretation.view);
        if verbose {
            if let Some(document) = &interpretation.document {
                details.extend(verbose_lines(document));
            }
        }

        FormattedEntry {
            timestamp: received_at.format("%H:%M:%S").to_string(),
            descriptor,
            topic: topic.to_string(),
            details,
            decode_failure: interpretation.is_decode_failure(),
        }
    }

    /// `<icon> <LABEL> [HH:MM:SS]`; the topic is rendered separately
    pub fn title(&self) -> String {
        format!(
            "{} {} [{}]",
            self.descriptor.icon, self.descriptor.label, self.timestamp
        )
    }

    pub fn header(&self) -> String {
        format!("{} ({})", self.title(), self.topic)
    }

    /// Uncolored rendering, one string per line
    pub fn plain_lines(&self) -> Vec<String> {
        std::iter::once(self.header())
            .chain(self.details.iter().map(|line| format!("   {}", line)))
            .collect()
    }
}

impl fmt::Display for FormattedEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.plain_lines().join("\n"))
    }
}

fn detail_lines(view: &PayloadView) -> Vec<DetailLine> {
    match view {
        PayloadView::Transcription {
            text,
            confidence,
            language,
        } => vec![
            DetailLine::new(vec![Span::plain("📝 "), Span::quote(text.clone())]),
            DetailLine::new(vec![Span::plain(format!(
                "🎯 Confidence: {:.2} | 🌍 Language: {}",
                confidence, language
            ))]),
        ],
        PayloadView::Status {
            status,
            progress,
            audio_id,
        } => vec![
            DetailLine::new(vec![
                Span::plain("⚡ Status: "),
                Span::strong(status.clone()),
                Span::plain(format!(" ({}%)", progress)),
            ]),
            DetailLine::new(vec![Span::plain(format!("🎵 Audio ID: {}", audio_id))]),
        ],
        PayloadView::Notification { message, kind } => vec![
            DetailLine::new(vec![Span::plain("📢 "), Span::strong(message.clone())]),
            DetailLine::new(vec![Span::plain(format!("🏷️  Type: {}", kind))]),
        ],
        PayloadView::Task { title, priority } => vec![
            DetailLine::new(vec![Span::plain("📋 "), Span::strong(title.clone())]),
            DetailLine::new(vec![Span::plain(format!("🔥 Priority: {}", priority))]),
        ],
        PayloadView::Emotion { primary, all } => {
            let scores = all
                .iter()
                .map(|e| format!("{} {:.2}", e.label, e.score))
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                DetailLine::new(vec![
                    Span::plain("😊 Primary emotion: "),
                    Span::strong(primary.label.clone()),
                    Span::plain(format!(" ({:.2})", primary.score)),
                ]),
                DetailLine::new(vec![Span::plain(format!("📊 All: {}", scores))]),
            ]
        }
        PayloadView::ClientApp { action, preview } => vec![
            DetailLine::new(vec![Span::plain("📱 Client action: "), Span::strong(action.clone())]),
            DetailLine::new(vec![Span::plain(format!("📦 Data: {}", preview))]),
        ],
        PayloadView::System { kind, services } => {
            let mut lines = vec![DetailLine::new(vec![
                Span::plain("🔧 Type: "),
                Span::strong(kind.clone()),
            ])];
            lines.extend(services.iter().map(|(name, state)| {
                DetailLine::new(vec![Span::plain(format!("   • {}: {}", name, state))])
            }));
            lines
        }
        PayloadView::Generic { preview } => preview_lines("📦 ", preview),
        PayloadView::Undecodable { preview } => vec![DetailLine::new(vec![
            Span::alert("❌ Not JSON: "),
            Span::plain(preview.clone()),
        ])],
    }
}

fn verbose_lines(document: &Value) -> Vec<DetailLine> {
    let pretty = serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
    preview_lines("🔍 Payload: ", &pretty)
}

// Multi-line previews keep their own indentation under the first line
fn preview_lines(prefix: &str, text: &str) -> Vec<DetailLine> {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                DetailLine::new(vec![Span::plain(format!("{}{}", prefix, line))])
            } else {
                DetailLine::new(vec![Span::plain(line.to_string())])
            }
        })
        .collect()
}

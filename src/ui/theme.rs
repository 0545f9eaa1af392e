//! Terminal color mapping

use crossterm::style::{style, Color, StyledContent, Stylize};

use crate::classify::Severity;
use crate::monitor::{Span, SpanStyle};

pub const BANNER: Color = Color::Magenta;
pub const SEPARATOR: Color = Color::Cyan;
pub const SUCCESS: Color = Color::Green;
pub const NOTICE: Color = Color::Yellow;
pub const FAILURE: Color = Color::Red;
pub const HIGHLIGHT: Color = Color::Cyan;

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Info => Color::Blue,
        Severity::Warning => Color::Yellow,
        Severity::Accent => Color::Cyan,
        Severity::Mood => Color::DarkMagenta,
        Severity::Critical => Color::Red,
    }
}

pub fn styled_span(span: &Span) -> StyledContent<&str> {
    let content = style(span.text.as_str());
    match span.style {
        SpanStyle::Plain => content,
        SpanStyle::Strong => content.bold(),
        SpanStyle::Quote => content.with(HIGHLIGHT),
        SpanStyle::Alert => content.with(FAILURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_colors_are_distinct_for_core_classes() {
        assert_ne!(
            severity_color(Severity::Success),
            severity_color(Severity::Critical)
        );
        assert_eq!(severity_color(Severity::Critical), FAILURE);
    }

    #[test]
    fn test_styled_span_keeps_text() {
        let span = Span::strong("transcribing");
        assert!(styled_span(&span).to_string().contains("transcribing"));
    }
}

//! Topic parsing
//!
//! Topics follow `<namespace>/<category>/<owner>`. Parsing never fails; how
//! many segments are present decides the classification further down.

/// Separator between topic levels
pub const TOPIC_SEPARATOR: char = '/';

/// A topic split into its levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPath {
    raw: String,
    segments: Vec<String>,
}

impl TopicPath {
    pub fn parse(topic: &str) -> Self {
        TopicPath {
            raw: topic.to_string(),
            segments: topic.split(TOPIC_SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Second level, present only when the topic has at least two segments
    pub fn category(&self) -> Option<&str> {
        self.segment(1)
    }

    /// Third level, identifies the user or session the message belongs to
    pub fn owner(&self) -> Option<&str> {
        self.segment(2)
    }

    /// Whether the topic carries enough levels to name a category
    pub fn is_well_formed(&self) -> bool {
        self.segments.len() >= 2
    }

    fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }
}

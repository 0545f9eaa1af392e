//! Category lookup
//!
//! Maps the category level of a topic to a fixed display descriptor. The
//! lookup is total: unknown tokens resolve to [`OTHER`], topics too short to
//! carry a category resolve to [`INVALID`].

use std::fmt;

use super::topic::TopicPath;

/// Message categories published by the assistant backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Transcription,
    Status,
    Notification,
    Task,
    Emotion,
    System,
    ClientApp,
    DiagnosticTest,
    /// Well-formed topic with a category nobody registered
    Other,
    /// Topic with fewer than two levels
    Invalid,
}

impl Category {
    /// All categories that have a topic token of their own
    pub const KNOWN: [Category; 8] = [
        Category::Transcription,
        Category::Status,
        Category::Notification,
        Category::Task,
        Category::Emotion,
        Category::System,
        Category::ClientApp,
        Category::DiagnosticTest,
    ];

    /// Topic token for this category
    pub fn token(self) -> &'static str {
        self.descriptor().name
    }

    pub fn descriptor(self) -> &'static CategoryDescriptor {
        match self {
            Category::Transcription => &TRANSCRIPTION,
            Category::Status => &STATUS,
            Category::Notification => &NOTIFICATION,
            Category::Task => &TASK,
            Category::Emotion => &EMOTION,
            Category::System => &SYSTEM,
            Category::ClientApp => &CLIENT_APP,
            Category::DiagnosticTest => &DIAGNOSTIC_TEST,
            Category::Other => &OTHER,
            Category::Invalid => &INVALID,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Category::Other | Category::Invalid)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Visual weight of a category, rendered as a terminal color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Accent,
    Mood,
    Critical,
}

/// Immutable display record for one category
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub category: Category,
    /// Topic token, e.g. `transcription`
    pub name: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub severity: Severity,
}

pub static TRANSCRIPTION: CategoryDescriptor = CategoryDescriptor {
    category: Category::Transcription,
    name: "transcription",
    label: "TRANSCRIPTION",
    icon: "🎙️",
    severity: Severity::Success,
};

pub static STATUS: CategoryDescriptor = CategoryDescriptor {
    category: Category::Status,
    name: "status",
    label: "STATUS",
    icon: "⚡",
    severity: Severity::Info,
};

pub static NOTIFICATION: CategoryDescriptor = CategoryDescriptor {
    category: Category::Notification,
    name: "notification",
    label: "NOTIFICATION",
    icon: "📢",
    severity: Severity::Warning,
};

pub static TASK: CategoryDescriptor = CategoryDescriptor {
    category: Category::Task,
    name: "task",
    label: "TASK",
    icon: "✅",
    severity: Severity::Accent,
};

pub static EMOTION: CategoryDescriptor = CategoryDescriptor {
    category: Category::Emotion,
    name: "emotion",
    label: "EMOTION",
    icon: "😊",
    severity: Severity::Mood,
};

pub static SYSTEM: CategoryDescriptor = CategoryDescriptor {
    category: Category::System,
    name: "system",
    label: "SYSTEM",
    icon: "🔧",
    severity: Severity::Critical,
};

// The mobile client publishes under the framework name
pub static CLIENT_APP: CategoryDescriptor = CategoryDescriptor {
    category: Category::ClientApp,
    name: "flutter",
    label: "CLIENT APP",
    icon: "📱",
    severity: Severity::Info,
};

pub static DIAGNOSTIC_TEST: CategoryDescriptor = CategoryDescriptor {
    category: Category::DiagnosticTest,
    name: "test",
    label: "TEST",
    icon: "🧪",
    severity: Severity::Warning,
};

pub static OTHER: CategoryDescriptor = CategoryDescriptor {
    category: Category::Other,
    name: "other",
    label: "OTHER",
    icon: "📡",
    severity: Severity::Accent,
};

pub static INVALID: CategoryDescriptor = CategoryDescriptor {
    category: Category::Invalid,
    name: "invalid",
    label: "INVALID",
    icon: "❓",
    severity: Severity::Critical,
};

/// Resolves a category token. Exact, case-sensitive match only.
pub fn classify_token(token: Option<&str>) -> &'static CategoryDescriptor {
    let Some(token) = token else {
        return &OTHER;
    };

    Category::KNOWN
        .iter()
        .map(|category| category.descriptor())
        .find(|descriptor| descriptor.name == token)
        .unwrap_or(&OTHER)
}

/// Resolves the descriptor for a parsed topic
pub fn classify(topic: &TopicPath) -> &'static CategoryDescriptor {
    if !topic.is_well_formed() {
        return &INVALID;
    }
    classify_token(topic.category())
}

//! Owner-based message filtering

use tracing::trace;

use super::topic::TopicPath;

/// Decides which messages reach the viewer
///
/// Without an owner the filter runs in wildcard mode and admits everything.
/// With an owner only topics whose owner level matches it exactly pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    owner: Option<String>,
}

impl SubscriptionFilter {
    pub fn wildcard() -> Self {
        Self { owner: None }
    }

    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }

    /// Empty owner strings are treated as wildcard mode
    pub fn from_option(owner: Option<String>) -> Self {
        match owner {
            Some(owner) if !owner.is_empty() => Self::for_owner(owner),
            _ => Self::wildcard(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn admits(&self, topic: &TopicPath) -> bool {
        let Some(expected) = self.owner.as_deref() else {
            return true;
        };

        let admitted = topic.owner() == Some(expected);
        if !admitted {
            trace!("Dropping {} (owner filter {})", topic.raw(), expected);
        }
        admitted
    }

    /// Broker subscription pattern for the given namespace
    pub fn subscription_pattern(&self, namespace: &str) -> String {
        match self.owner.as_deref() {
            Some(owner) => format!("{}/+/{}", namespace, owner),
            None => format!("{}/#", namespace),
        }
    }
}

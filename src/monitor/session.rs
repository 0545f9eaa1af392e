//! Monitoring session context
//!
//! Holds everything that outlives a single message: the owner filter, the
//! verbosity flag and the accepted-message counter. The session is owned by
//! the task that receives messages, so the counter is a plain integer.

use chrono::{DateTime, Local};
use tracing::debug;

use super::entry::FormattedEntry;
use crate::classify::{classify, interpret, SubscriptionFilter, TopicPath};

#[derive(Debug, Clone, Default)]
pub struct MonitorSession {
    filter: SubscriptionFilter,
    verbose: bool,
    accepted: u64,
    decode_failures: u64,
}

impl MonitorSession {
    pub fn new(filter: SubscriptionFilter, verbose: bool) -> Self {
        Self {
            filter,
            verbose,
            accepted: 0,
            decode_failures: 0,
        }
    }

    /// Messages that passed the filter so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    /// Runs one message through the pipeline, stamped with the current time
    pub fn process(&mut self, topic: &str, payload: &[u8]) -> Option<FormattedEntry> {
        self.process_at(topic, payload, Local::now())
    }

    /// Classify, filter, interpret, format.
    ///
    /// Returns `None` when the filter rejects the message; the counter only
    /// moves for admitted messages.
    pub fn process_at(
        &mut self,
        topic: &str,
        payload: &[u8],
        received_at: DateTime<Local>,
    ) -> Option<FormattedEntry> {
        let path = TopicPath::parse(topic);
        let descriptor = classify(&path);

        if !self.filter.admits(&path) {
            return None;
        }
        self.accepted += 1;

        let interpretation = interpret(descriptor.category, payload);
        if interpretation.is_decode_failure() {
            self.decode_failures += 1;
            debug!("Message #{} on {} is not JSON", self.accepted, topic);
        }

        Some(FormattedEntry::build(
            descriptor,
            topic,
            &interpretation,
            received_at,
            self.verbose,
        ))
    }
}

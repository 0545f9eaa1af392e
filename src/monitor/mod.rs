//! # Monitor
//!
//! Per-session processing of inbound messages. [`MonitorSession`] wraps the
//! classification pipeline with the state a viewer needs (filter, counter,
//! verbosity) and produces one [`FormattedEntry`] per admitted message.
//! Where the entries go is decided by an [`EntrySink`].

pub mod entry;
pub mod session;

pub use entry::{DetailLine, FormattedEntry, Span, SpanStyle};
pub use session::MonitorSession;

/// Destination for formatted entries
pub trait EntrySink {
    /// Writes one entry; `sequence` is the session's accepted count
    fn emit(&mut self, entry: &FormattedEntry, sequence: u64) -> std::io::Result<()>;
}

/// Keeps entries in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub entries: Vec<(u64, FormattedEntry)>,
}

impl EntrySink for CollectingSink {
    fn emit(&mut self, entry: &FormattedEntry, sequence: u64) -> std::io::Result<()> {
        self.entries.push((sequence, entry.clone()));
        Ok(())
    }
}

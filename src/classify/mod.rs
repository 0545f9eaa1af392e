//! # Message Classification
//!
//! Turns a raw `(topic, payload)` pair into something a human can scan.
//!
//! ```text
//! topic ──► TopicPath ──► CategoryDescriptor ──► SubscriptionFilter ──► interpret() ──► PayloadView
//!           (topic.rs)    (category.rs)          (filter.rs)            (payload.rs)
//! ```
//!
//! Every stage is total. Malformed topics classify as `INVALID`, unknown
//! categories as `OTHER`, and bodies that are not JSON become an
//! `Undecodable` view. Nothing here keeps state between messages; the
//! running counter lives in [`crate::monitor::MonitorSession`].

pub mod category;
pub mod filter;
pub mod payload;
pub mod topic;

pub use category::{classify, classify_token, Category, CategoryDescriptor, Severity};
pub use filter::SubscriptionFilter;
pub use payload::{interpret, Interpretation, PayloadView, ScoredEmotion};
pub use topic::TopicPath;

//! Proactive scheduling detection.
//!
//! Turns an ordered chat window into [`SchedulingThread`](crate::types::SchedulingThread)s:
//!
//! ```text
//! messages -> segmenter -> trigger candidates
//!          -> extractor (trigger text) + availability (neighbours)
//!          -> synthesizer -> ranked slots -> coordinator assembles threads
//! ```
//!
//! Everything here is synchronous and side-effect free apart from tracing.
//! Pattern and keyword tables are immutable data owned by the caller.

pub mod availability;
pub mod coordinator;
pub mod extractor;
pub mod patterns;
pub mod segmenter;
pub mod synthesizer;

pub use coordinator::SchedulingCoordinator;

/// Errors raised before detection starts.
///
/// Pattern resolution failures and unusable availability hints are absorbed
/// by the cascade and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// The requesting user id is blank.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// A message lacks a required field.
    #[error("message at index {index} is missing required field '{field}'")]
    MissingField {
        /// Window index of the offending message.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Message indices are not strictly increasing.
    #[error("message index {index} does not follow {previous}; window must be oldest first")]
    OutOfOrder {
        /// Index that broke the ordering.
        index: usize,
        /// Index seen before it.
        previous: usize,
    },
}

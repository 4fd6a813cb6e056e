//! Huddle: proactive scheduling detection for chat conversations.
//!
//! Scans a conversation window, finds every place participants are trying to
//! arrange a meeting, extracts exact or vague dates and times, and proposes
//! ranked meeting slots per thread.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod logging;
pub mod scheduling;
pub mod service;
pub mod types;

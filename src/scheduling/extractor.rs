//! Date/time extraction over a single message.
//!
//! Applies the [`PatternLibrary`] cascade: exact patterns, then vague
//! descriptors, then the "not mentioned" terminal. Pure functions of the
//! input text and the reference day.

use chrono::NaiveDate;
use tracing::trace;

use super::patterns::{PatternLibrary, VaguePattern};
use crate::types::{ResolvedValue, TemporalHint};

/// Date and time hints for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalExtraction {
    /// Date half.
    pub date: TemporalHint,
    /// Time half.
    pub time: TemporalHint,
}

impl TemporalExtraction {
    /// Whether either half resolved to a concrete value.
    pub fn any_specified(&self) -> bool {
        self.date.specified || self.time.specified
    }
}

/// Extract a date hint from `text`, resolving relative phrases against `today`.
///
/// A pattern whose resolver rejects the match (for example `2/31`) is
/// skipped and the cascade moves on to the next pattern.
pub fn extract_date(library: &PatternLibrary, text: &str, today: NaiveDate) -> TemporalHint {
    for pattern in library.exact_dates() {
        let Some(caps) = pattern.regex.captures(text) else {
            continue;
        };
        let matched = caps.get(0).map_or("", |m| m.as_str());
        match (pattern.resolve)(&caps, today) {
            Some(date) => {
                trace!(pattern = pattern.name, matched, %date, "date resolved");
                return TemporalHint::exact(ResolvedValue::Date(date), matched);
            }
            None => trace!(pattern = pattern.name, matched, "date match did not resolve"),
        }
    }

    first_vague(library.vague_dates(), text).unwrap_or_else(TemporalHint::not_mentioned)
}

/// Extract a time-of-day hint from `text`.
pub fn extract_time(library: &PatternLibrary, text: &str) -> TemporalHint {
    for pattern in library.exact_times() {
        let Some(caps) = pattern.regex.captures(text) else {
            continue;
        };
        let matched = caps.get(0).map_or("", |m| m.as_str());
        match (pattern.resolve)(&caps) {
            Some(time) => {
                trace!(pattern = pattern.name, matched, %time, "time resolved");
                return TemporalHint::exact(ResolvedValue::Time(time), matched.trim());
            }
            None => trace!(pattern = pattern.name, matched, "time match did not resolve"),
        }
    }

    first_vague(library.vague_times(), text).unwrap_or_else(TemporalHint::not_mentioned)
}

/// Run both cascades over the same text.
pub fn extract(library: &PatternLibrary, text: &str, today: NaiveDate) -> TemporalExtraction {
    TemporalExtraction {
        date: extract_date(library, text, today),
        time: extract_time(library, text),
    }
}

fn first_vague(patterns: &[VaguePattern], text: &str) -> Option<TemporalHint> {
    patterns.iter().find_map(|pattern| {
        pattern
            .regex
            .find(text)
            .map(|m| TemporalHint::vague(pattern.description, m.as_str(), pattern.suggested))
    })
}

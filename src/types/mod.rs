//! Core data model for scheduling detection.
//!
//! Every value here is created by a single coordinator run and never mutated
//! afterwards. All types serialize with serde so a [`SchedulingReport`] can be
//! written straight into a response body.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Description carried by a hint when nothing temporal was found.
pub const NOT_MENTIONED: &str = "not mentioned";

/// A chat message as delivered by the message source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Stable message identifier from the store.
    pub id: String,
    /// Position in the fetched window (oldest = 0).
    pub index: usize,
    /// Author of the message.
    pub sender_id: String,
    /// Text body.
    pub content: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
}

/// A concrete value recovered from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResolvedValue {
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
}

/// Result of running the date or time cascade over one piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalHint {
    /// True when a concrete value was resolved.
    pub specified: bool,
    /// The resolved value, present iff `specified`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedValue>,
    /// Matched fragment of the source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// True when only a descriptive (or no) reference exists.
    pub vague: bool,
    /// Human-readable label for vague hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fallback anchor for vague time descriptors ("morning" -> 10:00 AM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<NaiveTime>,
}

impl TemporalHint {
    /// Hint for an exact match.
    pub fn exact(value: ResolvedValue, original_text: &str) -> Self {
        Self {
            specified: true,
            resolved: Some(value),
            original_text: Some(original_text.to_owned()),
            vague: false,
            description: None,
            suggested_value: None,
        }
    }

    /// Hint for a vague descriptor such as "next week".
    pub fn vague(description: &str, original_text: &str, suggested: Option<NaiveTime>) -> Self {
        Self {
            specified: false,
            resolved: None,
            original_text: Some(original_text.to_owned()),
            vague: true,
            description: Some(description.to_owned()),
            suggested_value: suggested,
        }
    }

    /// Terminal hint when the text carries no temporal reference.
    pub fn not_mentioned() -> Self {
        Self {
            specified: false,
            resolved: None,
            original_text: None,
            vague: true,
            description: Some(NOT_MENTIONED.to_owned()),
            suggested_value: None,
        }
    }

    /// Resolved calendar date, if this hint carries one.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.resolved {
            Some(ResolvedValue::Date(d)) if self.specified => Some(d),
            _ => None,
        }
    }

    /// Resolved time of day, if this hint carries one.
    pub fn time(&self) -> Option<NaiveTime> {
        match self.resolved {
            Some(ResolvedValue::Time(t)) if self.specified => Some(t),
            _ => None,
        }
    }
}

/// Completeness of a thread's temporal information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Both date and time are known.
    Ready,
    /// Time known, date missing.
    NeedsDate,
    /// Date known, time missing.
    NeedsTime,
    /// Neither is known.
    NeedsBoth,
}

impl ThreadStatus {
    /// Derive the status from which halves were specified.
    pub fn from_specified(date_specified: bool, time_specified: bool) -> Self {
        match (date_specified, time_specified) {
            (true, true) => Self::Ready,
            (false, true) => Self::NeedsDate,
            (true, false) => Self::NeedsTime,
            (false, false) => Self::NeedsBoth,
        }
    }

    /// Whether the thread still needs user input.
    pub fn needs_action(self) -> bool {
        self != Self::Ready
    }
}

/// Ranked label attached to a suggested slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotQuality {
    /// First choice.
    Best,
    /// Second choice.
    Good,
    /// Third choice.
    Acceptable,
}

impl SlotQuality {
    /// Qualities in assignment order.
    pub const RANKED: [SlotQuality; 3] = [Self::Best, Self::Good, Self::Acceptable];
}

/// A candidate meeting slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotSuggestion {
    /// Calendar date of the slot.
    pub date: NaiveDate,
    /// Start time, e.g. "2:00 PM".
    pub start_time: String,
    /// End time, e.g. "2:30 PM".
    pub end_time: String,
    /// Rank of this slot within its thread.
    pub quality: SlotQuality,
    /// Why this slot was proposed.
    pub reason: String,
}

/// A secondary temporal signal found near a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityHint {
    /// Index of the message the hint came from.
    pub source_message_index: usize,
    /// Full text of that message.
    pub text: String,
    /// Date extracted from the message.
    pub date_info: TemporalHint,
    /// Time extracted from the message.
    pub time_info: TemporalHint,
}

/// One detected scheduling intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingThread {
    /// Deterministic identifier derived from the trigger message.
    pub id: String,
    /// Best-effort subject of the meeting.
    pub topic: String,
    /// Index of the message that opened the thread.
    pub trigger_message_index: usize,
    /// Text of that message.
    pub trigger_text: String,
    /// Date extracted from the trigger.
    pub date_info: TemporalHint,
    /// Time extracted from the trigger.
    pub time_info: TemporalHint,
    /// Nearby availability statements, in priority order.
    pub availability_hints: Vec<AvailabilityHint>,
    /// Completeness of the date/time information.
    pub status: ThreadStatus,
    /// Ranked slots, at most three.
    pub suggested_times: Vec<TimeSlotSuggestion>,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
    /// When the detection ran.
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts over a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of threads found.
    pub total_threads: usize,
    /// Threads whose status is not `ready`.
    pub needs_action: usize,
}

/// Response body for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingReport {
    /// Threads in chronological order.
    pub threads: Vec<SchedulingThread>,
    /// Aggregate counts.
    pub summary: ReportSummary,
}

impl SchedulingReport {
    /// Wrap threads and compute the summary.
    pub fn from_threads(threads: Vec<SchedulingThread>) -> Self {
        let needs_action = threads
            .iter()
            .filter(|t| t.status.needs_action())
            .count();
        let summary = ReportSummary {
            total_threads: threads.len(),
            needs_action,
        };
        Self { threads, summary }
    }
}

/// Format a time of day for display, e.g. `2:00 PM`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

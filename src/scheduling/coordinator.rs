//! Orchestration of one detection run.
//!
//! The coordinator validates the window, runs the segmenter once, and for
//! each trigger resolves hints, status, availability, suggestions,
//! confidence, and topic. It owns its configuration and pattern library;
//! nothing is shared mutably between runs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::patterns::PatternLibrary;
use super::segmenter::{self, TriggerCandidate};
use super::{availability, extractor, synthesizer, SchedulingError};
use crate::config::DetectorConfig;
use crate::types::{Message, SchedulingThread, ThreadStatus};

/// Topic used when nothing is left after stripping trigger phrases.
pub const FALLBACK_TOPIC: &str = "Meeting";

/// Runs the detection pipeline over message windows.
#[derive(Debug, Clone)]
pub struct SchedulingCoordinator {
    config: DetectorConfig,
    library: Arc<PatternLibrary>,
    topic_filter: Option<Regex>,
}

impl SchedulingCoordinator {
    /// Build a coordinator with its own compiled pattern library.
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_library(config, Arc::new(PatternLibrary::new()))
    }

    /// Build a coordinator sharing an already compiled library.
    pub fn with_library(config: DetectorConfig, library: Arc<PatternLibrary>) -> Self {
        let topic_filter = build_topic_filter(&config.trigger_keywords);
        Self {
            config,
            library,
            topic_filter,
        }
    }

    /// Detection settings in use.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Pattern library in use.
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Detect scheduling threads using the current time as reference.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError`] when the window or user id is malformed.
    pub fn run(
        &self,
        messages: &[Message],
        user_id: &str,
    ) -> Result<Vec<SchedulingThread>, SchedulingError> {
        self.run_at(messages, user_id, Utc::now())
    }

    /// Detect scheduling threads relative to `now`.
    ///
    /// An empty window yields an empty result. Threads come back in
    /// trigger order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError`] when the window or user id is malformed.
    pub fn run_at(
        &self,
        messages: &[Message],
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SchedulingThread>, SchedulingError> {
        validate_window(messages, user_id)?;
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let triggers = segmenter::segment(
            messages,
            &self.config.trigger_keywords,
            self.config.suppression_radius,
        );

        let threads: Vec<SchedulingThread> = triggers
            .into_iter()
            .map(|trigger| self.build_thread(messages, trigger, user_id, now))
            .collect();

        info!(
            user_id,
            messages = messages.len(),
            threads = threads.len(),
            "scheduling detection complete"
        );
        Ok(threads)
    }

    fn build_thread(
        &self,
        messages: &[Message],
        trigger: TriggerCandidate,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> SchedulingThread {
        let today = now.date_naive();
        let found = extractor::extract(&self.library, &trigger.text, today);
        let status = ThreadStatus::from_specified(found.date.specified, found.time.specified);

        let availability_hints = availability::scan_neighborhood(
            messages,
            trigger.index,
            self.config.neighborhood_radius,
            &self.config.availability_keywords,
            &self.library,
            today,
        );

        let duration = Duration::minutes(i64::from(self.config.default_duration_minutes));
        let suggested_times = synthesizer::synthesize(
            &found.date,
            &found.time,
            &availability_hints,
            Some(duration),
            today,
        );
        if suggested_times.is_empty() {
            warn!(index = trigger.index, "no suggestion strategy produced slots");
        }

        let message_id = messages
            .iter()
            .find(|m| m.index == trigger.index)
            .map_or("", |m| m.id.as_str());

        debug!(
            index = trigger.index,
            ?status,
            hints = availability_hints.len(),
            "thread assembled"
        );

        SchedulingThread {
            id: thread_id(user_id, message_id, trigger.index),
            topic: self.topic(&trigger.text),
            trigger_message_index: trigger.index,
            confidence: self.confidence(trigger.keyword_hits),
            trigger_text: trigger.text,
            date_info: found.date,
            time_info: found.time,
            availability_hints,
            status,
            suggested_times,
            created_at: now,
        }
    }

    /// Confidence for a number of keyword hits: floor plus a step per extra
    /// hit, capped.
    pub fn confidence(&self, keyword_hits: usize) -> f64 {
        let extra = u32::try_from(keyword_hits.saturating_sub(1)).unwrap_or(u32::MAX);
        let raw = self.config.confidence_floor + self.config.confidence_step * f64::from(extra);
        raw.min(self.config.confidence_cap)
            .max(self.config.confidence_floor)
    }

    /// Best-effort topic: trigger text minus trigger phrases, truncated.
    pub fn topic(&self, trigger_text: &str) -> String {
        let folded = segmenter::fold_apostrophes(trigger_text);
        let stripped = match &self.topic_filter {
            Some(filter) => filter.replace_all(&folded, " ").into_owned(),
            None => folded,
        };
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        let cleaned = collapsed.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());

        if cleaned.is_empty() {
            return FALLBACK_TOPIC.to_owned();
        }
        if cleaned.chars().count() <= self.config.topic_max_chars {
            return cleaned.to_owned();
        }
        let cut: String = cleaned.chars().take(self.config.topic_max_chars).collect();
        cut.trim_end().to_owned()
    }
}

/// Reject windows the pipeline cannot reason about.
fn validate_window(messages: &[Message], user_id: &str) -> Result<(), SchedulingError> {
    if user_id.trim().is_empty() {
        return Err(SchedulingError::EmptyUserId);
    }

    let mut previous: Option<usize> = None;
    for message in messages {
        if message.id.trim().is_empty() {
            return Err(SchedulingError::MissingField {
                index: message.index,
                field: "id",
            });
        }
        if message.sender_id.trim().is_empty() {
            return Err(SchedulingError::MissingField {
                index: message.index,
                field: "sender_id",
            });
        }
        if let Some(prev) = previous {
            if message.index <= prev {
                return Err(SchedulingError::OutOfOrder {
                    index: message.index,
                    previous: prev,
                });
            }
        }
        previous = Some(message.index);
    }
    Ok(())
}

/// Case-insensitive alternation of all trigger phrases, longest first.
fn build_topic_filter(keywords: &[String]) -> Option<Regex> {
    let mut phrases: Vec<String> = keywords
        .iter()
        .map(|k| segmenter::fold_apostrophes(k.trim()))
        .filter(|k| !k.is_empty())
        .collect();
    if phrases.is_empty() {
        return None;
    }
    phrases.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let alternation = phrases
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&format!("(?i){alternation}")) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "topic filter failed to compile, topics keep trigger phrases");
            None
        }
    }
}

/// Stable id: the same trigger message always yields the same thread id.
fn thread_id(user_id: &str, message_id: &str, index: usize) -> String {
    let name = format!("{user_id}:{message_id}:{index}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

//! Trigger detection and suppression.
//!
//! One linear pass over the window. A message opens a thread when its
//! lower-cased text contains a trigger phrase and no earlier trigger has
//! suppressed it. Accepting trigger `i` suppresses `[i - radius, i + radius]`.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use tracing::debug;

use crate::types::Message;

/// A message accepted as the opener of a scheduling thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerCandidate {
    /// Window index of the message.
    pub index: usize,
    /// Message text.
    pub text: String,
    /// Number of distinct trigger phrases found.
    pub keyword_hits: usize,
}

/// Replace typographic single quotes with `'`. Mobile keyboards send
/// U+2019 where the vocabulary uses an ASCII apostrophe.
pub fn fold_apostrophes(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}'], "'")
}

/// Lower-case with apostrophes folded; the form every keyword match uses.
pub fn normalize(text: &str) -> String {
    fold_apostrophes(text).to_lowercase()
}

/// Count distinct vocabulary phrases contained in already normalized text.
pub fn keyword_hits(normalized: &str, vocabulary: &[String]) -> usize {
    vocabulary
        .iter()
        .filter(|k| !k.is_empty() && normalized.contains(normalize(k).as_str()))
        .count()
}

/// Indices suppressed by a single trigger.
pub fn suppression_window(index: usize, radius: usize) -> RangeInclusive<usize> {
    index.saturating_sub(radius)..=index.saturating_add(radius)
}

/// Every index suppressed by `trigger_indices`, clamped to `[0, len)`.
pub fn suppressed_indices(trigger_indices: &[usize], radius: usize, len: usize) -> BTreeSet<usize> {
    trigger_indices
        .iter()
        .flat_map(|&i| suppression_window(i, radius))
        .filter(|&i| i < len)
        .collect()
}

/// Walk `messages` in order and return accepted triggers.
pub fn segment(messages: &[Message], vocabulary: &[String], radius: usize) -> Vec<TriggerCandidate> {
    let mut suppressed = BTreeSet::new();
    let mut triggers = Vec::new();

    for message in messages {
        if suppressed.contains(&message.index) {
            continue;
        }
        let hits = keyword_hits(&normalize(&message.content), vocabulary);
        if hits == 0 {
            continue;
        }

        debug!(index = message.index, hits, "trigger accepted");
        suppressed.extend(suppression_window(message.index, radius));
        triggers.push(TriggerCandidate {
            index: message.index,
            text: message.content.clone(),
            keyword_hits: hits,
        });
    }

    triggers
}

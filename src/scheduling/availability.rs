//! Availability statements near a trigger.
//!
//! Looks at the messages within `radius` of the trigger for availability
//! phrases ("free", "works for me", ...) and keeps those that resolve to a
//! concrete date or time. Output order is message order, which the
//! synthesizer treats as priority.

use chrono::NaiveDate;
use tracing::debug;

use super::extractor;
use super::patterns::PatternLibrary;
use super::segmenter::{keyword_hits, normalize};
use crate::types::{AvailabilityHint, Message};

/// Collect availability hints around `trigger_index`.
///
/// The trigger itself is excluded. Messages with availability wording but
/// nothing resolvable are dropped.
pub fn scan_neighborhood(
    messages: &[Message],
    trigger_index: usize,
    radius: usize,
    vocabulary: &[String],
    library: &PatternLibrary,
    today: NaiveDate,
) -> Vec<AvailabilityHint> {
    let low = trigger_index.saturating_sub(radius);
    let high = trigger_index.saturating_add(radius);

    messages
        .iter()
        .filter(|m| m.index != trigger_index && (low..=high).contains(&m.index))
        .filter(|m| keyword_hits(&normalize(&m.content), vocabulary) > 0)
        .filter_map(|m| {
            let found = extractor::extract(library, &m.content, today);
            if !found.any_specified() {
                debug!(index = m.index, "availability statement without a usable date or time");
                return None;
            }
            Some(AvailabilityHint {
                source_message_index: m.index,
                text: m.content.clone(),
                date_info: found.date,
                time_info: found.time,
            })
        })
        .collect()
}

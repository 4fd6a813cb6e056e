//! Ranked time-slot synthesis.
//!
//! Strategies are tried in order and the first one that produces slots wins;
//! results are never blended:
//! 1. hint-driven: nearby availability statements,
//! 2. anchor-driven: the trigger's own date or time, +/- two hours,
//! 3. default: three fixed slots over the coming days.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::types::{format_clock, AvailabilityHint, SlotQuality, TemporalHint, TimeSlotSuggestion};

/// Meeting length when the caller does not provide one.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Availability hints further out than this are treated as noise.
const MAX_LOOKAHEAD_DAYS: u64 = 366;

/// Longest quote of a source message placed in a slot reason.
const REASON_FRAGMENT_CHARS: usize = 40;

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    /// Trigger date hint.
    pub date_info: &'a TemporalHint,
    /// Trigger time hint.
    pub time_info: &'a TemporalHint,
    /// Availability hints in priority order.
    pub hints: &'a [AvailabilityHint],
    /// Slot length.
    pub duration: Duration,
    /// Reference day.
    pub today: NaiveDate,
}

/// A suggestion strategy; `None` hands over to the next one.
pub type Strategy = fn(&SynthesisInput<'_>) -> Option<Vec<TimeSlotSuggestion>>;

/// Strategies in evaluation order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("hint_driven", hint_driven),
    ("anchor_driven", anchor_driven),
    ("default", default_slots),
];

/// Produce up to three ranked slots.
///
/// `duration` defaults to thirty minutes and only affects `end_time`.
pub fn synthesize(
    date_info: &TemporalHint,
    time_info: &TemporalHint,
    hints: &[AvailabilityHint],
    duration: Option<Duration>,
    today: NaiveDate,
) -> Vec<TimeSlotSuggestion> {
    let input = SynthesisInput {
        date_info,
        time_info,
        hints,
        duration: duration.unwrap_or_else(|| Duration::minutes(DEFAULT_DURATION_MINUTES)),
        today,
    };

    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let slots = strategy(&input)?;
            debug!(strategy = *name, slots = slots.len(), "suggestions synthesized");
            Some(slots)
        })
        .unwrap_or_default()
}

/// One slot per usable availability hint, at most three.
pub fn hint_driven(input: &SynthesisInput<'_>) -> Option<Vec<TimeSlotSuggestion>> {
    let slots: Vec<TimeSlotSuggestion> = input
        .hints
        .iter()
        .filter(|hint| hint_in_range(hint, input.today))
        .take(SlotQuality::RANKED.len())
        .zip(SlotQuality::RANKED)
        .zip(1_u64..)
        .filter_map(|((hint, quality), rank)| {
            let date = match hint.date_info.date() {
                Some(date) => date,
                None => input.today.checked_add_days(Days::new(rank))?,
            };
            let time = hint
                .time_info
                .time()
                .or(hint.time_info.suggested_value)
                .unwrap_or_else(morning);
            let reason = format!("Suggested in chat: \"{}\"", fragment(&hint.text));
            Some(slot(date.and_time(time), input.duration, quality, reason))
        })
        .collect();

    if slots.is_empty() {
        None
    } else {
        Some(slots)
    }
}

/// Anchor on whatever the trigger specified and bracket it by two hours.
pub fn anchor_driven(input: &SynthesisInput<'_>) -> Option<Vec<TimeSlotSuggestion>> {
    if !input.date_info.specified && !input.time_info.specified {
        return None;
    }

    let date = match input.date_info.date() {
        Some(date) => date,
        None => input.today.checked_add_days(Days::new(3))?,
    };
    let time = input
        .time_info
        .time()
        .or(input.time_info.suggested_value)
        .unwrap_or_else(morning);

    let anchor = date.and_time(time);
    let later = anchor.checked_add_signed(Duration::hours(2))?;
    let earlier = anchor.checked_sub_signed(Duration::hours(2))?;

    Some(vec![
        slot(anchor, input.duration, SlotQuality::Best, "Requested time".to_owned()),
        slot(later, input.duration, SlotQuality::Good, "Two hours later".to_owned()),
        slot(earlier, input.duration, SlotQuality::Acceptable, "Two hours earlier".to_owned()),
    ])
}

/// Fixed fallback: tomorrow morning, day+3 afternoon, day+5 late afternoon.
pub fn default_slots(input: &SynthesisInput<'_>) -> Option<Vec<TimeSlotSuggestion>> {
    let plan = [
        (1, clock(10, 0), "Morning slot"),
        (3, clock(14, 0), "Afternoon slot"),
        (5, clock(16, 0), "Late afternoon"),
    ];

    plan.into_iter()
        .zip(SlotQuality::RANKED)
        .map(|((days, time, reason), quality)| {
            let date = input.today.checked_add_days(Days::new(days))?;
            Some(slot(date.and_time(time), input.duration, quality, reason.to_owned()))
        })
        .collect()
}

/// Explicit hint dates must fall between today and the lookahead horizon.
fn hint_in_range(hint: &AvailabilityHint, today: NaiveDate) -> bool {
    let Some(date) = hint.date_info.date() else {
        return true;
    };
    let horizon = today.checked_add_days(Days::new(MAX_LOOKAHEAD_DAYS));
    let in_range = date >= today && horizon.is_some_and(|h| date <= h);
    if !in_range {
        debug!(
            index = hint.source_message_index,
            %date,
            "skipping availability hint outside the scheduling horizon"
        );
    }
    in_range
}

fn slot(
    start: NaiveDateTime,
    duration: Duration,
    quality: SlotQuality,
    reason: String,
) -> TimeSlotSuggestion {
    let (end, _) = start.time().overflowing_add_signed(duration);
    TimeSlotSuggestion {
        date: start.date(),
        start_time: format_clock(start.time()),
        end_time: format_clock(end),
        quality,
        reason,
    }
}

fn fragment(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= REASON_FRAGMENT_CHARS {
        return trimmed.to_owned();
    }
    let cut: String = trimmed.chars().take(REASON_FRAGMENT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn morning() -> NaiveTime {
    clock(10, 0)
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

//! Ordered date and time recognizers.
//!
//! Each table is a priority list: the extractor walks it top-down and the
//! first pattern that both matches and resolves wins. Exact patterns always
//! precede vague ones. The tables are plain data compiled once into a
//! [`PatternLibrary`] owned by the caller.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use regex::{Captures, Regex};
use tracing::warn;

/// Phrases that open a scheduling thread.
pub const TRIGGER_KEYWORDS: &[&str] = &[
    "meeting",
    "meet up",
    "let's meet",
    "schedule",
    "sync",
    "catch up",
    "when can we",
    "when are you free",
    "get together",
    "hop on a call",
    "set up a call",
    "appointment",
];

/// Phrases that mark a statement of availability.
pub const AVAILABILITY_KEYWORDS: &[&str] = &[
    "available",
    "free",
    "works for me",
    "i can do",
    "i'm around",
    "open on",
    "good for me",
];

/// Resolves a date match against the reference day.
pub type DateResolver = fn(&Captures<'_>, NaiveDate) -> Option<NaiveDate>;

/// Resolves a time-of-day match.
pub type TimeResolver = fn(&Captures<'_>) -> Option<NaiveTime>;

/// An exact date recognizer.
#[derive(Debug, Clone)]
pub struct DatePattern {
    /// Short identifier used in logs.
    pub name: &'static str,
    /// Compiled matcher.
    pub regex: Regex,
    /// Turns a match into a date; `None` means the match is discarded.
    pub resolve: DateResolver,
}

/// An exact time recognizer.
#[derive(Debug, Clone)]
pub struct TimePattern {
    /// Short identifier used in logs.
    pub name: &'static str,
    /// Compiled matcher.
    pub regex: Regex,
    /// Turns a match into a time; `None` means the match is discarded.
    pub resolve: TimeResolver,
}

/// A descriptor with no concrete value.
#[derive(Debug, Clone)]
pub struct VaguePattern {
    /// Label reported in the hint.
    pub description: &'static str,
    /// Compiled matcher.
    pub regex: Regex,
    /// Anchor used by the synthesizer as a last resort.
    pub suggested: Option<NaiveTime>,
}

/// Compiled pattern tables in priority order.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    exact_dates: Vec<DatePattern>,
    vague_dates: Vec<VaguePattern>,
    exact_times: Vec<TimePattern>,
    vague_times: Vec<VaguePattern>,
}

impl PatternLibrary {
    /// Compile the built-in tables.
    pub fn new() -> Self {
        Self {
            exact_dates: compile(EXACT_DATE_TABLE, |name, regex, resolve| DatePattern {
                name,
                regex,
                resolve,
            }),
            vague_dates: compile_vague(VAGUE_DATE_TABLE),
            exact_times: compile(EXACT_TIME_TABLE, |name, regex, resolve| TimePattern {
                name,
                regex,
                resolve,
            }),
            vague_times: compile_vague(VAGUE_TIME_TABLE),
        }
    }

    /// Exact date patterns, highest priority first.
    pub fn exact_dates(&self) -> &[DatePattern] {
        &self.exact_dates
    }

    /// Vague date descriptors, highest priority first.
    pub fn vague_dates(&self) -> &[VaguePattern] {
        &self.vague_dates
    }

    /// Exact time patterns, highest priority first.
    pub fn exact_times(&self) -> &[TimePattern] {
        &self.exact_times
    }

    /// Vague time descriptors, highest priority first.
    pub fn vague_times(&self) -> &[VaguePattern] {
        &self.vague_times
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn compile<R: Copy, P>(
    table: &[(&'static str, &str, R)],
    build: impl Fn(&'static str, Regex, R) -> P,
) -> Vec<P> {
    table
        .iter()
        .filter_map(|&(name, pattern, resolve)| match Regex::new(pattern) {
            Ok(regex) => Some(build(name, regex, resolve)),
            Err(e) => {
                warn!(pattern = %name, error = %e, "dropping pattern that failed to compile");
                None
            }
        })
        .collect()
}

fn compile_vague(table: &[(&'static str, &str, Option<(u32, u32)>)]) -> Vec<VaguePattern> {
    table
        .iter()
        .filter_map(|&(description, pattern, suggested)| match Regex::new(pattern) {
            Ok(regex) => Some(VaguePattern {
                description,
                regex,
                suggested: suggested.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            }),
            Err(e) => {
                warn!(pattern = %description, error = %e, "dropping pattern that failed to compile");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const EXACT_DATE_TABLE: &[(&str, &str, DateResolver)] = &[
    ("day_after_tomorrow", r"(?i)\bday after tomorrow\b", resolve_day_after_tomorrow),
    ("tomorrow", r"(?i)\b(?:tomorrow|tmrw|tmr)\b", resolve_tomorrow),
    ("today", r"(?i)\b(?:today|tonight)\b", resolve_today),
    (
        "month_day",
        concat!(
            r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)",
            r"\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b"
        ),
        resolve_month_day,
    ),
    (
        "day_month",
        // "may" doubles as a verb ("2 may work"), so it needs "2nd may" or "2 of may".
        concat!(
            r"(?i)\b(\d{1,2})(?:",
            r"(?:st|nd|rd|th)?\s+(?:of\s+)?",
            r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)",
            r"|(?:(?:st|nd|rd|th)\s+(?:of\s+)?|\s+of\s+)(may)",
            r")\b"
        ),
        resolve_day_month,
    ),
    ("iso", r"\b(\d{4})-(\d{2})-(\d{2})\b", resolve_iso),
    ("slash", r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b", resolve_slash),
    (
        "next_weekday",
        r"(?i)\bnext\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        resolve_next_weekday,
    ),
    (
        "weekday",
        r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        resolve_weekday,
    ),
    ("in_days", r"(?i)\bin\s+(\d{1,3})\s+days?\b", resolve_in_days),
];

const VAGUE_DATE_TABLE: &[(&str, &str, Option<(u32, u32)>)] = &[
    ("next week", r"(?i)\bnext\s+week\b", None),
    ("this week", r"(?i)\bthis\s+week\b", None),
    ("this weekend", r"(?i)\b(?:this|the)\s+weekend\b", None),
    ("next month", r"(?i)\bnext\s+month\b", None),
    ("later this month", r"(?i)\blater\s+this\s+month\b", None),
];

const EXACT_TIME_TABLE: &[(&str, &str, TimeResolver)] = &[
    (
        "twelve_hour",
        r"(?i)\b(\d{1,2})(?::([0-5]\d))?\s*(am\b|pm\b|a\.m\.?|p\.m\.?)",
        resolve_twelve_hour,
    ),
    ("twenty_four_hour", r"\b([01]?\d|2[0-3]):([0-5]\d)\b", resolve_twenty_four_hour),
    ("noon_midnight", r"(?i)\b(noon|midnight)\b", resolve_noon_midnight),
    ("at_hour", r"(?i)\bat\s+(\d{1,2})\b", resolve_bare_hour),
];

const VAGUE_TIME_TABLE: &[(&str, &str, Option<(u32, u32)>)] = &[
    ("morning", r"(?i)\bmorning\b", Some((10, 0))),
    ("lunch", r"(?i)\blunch(?:time)?\b", Some((12, 0))),
    ("afternoon", r"(?i)\bafternoon\b", Some((14, 0))),
    ("end of day", r"(?i)\b(?:end of (?:the )?day|eod)\b", Some((17, 0))),
    ("evening", r"(?i)\bevening\b", Some((18, 0))),
    ("tonight", r"(?i)\btonight\b", Some((19, 0))),
];

// ---------------------------------------------------------------------------
// Date resolvers
// ---------------------------------------------------------------------------

fn resolve_day_after_tomorrow(_caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(2))
}

fn resolve_tomorrow(_caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(1))
}

fn resolve_today(_caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    Some(today)
}

fn resolve_month_day(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let month = month_number(caps.get(1)?.as_str())?;
    let day = caps.get(2)?.as_str().parse().ok()?;
    roll_forward(month, day, today)
}

fn resolve_day_month(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = month_number(caps.get(2).or_else(|| caps.get(3))?.as_str())?;
    roll_forward(month, day, today)
}

fn resolve_iso(caps: &Captures<'_>, _today: NaiveDate) -> Option<NaiveDate> {
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let day = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn resolve_slash(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let month = caps.get(1)?.as_str().parse().ok()?;
    let day = caps.get(2)?.as_str().parse().ok()?;
    match caps.get(3) {
        Some(year) => {
            let raw: i32 = year.as_str().parse().ok()?;
            let year = if year.as_str().len() == 2 {
                raw.checked_add(2000)?
            } else {
                raw
            };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        None => roll_forward(month, day, today),
    }
}

fn resolve_next_weekday(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let target: Weekday = caps.get(1)?.as_str().parse().ok()?;
    let upcoming = upcoming_weekday(today, target)?;
    if upcoming.iso_week() == today.iso_week() {
        upcoming.checked_add_days(Days::new(7))
    } else {
        Some(upcoming)
    }
}

fn resolve_weekday(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let target: Weekday = caps.get(1)?.as_str().parse().ok()?;
    upcoming_weekday(today, target)
}

fn resolve_in_days(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let days: u64 = caps.get(1)?.as_str().parse().ok()?;
    if days == 0 || days > 365 {
        return None;
    }
    today.checked_add_days(Days::new(days))
}

/// Next occurrence of `target` strictly after `today` (1 to 7 days ahead).
pub fn upcoming_weekday(today: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let from = today.weekday().num_days_from_monday();
    let to = target.num_days_from_monday();
    let ahead = if to > from {
        to.saturating_sub(from)
    } else {
        7_u32.saturating_sub(from.saturating_sub(to))
    };
    today.checked_add_days(Days::new(u64::from(ahead)))
}

/// Month/day in the reference year, or the following year if already past.
fn roll_forward(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if candidate < today {
        NaiveDate::from_ymd_opt(today.year().checked_add(1)?, month, day)
    } else {
        Some(candidate)
    }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

// ---------------------------------------------------------------------------
// Time resolvers
// ---------------------------------------------------------------------------

fn resolve_twelve_hour(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = caps
        .get(3)?
        .as_str()
        .to_ascii_lowercase()
        .starts_with('p');
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h.checked_add(12)?,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn resolve_twenty_four_hour(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour = caps.get(1)?.as_str().parse().ok()?;
    let minute = caps.get(2)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn resolve_noon_midnight(caps: &Captures<'_>) -> Option<NaiveTime> {
    match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "noon" => NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => NaiveTime::from_hms_opt(0, 0, 0),
        _ => None,
    }
}

/// "at 3" carries no meridiem: 1-6 reads as afternoon, 7-11 as morning.
fn resolve_bare_hour(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let hour = match hour {
        1..=6 => hour.checked_add(12)?,
        7..=23 => hour,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

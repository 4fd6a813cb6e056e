//! End-to-end detection runs through the coordinator.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use huddle::config::DetectorConfig;
use huddle::scheduling::coordinator::FALLBACK_TOPIC;
use huddle::scheduling::{SchedulingCoordinator, SchedulingError};
use huddle::types::{Message, SchedulingReport, SlotQuality, ThreadStatus};

/// Friday, 2026-10-16, 09:00 UTC.
fn now() -> DateTime<Utc> {
    "2026-10-16T09:00:00Z".parse().expect("valid timestamp")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn message(index: usize, sender: &str, content: &str) -> Message {
    Message {
        id: format!("m{index}"),
        index,
        sender_id: sender.to_owned(),
        content: content.to_owned(),
        timestamp: now(),
    }
}

fn window(texts: &[&str]) -> Vec<Message> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| message(i, if i % 2 == 0 { "alice" } else { "bob" }, text))
        .collect()
}

fn coordinator() -> SchedulingCoordinator {
    SchedulingCoordinator::new(DetectorConfig::default())
}

// ---------- documented scenarios ----------

#[test]
fn exact_date_and_time_make_a_ready_thread() {
    let threads = coordinator()
        .run_at(&window(&["Let's sync tomorrow at 2pm"]), "u1", now())
        .expect("valid window");

    assert_eq!(threads.len(), 1);
    let thread = &threads[0];
    assert!(thread.date_info.specified);
    assert_eq!(thread.date_info.date(), Some(date(2026, 10, 17)));
    assert!(thread.time_info.specified);
    assert_eq!(thread.time_info.time(), NaiveTime::from_hms_opt(14, 0, 0));
    assert_eq!(thread.status, ThreadStatus::Ready);

    let starts: Vec<&str> = thread
        .suggested_times
        .iter()
        .map(|s| s.start_time.as_str())
        .collect();
    assert_eq!(starts, ["2:00 PM", "4:00 PM", "12:00 PM"]);
    assert_eq!(thread.suggested_times[0].end_time, "2:30 PM");
    assert_eq!(thread.suggested_times[0].reason, "Requested time");
}

#[test]
fn vague_intent_gets_default_slots() {
    let threads = coordinator()
        .run_at(&window(&["We should catch up sometime"]), "u1", now())
        .expect("valid window");

    assert_eq!(threads.len(), 1);
    let thread = &threads[0];
    assert!(!thread.date_info.specified);
    assert!(thread.date_info.vague);
    assert!(!thread.time_info.specified);
    assert_eq!(thread.status, ThreadStatus::NeedsBoth);

    let slots: Vec<(NaiveDate, &str)> = thread
        .suggested_times
        .iter()
        .map(|s| (s.date, s.start_time.as_str()))
        .collect();
    assert_eq!(
        slots,
        [
            (date(2026, 10, 17), "10:00 AM"),
            (date(2026, 10, 19), "2:00 PM"),
            (date(2026, 10, 21), "4:00 PM"),
        ]
    );
}

#[test]
fn nearby_availability_feeds_the_single_thread() {
    let messages = window(&[
        "let's meet next week",
        "sounds good",
        "I'm free Tuesday at 10am",
    ]);
    let threads = coordinator().run_at(&messages, "u1", now()).expect("valid window");

    assert_eq!(threads.len(), 1);
    let thread = &threads[0];
    assert_eq!(thread.date_info.description.as_deref(), Some("next week"));
    assert_eq!(thread.status, ThreadStatus::NeedsBoth);

    assert_eq!(thread.availability_hints.len(), 1);
    let hint = &thread.availability_hints[0];
    assert_eq!(hint.source_message_index, 2);
    assert_eq!(hint.date_info.date(), Some(date(2026, 10, 20)));

    let best = &thread.suggested_times[0];
    assert_eq!(best.quality, SlotQuality::Best);
    assert_eq!(best.date, date(2026, 10, 20));
    assert_eq!(best.start_time, "10:00 AM");
    assert!(best.reason.starts_with("Suggested in chat"));
}

#[test]
fn empty_window_is_not_an_error() {
    let threads = coordinator().run_at(&[], "u1", now()).expect("empty is fine");
    assert!(threads.is_empty());
}

#[test]
fn keyword_without_time_information_sits_at_the_floor() {
    let threads = coordinator()
        .run_at(&window(&["Can we set up a call?"]), "u1", now())
        .expect("valid window");

    assert_eq!(threads.len(), 1);
    let thread = &threads[0];
    assert_eq!(thread.status, ThreadStatus::NeedsBoth);
    assert!(thread.availability_hints.is_empty());
    assert_eq!(thread.suggested_times.len(), 3);
    assert!((thread.confidence - 0.5).abs() < f64::EPSILON);
}

// ---------- properties ----------

#[test]
fn runs_are_deterministic_for_a_fixed_clock() {
    let messages = window(&[
        "let's meet next week",
        "I'm free Tuesday at 10am",
        "ok",
        "ok",
        "schedule the retro for friday afternoon",
    ]);
    let c = coordinator();
    let first = c.run_at(&messages, "u1", now()).expect("valid window");
    let second = c.run_at(&messages, "u1", now()).expect("valid window");
    assert_eq!(first, second);
}

#[test]
fn triggers_inside_the_suppression_window_do_not_open_threads() {
    let messages = window(&[
        "let's meet on monday",
        "or schedule it for tuesday?",
        "sync whenever",
        "also, catch up on the roadmap?",
    ]);
    let threads = coordinator().run_at(&messages, "u1", now()).expect("valid window");

    let indices: Vec<usize> = threads.iter().map(|t| t.trigger_message_index).collect();
    assert_eq!(indices, [0, 3]);
    for pair in indices.windows(2) {
        assert!(pair[1].saturating_sub(pair[0]) > 2);
    }
}

#[test]
fn status_always_matches_specified_flags() {
    let messages = window(&[
        "sync tomorrow",
        "x",
        "x",
        "meeting at 3pm",
        "x",
        "x",
        "catch up soon",
        "x",
        "x",
        "schedule it on 11/3 at 9:30",
    ]);
    let threads = coordinator().run_at(&messages, "u1", now()).expect("valid window");

    let statuses: Vec<ThreadStatus> = threads.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        [
            ThreadStatus::NeedsTime,
            ThreadStatus::NeedsDate,
            ThreadStatus::NeedsBoth,
            ThreadStatus::Ready,
        ]
    );
    for thread in &threads {
        assert_eq!(
            thread.status,
            ThreadStatus::from_specified(thread.date_info.specified, thread.time_info.specified)
        );
        assert!(thread.suggested_times.len() <= 3);
        assert!((0.0..=1.0).contains(&thread.confidence));
    }
}

#[test]
fn suggestion_qualities_follow_rank_order() {
    let threads = coordinator()
        .run_at(&window(&["meeting at 3pm"]), "u1", now())
        .expect("valid window");
    let qualities: Vec<SlotQuality> = threads[0]
        .suggested_times
        .iter()
        .map(|s| s.quality)
        .collect();
    assert_eq!(qualities, SlotQuality::RANKED);
}

#[test]
fn time_only_trigger_anchors_three_days_out() {
    let threads = coordinator()
        .run_at(&window(&["meeting at 3pm"]), "u1", now())
        .expect("valid window");
    let thread = &threads[0];
    assert_eq!(thread.status, ThreadStatus::NeedsDate);
    assert_eq!(thread.suggested_times[0].date, date(2026, 10, 19));
    assert_eq!(thread.suggested_times[0].start_time, "3:00 PM");
}

#[test]
fn earlier_anchor_slot_crosses_midnight_backwards() {
    let threads = coordinator()
        .run_at(&window(&["sync tomorrow at 1am"]), "u1", now())
        .expect("valid window");
    let earlier = &threads[0].suggested_times[2];
    assert_eq!(earlier.date, date(2026, 10, 16));
    assert_eq!(earlier.start_time, "11:00 PM");
}

#[test]
fn confidence_grows_with_keyword_hits() {
    let threads = coordinator()
        .run_at(&window(&["Let's meet to schedule a sync"]), "u1", now())
        .expect("valid window");
    assert!((threads[0].confidence - 0.8).abs() < 1e-9);
}

#[test]
fn topic_drops_trigger_phrases() {
    let threads = coordinator()
        .run_at(
            &window(&["Let's meet about the launch plan", "x", "x", "sync?"]),
            "u1",
            now(),
        )
        .expect("valid window");
    assert_eq!(threads[0].topic, "about the launch plan");
    assert_eq!(threads[1].topic, FALLBACK_TOPIC);
}

#[test]
fn thread_ids_depend_on_user_and_message() {
    let messages = window(&["sync tomorrow"]);
    let c = coordinator();
    let a = c.run_at(&messages, "u1", now()).expect("valid window");
    let b = c.run_at(&messages, "u2", now()).expect("valid window");
    assert_ne!(a[0].id, b[0].id);
    assert!(uuid::Uuid::parse_str(&a[0].id).is_ok());
}

#[test]
fn report_summary_counts_threads_needing_action() {
    let messages = window(&["sync tomorrow at 2pm", "x", "x", "catch up sometime"]);
    let threads = coordinator().run_at(&messages, "u1", now()).expect("valid window");
    let report = SchedulingReport::from_threads(threads);
    assert_eq!(report.summary.total_threads, 2);
    assert_eq!(report.summary.needs_action, 1);
}

#[test]
fn custom_vocabulary_replaces_defaults() {
    let config = DetectorConfig {
        trigger_keywords: vec!["huddle".to_owned()],
        ..DetectorConfig::default()
    };
    let c = SchedulingCoordinator::new(config);
    let threads = c
        .run_at(&window(&["let's meet tomorrow", "x", "x", "huddle at noon"]), "u1", now())
        .expect("valid window");
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].trigger_message_index, 3);
    assert_eq!(threads[0].time_info.time(), NaiveTime::from_hms_opt(12, 0, 0));
}

#[test]
fn curly_apostrophes_open_a_ready_thread() {
    let messages = window(&[
        "Let\u{2019}s meet tomorrow at 2pm",
        "I\u{2019}m around friday at 9am",
    ]);
    let threads = coordinator().run_at(&messages, "u1", now()).expect("valid window");

    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].status, ThreadStatus::Ready);
    assert_eq!(threads[0].topic, "tomorrow at 2pm");
    assert_eq!(threads[0].availability_hints.len(), 1);
}

// ---------- input validation ----------

#[test]
fn blank_user_id_is_rejected() {
    let result = coordinator().run_at(&window(&["sync"]), "  ", now());
    assert!(matches!(result, Err(SchedulingError::EmptyUserId)));
}

#[test]
fn missing_sender_is_rejected() {
    let mut messages = window(&["sync"]);
    messages[0].sender_id = String::new();
    let result = coordinator().run_at(&messages, "u1", now());
    assert!(matches!(
        result,
        Err(SchedulingError::MissingField {
            index: 0,
            field: "sender_id"
        })
    ));
}

#[test]
fn unordered_window_is_rejected() {
    let messages = vec![message(1, "alice", "sync"), message(0, "bob", "ok")];
    let result = coordinator().run_at(&messages, "u1", now());
    assert!(matches!(
        result,
        Err(SchedulingError::OutOfOrder {
            index: 0,
            previous: 1
        })
    ));
}

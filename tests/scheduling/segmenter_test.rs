//! Trigger detection and the suppression window.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use huddle::scheduling::patterns::TRIGGER_KEYWORDS;
use huddle::scheduling::segmenter::{keyword_hits, segment, suppressed_indices, suppression_window};
use huddle::types::Message;

fn vocabulary() -> Vec<String> {
    TRIGGER_KEYWORDS.iter().map(|k| (*k).to_owned()).collect()
}

fn window(texts: &[&str]) -> Vec<Message> {
    let timestamp: DateTime<Utc> = "2026-10-16T09:00:00Z".parse().expect("valid timestamp");
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| Message {
            id: format!("m{index}"),
            index,
            sender_id: "alice".to_owned(),
            content: (*text).to_owned(),
            timestamp,
        })
        .collect()
}

#[test]
fn keyword_hits_count_distinct_phrases() {
    let vocab = vocabulary();
    assert_eq!(keyword_hits("let's meet to schedule a sync", &vocab), 3);
    assert_eq!(keyword_hits("sync sync sync", &vocab), 1);
    assert_eq!(keyword_hits("nothing to see", &vocab), 0);
}

#[test]
fn window_bounds_saturate() {
    assert_eq!(suppression_window(10, 0), 10..=10);
    assert_eq!(suppression_window(usize::MAX, 3), usize::MAX.saturating_sub(3)..=usize::MAX);
}

#[test]
fn suppressed_set_is_clamped_to_window_length() {
    let set = suppressed_indices(&[5], 2, 6);
    assert_eq!(set, BTreeSet::from([3, 4, 5]));
}

#[test]
fn suppressed_set_is_the_union_of_windows() {
    for (triggers, radius, len) in [
        (vec![0_usize, 7], 2_usize, 12_usize),
        (vec![3, 4], 1, 6),
        (vec![], 3, 5),
        (vec![9], 0, 10),
    ] {
        let set = suppressed_indices(&triggers, radius, len);
        for i in 0..len {
            let expected = triggers
                .iter()
                .any(|&t| i >= t.saturating_sub(radius) && i <= t.saturating_add(radius));
            assert_eq!(set.contains(&i), expected, "index {i} of {triggers:?}");
        }
        assert!(set.iter().all(|&i| i < len));
    }
}

#[test]
fn accepted_triggers_are_further_apart_than_the_radius() {
    let messages = window(&[
        "let's meet",
        "sync?",
        "schedule it",
        "catch up?",
        "meeting",
        "ok",
        "ok",
        "appointment at 3",
    ]);
    let radius = 2;
    let triggers = segment(&messages, &vocabulary(), radius);
    let indices: Vec<usize> = triggers.iter().map(|t| t.index).collect();
    assert_eq!(indices, [0, 3, 7]);
    for pair in indices.windows(2) {
        assert!(pair[1].saturating_sub(pair[0]) > radius);
    }
}

#[test]
fn zero_radius_accepts_every_trigger() {
    let messages = window(&["sync", "sync", "hello", "sync"]);
    let triggers = segment(&messages, &vocabulary(), 0);
    let indices: Vec<usize> = triggers.iter().map(|t| t.index).collect();
    assert_eq!(indices, [0, 1, 3]);
}

#[test]
fn matching_ignores_case() {
    let messages = window(&["LET'S MEET SOON"]);
    let triggers = segment(&messages, &vocabulary(), 2);
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].text, "LET'S MEET SOON");
    assert_eq!(triggers[0].keyword_hits, 1);
}

#[test]
fn segmentation_follows_message_indices() {
    // windows fetched with a limit may not start at zero
    let mut messages = window(&["sync", "ok", "ok", "sync"]);
    for (offset, message) in messages.iter_mut().enumerate() {
        message.index = offset.saturating_add(40);
    }
    let triggers = segment(&messages, &vocabulary(), 2);
    let indices: Vec<usize> = triggers.iter().map(|t| t.index).collect();
    assert_eq!(indices, [40, 43]);
}

#[test]
fn typographic_apostrophes_still_trigger() {
    let messages = window(&[
        "Let\u{2019}s meet tomorrow at 2pm",
        "ok",
        "ok",
        "When\u{2019}s good? let\u{2018}s meet",
    ]);
    let triggers = segment(&messages, &vocabulary(), 2);
    let indices: Vec<usize> = triggers.iter().map(|t| t.index).collect();
    assert_eq!(indices, [0, 3]);
    assert_eq!(triggers[0].text, "Let\u{2019}s meet tomorrow at 2pm");
}

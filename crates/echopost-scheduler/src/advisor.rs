//! Best-time-to-post heuristics.
//!
//! This is explicitly best-effort: with no analytics integration, average
//! word count per slot stands in for engagement. Given the same history
//! the output is deterministic, and a user with little or no history gets
//! a static list of general best-practice slots rather than an error or an
//! empty answer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Timelike};
use serde::Serialize;
use tracing::warn;

use echopost_store::{HistoricalPost, PostStore};

/// Minimum history size before we trust the user's own patterns.
pub const MIN_HISTORY: usize = 5;

/// How much history to pull from the store.
const HISTORY_LIMIT: u32 = 100;

/// How many top days and hours are combined into candidate slots.
const TOP_DAYS: usize = 2;
const TOP_HOURS: usize = 3;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A recommended posting slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostingSlot {
    /// Day of week, 0 = Monday through 6 = Sunday.
    pub day_of_week: u8,
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Human-readable label, e.g. "Tuesday at 09:00".
    pub label: String,
    /// Why this slot was suggested.
    pub reason: String,
    /// 0.0-1.0, scaled by sample size for history-based slots.
    pub confidence: f64,
}

fn slot(day_of_week: u8, hour: u32, reason: &str, confidence: f64) -> PostingSlot {
    PostingSlot {
        day_of_week,
        hour,
        label: format!("{} at {:02}:00", DAY_NAMES[day_of_week as usize], hour),
        reason: reason.to_string(),
        confidence,
    }
}

/// Static fallback slots from LinkedIn posting folklore, used whenever a
/// user's history is too thin to analyze.
pub fn default_slots() -> Vec<PostingSlot> {
    vec![
        slot(1, 9, "peak LinkedIn activity (general best practice)", 0.7),
        slot(2, 10, "high mid-week engagement", 0.7),
        slot(3, 14, "good visibility after lunch", 0.6),
        slot(1, 17, "professionals checking in after hours", 0.6),
        slot(4, 11, "engagement before the weekend", 0.5),
    ]
}

/// Rank `(key, count, mean engagement)` groups by engagement descending,
/// key ascending as tie-break so equal means order deterministically.
fn ranked<K: Copy + Ord>(groups: HashMap<K, (u32, u64)>) -> Vec<(K, u32, f64)> {
    let mut entries: Vec<(K, u32, f64)> = groups
        .into_iter()
        .map(|(key, (count, total))| (key, count, total as f64 / f64::from(count)))
        .collect();
    entries.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));
    entries
}

/// Pure slot ranking over a posting history. Deterministic given the same
/// input.
pub fn rank_slots(history: &[HistoricalPost], top_n: usize) -> Vec<PostingSlot> {
    if history.len() < MIN_HISTORY {
        let mut slots = default_slots();
        slots.truncate(top_n);
        return slots;
    }

    let mut day_groups: HashMap<u8, (u32, u64)> = HashMap::new();
    let mut hour_groups: HashMap<u32, (u32, u64)> = HashMap::new();

    for post in history {
        let day = post.created_at.weekday().num_days_from_monday() as u8;
        let hour = post.created_at.hour();
        let engagement = u64::from(post.word_count);

        let d = day_groups.entry(day).or_default();
        d.0 += 1;
        d.1 += engagement;

        let h = hour_groups.entry(hour).or_default();
        h.0 += 1;
        h.1 += engagement;
    }

    let best_days = ranked(day_groups);
    let best_hours = ranked(hour_groups);

    let mut slots = Vec::new();
    for (day, day_count, _) in best_days.iter().take(TOP_DAYS) {
        for (hour, _, _) in best_hours.iter().take(TOP_HOURS) {
            slots.push(PostingSlot {
                day_of_week: *day,
                hour: *hour,
                label: format!("{} at {:02}:00", DAY_NAMES[*day as usize], hour),
                reason: format!("based on {day_count} of your posts with strong engagement"),
                confidence: (f64::from(*day_count) / 10.0).min(1.0),
            });
        }
    }

    slots.truncate(top_n);
    slots
}

/// Advisor bound to a store; fetches a user's history and ranks it.
pub struct BestTimeAdvisor<S> {
    store: Arc<S>,
}

impl<S: PostStore> BestTimeAdvisor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Recommend up to `top_n` posting slots for a user. Never fails: a
    /// store error or thin history falls back to the static list.
    pub async fn recommend(&self, user_id: &str, top_n: usize) -> Vec<PostingSlot> {
        match self.store.list_historical_posts(user_id, HISTORY_LIMIT).await {
            Ok(history) => rank_slots(&history, top_n),
            Err(e) => {
                warn!(user_id, error = %e, "failed to load posting history; using defaults");
                let mut slots = default_slots();
                slots.truncate(top_n);
                slots
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn post_at(t: DateTime<Utc>, word_count: u32) -> HistoricalPost {
        HistoricalPost {
            created_at: t,
            word_count,
        }
    }

    /// 2026-01-05 was a Monday.
    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_thin_history_returns_defaults() {
        let history = vec![post_at(monday(), 100), post_at(monday(), 200)];
        let slots = rank_slots(&history, 5);
        assert_eq!(slots, default_slots());
    }

    #[test]
    fn test_empty_history_not_empty_output() {
        let slots = rank_slots(&[], 5);
        assert!(!slots.is_empty());
    }

    #[test]
    fn test_defaults_truncated_to_top_n() {
        let slots = rank_slots(&[], 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].label, "Tuesday at 09:00");
    }

    #[test]
    fn test_best_day_and_hour_win() {
        // Three wordy Monday 09:00 posts, three terse Wednesday 15:00 ones.
        let wednesday = monday() + Duration::days(2) + Duration::hours(6);
        let history = vec![
            post_at(monday(), 500),
            post_at(monday() + Duration::weeks(1), 500),
            post_at(monday() + Duration::weeks(2), 500),
            post_at(wednesday, 10),
            post_at(wednesday + Duration::weeks(1), 10),
            post_at(wednesday + Duration::weeks(2), 10),
        ];

        let slots = rank_slots(&history, 6);
        assert_eq!(slots[0].day_of_week, 0);
        assert_eq!(slots[0].hour, 9);
        assert_eq!(slots[0].label, "Monday at 09:00");
    }

    #[test]
    fn test_confidence_scales_with_sample_and_caps() {
        let history: Vec<HistoricalPost> = (0..30)
            .map(|i| post_at(monday() + Duration::weeks(i), 100))
            .collect();

        let slots = rank_slots(&history, 1);
        assert_eq!(slots[0].confidence, 1.0);

        let small: Vec<HistoricalPost> = (0..6)
            .map(|i| post_at(monday() + Duration::weeks(i), 100))
            .collect();
        let slots = rank_slots(&small, 1);
        assert!((slots[0].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_slot_count_is_days_times_hours() {
        // Posts spread over 3 days and 4 hours; candidates cap at 2x3.
        let mut history = Vec::new();
        for day in 0..3 {
            for hour in 0..4 {
                history.push(post_at(
                    monday() + Duration::days(day) + Duration::hours(hour),
                    100 + (day * 4 + hour) as u32,
                ));
            }
        }
        let slots = rank_slots(&history, 100);
        assert_eq!(slots.len(), 6);
    }

    proptest! {
        // Determinism: identical history in, identical slots out.
        #[test]
        fn recommendations_deterministic(
            raw in prop::collection::vec((0i64..100_000_000, 0u32..2000), 0..40),
            top_n in 1usize..10,
        ) {
            let history: Vec<HistoricalPost> = raw
                .iter()
                .map(|(secs, wc)| post_at(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + Duration::seconds(*secs),
                    *wc,
                ))
                .collect();

            let a = rank_slots(&history, top_n);
            let b = rank_slots(&history, top_n);
            prop_assert_eq!(a, b);
        }

        // Never empty, never over budget, confidence always in range.
        #[test]
        fn recommendations_well_formed(
            raw in prop::collection::vec((0i64..100_000_000, 0u32..2000), 0..40),
            top_n in 1usize..10,
        ) {
            let history: Vec<HistoricalPost> = raw
                .iter()
                .map(|(secs, wc)| post_at(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + Duration::seconds(*secs),
                    *wc,
                ))
                .collect();

            let slots = rank_slots(&history, top_n);
            prop_assert!(!slots.is_empty());
            prop_assert!(slots.len() <= top_n);
            for slot in &slots {
                prop_assert!(slot.day_of_week < 7);
                prop_assert!(slot.hour < 24);
                prop_assert!((0.0..=1.0).contains(&slot.confidence));
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::clock::{DAY_IN_MILLIS, YEAR_IN_DAYS};

/// Number of dialog shows recorded on one calendar day of one bucketing year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowBucket {
    /// Day within the bucketing year, `0..365`.
    pub day_in_year: u16,
    /// 365-day year index counted from the day the dialog was first shown.
    pub year_index: u32,
    /// Shows recorded on that day.
    pub count: u32,
}

/// Per-day dialog show counts, bucketed by 365-day years since the dialog was first
/// shown.
///
/// Only the current and prior year buckets are retained; together they are enough to
/// answer a trailing-365-day count at any instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowHistory {
    buckets: Vec<ShowBucket>,
}

impl ShowHistory {
    /// Empty history: the dialog has never been shown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the persisted form. A snapshot that fails to parse is treated as
    /// "history unknown" and replaced with an empty one; prompt cadence is not
    /// safety-critical, so the recovery is deliberately lossy.
    pub fn decode(encoded: &str) -> Self {
        serde_json::from_str(encoded).unwrap_or_default()
    }

    /// Encode for persistence. Round-trips exactly through [`ShowHistory::decode`].
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Record one show at `elapsed_ms` since the dialog was first shown, pruning
    /// buckets that fell out of the two-year retention window.
    pub fn record(&mut self, elapsed_ms: i64) {
        let (day_in_year, year_index) = bucket_coords(elapsed_ms);
        self.buckets.retain(|b| b.year_index + 1 >= year_index);
        match self
            .buckets
            .iter_mut()
            .find(|b| b.day_in_year == day_in_year && b.year_index == year_index)
        {
            Some(bucket) => bucket.count += 1,
            None => self.buckets.push(ShowBucket {
                day_in_year,
                year_index,
                count: 1,
            }),
        }
    }

    /// Shows within the trailing 365 days as of `elapsed_ms` since first shown.
    ///
    /// The prior-year bucket contributes only days at or past the current day of
    /// year, which slides the window instead of resetting it each bucketing year.
    pub fn trailing_year_count(&self, elapsed_ms: i64) -> u32 {
        let (today, year) = bucket_coords(elapsed_ms);
        self.buckets
            .iter()
            .filter(|b| {
                b.year_index == year
                    || (year > 0 && b.year_index == year - 1 && b.day_in_year >= today)
            })
            .map(|b| b.count)
            .sum()
    }

    /// Retained buckets, oldest first within insertion order.
    pub fn buckets(&self) -> &[ShowBucket] {
        &self.buckets
    }
}

// Clock rollbacks below the first-shown instant clamp to day zero.
fn bucket_coords(elapsed_ms: i64) -> (u16, u32) {
    let day_index = (elapsed_ms / DAY_IN_MILLIS).max(0);
    let year_index = (day_index / YEAR_IN_DAYS) as u32;
    let day_in_year = (day_index % YEAR_IN_DAYS) as u16;
    (day_in_year, year_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_day_shows_accumulate() {
        let mut history = ShowHistory::new();
        for _ in 0..4 {
            history.record(5 * DAY_IN_MILLIS);
        }
        assert_eq!(history.trailing_year_count(5 * DAY_IN_MILLIS), 4);
        assert_eq!(history.buckets().len(), 1);
    }

    #[test]
    fn window_slides_instead_of_resetting() {
        let mut history = ShowHistory::new();
        history.record(0);
        // 366 days later the day-0 bucket sits exactly one day outside the window.
        assert_eq!(history.trailing_year_count(366 * DAY_IN_MILLIS), 0);
        history.record(366 * DAY_IN_MILLIS);
        assert_eq!(history.trailing_year_count(366 * DAY_IN_MILLIS), 1);
    }

    #[test]
    fn prior_year_days_at_or_past_today_still_count() {
        let mut history = ShowHistory::new();
        history.record(100 * DAY_IN_MILLIS);
        // Day 465 = year 1, day 100: the year-0 day-100 bucket is exactly 365 days
        // old and remains inside the trailing window.
        assert_eq!(history.trailing_year_count(465 * DAY_IN_MILLIS), 1);
        assert_eq!(history.trailing_year_count(466 * DAY_IN_MILLIS), 0);
    }

    #[test]
    fn buckets_two_years_old_are_pruned() {
        let mut history = ShowHistory::new();
        history.record(0);
        history.record(800 * DAY_IN_MILLIS);
        assert!(history
            .buckets()
            .iter()
            .all(|b| b.year_index + 1 >= 2));
    }

    #[test]
    fn encode_decode_round_trips() {
        let mut history = ShowHistory::new();
        history.record(3 * DAY_IN_MILLIS);
        history.record(3 * DAY_IN_MILLIS);
        history.record(400 * DAY_IN_MILLIS);
        let decoded = ShowHistory::decode(&history.encode().unwrap());
        assert_eq!(decoded, history);
        assert_eq!(
            decoded.trailing_year_count(400 * DAY_IN_MILLIS),
            history.trailing_year_count(400 * DAY_IN_MILLIS)
        );
    }

    #[test]
    fn corrupt_snapshot_decodes_as_empty() {
        let history = ShowHistory::decode("{not json");
        assert!(history.buckets().is_empty());
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Thresholds the eligibility evaluator combines into a show/no-show decision.
///
/// Immutable for the evaluator's lifetime: construct once, share by reference. The
/// defaults match the behavior most hosts want out of the box (prompt after ten days
/// and ten launches, re-prompt no more than daily).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePolicy {
    /// Days the app must have been installed before the dialog may appear.
    pub min_install_age_days: u16,
    /// Launches required before the dialog may appear.
    pub min_launch_count: u32,
    /// Show only on launches whose count is a multiple of this value. A value of 0
    /// permanently disables the dialog; this is intentional, as the only way to
    /// express "never remind by launch count".
    pub remind_every_n_launches: u32,
    /// Days that must pass after "remind me later" before the dialog may reappear.
    pub min_days_since_last_remind: u16,
    /// Required count per named custom event; counters that were never written
    /// read as 0.
    pub min_custom_event_counts: BTreeMap<String, u32>,
    /// Cap on dialog displays within the trailing 365 days. `None` is unlimited.
    pub max_shows_per_year: Option<u32>,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            min_install_age_days: 10,
            min_launch_count: 10,
            remind_every_n_launches: 1,
            min_days_since_last_remind: 1,
            min_custom_event_counts: BTreeMap::new(),
            max_shows_per_year: None,
        }
    }
}

impl RatePolicy {
    /// Policy with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the app to have been installed for at least `days` days.
    pub fn with_min_install_age_days(mut self, days: u16) -> Self {
        self.min_install_age_days = days;
        self
    }

    /// Require at least `launches` recorded launches.
    pub fn with_min_launch_count(mut self, launches: u32) -> Self {
        self.min_launch_count = launches;
        self
    }

    /// Show only every `launches`-th launch; 0 disables the dialog permanently.
    pub fn with_remind_every_n_launches(mut self, launches: u32) -> Self {
        self.remind_every_n_launches = launches;
        self
    }

    /// Wait at least `days` days after a "remind me later" choice.
    pub fn with_min_days_since_last_remind(mut self, days: u16) -> Self {
        self.min_days_since_last_remind = days;
        self
    }

    /// Require a named custom event to have been recorded at least `count` times.
    pub fn with_min_event_count(mut self, event: impl Into<String>, count: u32) -> Self {
        self.min_custom_event_counts.insert(event.into(), count);
        self
    }

    /// Cap dialog displays within any trailing 365-day window.
    pub fn with_max_shows_per_year(mut self, cap: u32) -> Self {
        self.max_shows_per_year = Some(cap);
        self
    }
}

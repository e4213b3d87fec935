use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::errors::StorageError;
use crate::history::ShowHistory;
use crate::storage::{PrefValue, PreferenceStore};

const KEY_INSTALL_TIMESTAMP: &str = "install_timestamp";
const KEY_LAUNCH_COUNT: &str = "launch_count";
const KEY_DIALOG_FIRST_SHOWN: &str = "dialog_first_shown_timestamp";
const KEY_ROLLING_SHOW_HISTORY: &str = "rolling_show_history";
const KEY_AGREED_OR_DECLINED: &str = "agreed_or_declined";
const KEY_LAST_REMINDER: &str = "last_reminder_timestamp";
const KEY_REMIND_LAUNCH_COUNT: &str = "remind_launch_count_at_last_reminder";
// Prefix keeps caller-defined event names from clashing with the fixed keys above.
const CUSTOM_EVENT_PREFIX: &str = "custom_event:";

/// Durable usage counters feeding the eligibility decision.
///
/// Constructed once at application start with an injected store and clock, then
/// passed by reference to the evaluator and the recording call sites. Entries are
/// created lazily: a counter that was never written reads as its default. Each
/// operation is applied as one atomic commit to the underlying store.
#[derive(Debug)]
pub struct UsageLedger<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: PreferenceStore> UsageLedger<S, SystemClock> {
    /// Ledger over the given store, timed by the system wall clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: PreferenceStore, C: Clock> UsageLedger<S, C> {
    /// Ledger over the given store and clock. Tests inject a simulated clock here.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Current time according to the injected clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// First-run initialization: stamps the install time, counts the first launch,
    /// and resets the dialog history. Idempotent on every later call.
    pub fn record_first_launch_if_needed(&mut self) -> Result<(), StorageError> {
        if self.install_timestamp()? != 0 {
            return Ok(());
        }
        let now = self.clock.now_ms();
        let empty_history = ShowHistory::new().encode()?;
        self.store.put_all(vec![
            (KEY_INSTALL_TIMESTAMP.to_owned(), PrefValue::Int(now)),
            (KEY_LAUNCH_COUNT.to_owned(), PrefValue::Int(1)),
            (KEY_DIALOG_FIRST_SHOWN.to_owned(), PrefValue::Int(0)),
            (KEY_ROLLING_SHOW_HISTORY.to_owned(), PrefValue::Text(empty_history)),
        ])?;
        debug!(install_timestamp = now, "first launch recorded");
        Ok(())
    }

    /// Count one app start.
    pub fn record_launch(&mut self) -> Result<(), StorageError> {
        let next = self.launch_count()?.saturating_add(1);
        self.store.put(KEY_LAUNCH_COUNT, PrefValue::Int(i64::from(next)))
    }

    /// Install timestamp in epoch ms; 0 until the first launch is recorded.
    pub fn install_timestamp(&self) -> Result<i64, StorageError> {
        self.store.get_i64(KEY_INSTALL_TIMESTAMP)
    }

    /// Launches recorded so far. Monotonically non-decreasing.
    pub fn launch_count(&self) -> Result<u32, StorageError> {
        self.store.get_count(KEY_LAUNCH_COUNT)
    }

    /// Current count of a caller-defined event; 0 when never recorded.
    pub fn custom_event_count(&self, event: &str) -> Result<u32, StorageError> {
        self.store.get_count(&event_key(event))
    }

    /// Overwrite the count of a caller-defined event.
    pub fn set_custom_event_count(&mut self, event: &str, count: u32) -> Result<(), StorageError> {
        self.store.put(&event_key(event), PrefValue::Int(i64::from(count)))
    }

    /// Count one occurrence of a caller-defined event.
    pub fn increment_custom_event_count(&mut self, event: &str) -> Result<(), StorageError> {
        let next = self.custom_event_count(event)?.saturating_add(1);
        self.set_custom_event_count(event, next)
    }

    /// Epoch ms when the dialog was first ever displayed; 0 means never.
    pub fn dialog_first_shown_timestamp(&self) -> Result<i64, StorageError> {
        self.store.get_i64(KEY_DIALOG_FIRST_SHOWN)
    }

    /// Record that the dialog was actually displayed, bucketing the show into the
    /// rolling per-day history.
    pub fn record_dialog_shown(&mut self) -> Result<(), StorageError> {
        let now = self.clock.now_ms();
        let mut first_shown = self.dialog_first_shown_timestamp()?;
        let mut entries = Vec::new();
        if first_shown == 0 {
            first_shown = now;
            entries.push((KEY_DIALOG_FIRST_SHOWN.to_owned(), PrefValue::Int(now)));
        }
        let mut history = self.show_history()?;
        history.record(now - first_shown);
        entries.push((
            KEY_ROLLING_SHOW_HISTORY.to_owned(),
            PrefValue::Text(history.encode()?),
        ));
        self.store.put_all(entries)
    }

    /// Dialog displays within the trailing 365 days.
    pub fn rolling_show_count(&self) -> Result<u32, StorageError> {
        let first_shown = self.dialog_first_shown_timestamp()?;
        if first_shown == 0 {
            return Ok(0);
        }
        let elapsed = self.clock.now_ms() - first_shown;
        Ok(self.show_history()?.trailing_year_count(elapsed))
    }

    /// True once the user made a final choice (rate now / never); suppresses all
    /// future prompts.
    pub fn is_agreed_or_declined(&self) -> Result<bool, StorageError> {
        self.store.get_bool(KEY_AGREED_OR_DECLINED)
    }

    /// Record or revoke the user's final choice.
    pub fn mark_agreed_or_declined(&mut self, value: bool) -> Result<(), StorageError> {
        self.store.put(KEY_AGREED_OR_DECLINED, PrefValue::Bool(value))
    }

    /// Epoch ms of the last "remind me later" choice; 0 when never chosen.
    pub fn last_reminder_timestamp(&self) -> Result<i64, StorageError> {
        self.store.get_i64(KEY_LAST_REMINDER)
    }

    /// Launch count snapshot taken at the last "remind me later" choice.
    pub fn remind_launch_count_at_last_reminder(&self) -> Result<u32, StorageError> {
        self.store.get_count(KEY_REMIND_LAUNCH_COUNT)
    }

    /// Record a "remind me later" choice: stamps the reminder cooldown and snapshots
    /// the launch count it happened at.
    pub fn record_remind_later(&mut self) -> Result<(), StorageError> {
        let now = self.clock.now_ms();
        let launches = self.launch_count()?;
        debug!(last_reminder = now, "remind-later recorded");
        self.store.put_all(vec![
            (KEY_LAST_REMINDER.to_owned(), PrefValue::Int(now)),
            (KEY_REMIND_LAUNCH_COUNT.to_owned(), PrefValue::Int(i64::from(launches))),
        ])
    }

    /// Clear the entire namespace back to defaults.
    pub fn reset_all(&mut self) -> Result<(), StorageError> {
        self.store.clear()
    }

    fn show_history(&self) -> Result<ShowHistory, StorageError> {
        Ok(match self.store.get_string(KEY_ROLLING_SHOW_HISTORY)? {
            Some(encoded) => ShowHistory::decode(&encoded),
            None => ShowHistory::new(),
        })
    }
}

fn event_key(event: &str) -> String {
    format!("{CUSTOM_EVENT_PREFIX}{event}")
}

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::catalog::StoreKind;
use crate::clock::{Clock, SystemClock};
use crate::errors::{ResolveError, StorageError};
use crate::evaluator::should_show_dialog;
use crate::ledger::UsageLedger;
use crate::policy::RatePolicy;
use crate::resolver::{resolve_destinations, Destination};
use crate::storage::PreferenceStore;

/// Choice the user made on the rating dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateChoice {
    /// Open the store listing and stop prompting.
    RateNow,
    /// Ask again after the reminder cooldown.
    RemindLater,
    /// Never prompt again.
    Never,
}

/// Facade wiring the ledger, evaluator, catalog, and resolver together.
///
/// Construct once at application start with an injected store; the dialog widget,
/// theming, and lifecycle hooks stay with the host. The host calls [`monitor`] on
/// every launch, [`should_show_dialog`] when it reaches a natural prompt point,
/// [`record_dialog_shown`] when the dialog actually appears, and [`apply_choice`]
/// with the button the user pressed.
///
/// [`monitor`]: RatePrompt::monitor
/// [`should_show_dialog`]: RatePrompt::should_show_dialog
/// [`record_dialog_shown`]: RatePrompt::record_dialog_shown
/// [`apply_choice`]: RatePrompt::apply_choice
#[derive(Debug)]
pub struct RatePrompt<S, C = SystemClock> {
    ledger: UsageLedger<S, C>,
    policy: RatePolicy,
    store_kind: StoreKind,
    target_param: String,
    debug_force_show: bool,
}

impl<S: PreferenceStore> RatePrompt<S, SystemClock> {
    /// Prompt controller over the given store, timed by the system wall clock.
    /// `target_param` is the package name (or application id for Apple and
    /// BlackBerry) the store listing points at.
    pub fn new(store: S, store_kind: StoreKind, target_param: impl Into<String>) -> Self {
        Self::with_clock(store, SystemClock, store_kind, target_param)
    }
}

impl<S: PreferenceStore, C: Clock> RatePrompt<S, C> {
    /// Prompt controller with an injected clock. Tests simulate time through it.
    pub fn with_clock(
        store: S,
        clock: C,
        store_kind: StoreKind,
        target_param: impl Into<String>,
    ) -> Self {
        Self {
            ledger: UsageLedger::with_clock(store, clock),
            policy: RatePolicy::default(),
            store_kind,
            target_param: target_param.into(),
            debug_force_show: false,
        }
    }

    /// Replace the default policy.
    pub fn with_policy(mut self, policy: RatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Force [`RatePrompt::should_show_dialog`] to `true`, bypassing every
    /// eligibility check. For development builds.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug_force_show = debug;
        self
    }

    /// Count this app start: first-run initialization on the first call, a launch
    /// increment on every later one. Call once per launch.
    pub fn monitor(&mut self) -> Result<(), StorageError> {
        if self.ledger.install_timestamp()? == 0 {
            self.ledger.record_first_launch_if_needed()
        } else {
            self.ledger.record_launch()
        }
    }

    /// Whether the host should show the rating dialog now.
    pub fn should_show_dialog(&self) -> Result<bool, StorageError> {
        if self.debug_force_show {
            debug!("debug override forces the rating dialog");
            return Ok(true);
        }
        should_show_dialog(&self.ledger, &self.policy, self.ledger.now_ms())
    }

    /// Record that the dialog was actually displayed.
    pub fn record_dialog_shown(&mut self) -> Result<(), StorageError> {
        self.ledger.record_dialog_shown()
    }

    /// Apply the button the user pressed.
    ///
    /// `RateNow` suppresses future prompts and returns the ordered destination list
    /// to attempt; when resolution legitimately yields nothing (store client not
    /// installed, no web fallback) the choice still sticks and `None` signals the
    /// host to skip the store-open action. `RemindLater` stamps the reminder
    /// cooldown; `Never` suppresses future prompts.
    pub fn apply_choice(
        &mut self,
        choice: RateChoice,
        installed_packages: &BTreeSet<String>,
    ) -> Result<Option<Vec<Destination>>, StorageError> {
        match choice {
            RateChoice::RateNow => {
                self.ledger.mark_agreed_or_declined(true)?;
                match self.destinations(installed_packages) {
                    Ok(destinations) => Ok(Some(destinations)),
                    Err(ResolveError::NoDestinationAvailable(kind)) => {
                        warn!(store = %kind, "rating accepted but no store destination is available");
                        Ok(None)
                    }
                }
            }
            RateChoice::RemindLater => {
                self.ledger.record_remind_later()?;
                Ok(None)
            }
            RateChoice::Never => {
                self.ledger.mark_agreed_or_declined(true)?;
                Ok(None)
            }
        }
    }

    /// Resolve the destination list without touching the ledger, for hosts that
    /// build the store-open action eagerly.
    pub fn destinations(
        &self,
        installed_packages: &BTreeSet<String>,
    ) -> Result<Vec<Destination>, ResolveError> {
        resolve_destinations(self.store_kind, &self.target_param, installed_packages)
    }

    /// Count one occurrence of a caller-defined event.
    pub fn increment_event(&mut self, event: &str) -> Result<(), StorageError> {
        self.ledger.increment_custom_event_count(event)
    }

    /// Overwrite the count of a caller-defined event.
    pub fn set_event_count(&mut self, event: &str, count: u32) -> Result<(), StorageError> {
        self.ledger.set_custom_event_count(event, count)
    }

    /// Clear every persisted counter back to defaults.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.ledger.reset_all()
    }

    /// The underlying ledger, for hosts that need the raw counters.
    pub fn ledger(&self) -> &UsageLedger<S, C> {
        &self.ledger
    }

    /// The active policy.
    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }
}

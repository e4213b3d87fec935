use crate::clock::{Clock, DAY_IN_MILLIS};
use crate::errors::StorageError;
use crate::ledger::UsageLedger;
use crate::policy::RatePolicy;
use crate::storage::PreferenceStore;

/// Decide whether the rating dialog should be shown at `now_ms`.
///
/// Pure with respect to the ledger: only reads, never writes, regardless of
/// outcome. Predicates run in a fixed order and the first failure wins. The debug
/// override that forces a show lives with the caller, not here.
pub fn should_show_dialog<S: PreferenceStore, C: Clock>(
    ledger: &UsageLedger<S, C>,
    policy: &RatePolicy,
    now_ms: i64,
) -> Result<bool, StorageError> {
    if ledger.is_agreed_or_declined()? {
        return Ok(false);
    }

    let launch_count = ledger.launch_count()?;
    if launch_count < policy.min_launch_count {
        return Ok(false);
    }

    // 0 disables the dialog outright: no launch count matches a zero-length cycle.
    if policy.remind_every_n_launches == 0
        || launch_count % policy.remind_every_n_launches != 0
    {
        return Ok(false);
    }

    let install_age_ms = now_ms - ledger.install_timestamp()?;
    if install_age_ms < i64::from(policy.min_install_age_days) * DAY_IN_MILLIS {
        return Ok(false);
    }

    // A reminder that was never set passes the cooldown check trivially.
    let last_reminder = ledger.last_reminder_timestamp()?;
    if last_reminder != 0
        && now_ms - last_reminder < i64::from(policy.min_days_since_last_remind) * DAY_IN_MILLIS
    {
        return Ok(false);
    }

    for (event, required) in &policy.min_custom_event_counts {
        if ledger.custom_event_count(event)? < *required {
            return Ok(false);
        }
    }

    if let Some(cap) = policy.max_shows_per_year {
        if ledger.rolling_show_count()? >= cap {
            return Ok(false);
        }
    }

    Ok(true)
}

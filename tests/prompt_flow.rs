use std::collections::BTreeSet;

use rate_prompt::{
    FixedClock, JsonFileStore, MemoryStore, RateChoice, RatePolicy, RatePrompt, StoreKind,
};
use tempfile::tempdir;

fn lenient_policy() -> RatePolicy {
    RatePolicy::new()
        .with_min_install_age_days(3)
        .with_min_launch_count(10)
        .with_remind_every_n_launches(1)
        .with_min_days_since_last_remind(1)
}

#[test]
fn fresh_install_becomes_eligible_after_thresholds() {
    let clock = FixedClock::at(1_000);
    let mut prompt = RatePrompt::with_clock(
        MemoryStore::new(),
        clock.clone(),
        StoreKind::GooglePlay,
        "dev.example.app",
    )
    .with_policy(lenient_policy());

    prompt.monitor().unwrap();
    assert!(!prompt.should_show_dialog().unwrap());

    for _ in 0..9 {
        prompt.monitor().unwrap();
    }
    // Ten launches but only just installed.
    assert!(!prompt.should_show_dialog().unwrap());

    clock.advance_days(4);
    assert!(prompt.should_show_dialog().unwrap());
}

#[test]
fn remind_later_cycle_reopens_after_the_cooldown() {
    let clock = FixedClock::at(1_000);
    let mut prompt = RatePrompt::with_clock(
        MemoryStore::new(),
        clock.clone(),
        StoreKind::GooglePlay,
        "dev.example.app",
    )
    .with_policy(lenient_policy());

    prompt.monitor().unwrap();
    for _ in 0..9 {
        prompt.monitor().unwrap();
    }
    clock.advance_days(4);
    assert!(prompt.should_show_dialog().unwrap());

    prompt.record_dialog_shown().unwrap();
    prompt
        .apply_choice(RateChoice::RemindLater, &BTreeSet::new())
        .unwrap();
    assert!(!prompt.should_show_dialog().unwrap());

    clock.advance_days(1);
    assert!(prompt.should_show_dialog().unwrap());

    prompt.record_dialog_shown().unwrap();
    let destinations = prompt
        .apply_choice(
            RateChoice::RateNow,
            &BTreeSet::from(["com.android.vending".to_owned()]),
        )
        .unwrap()
        .expect("google play resolves with its client installed");
    assert_eq!(destinations.len(), 2);

    // The final choice is permanent, whatever the clock does next.
    clock.advance_days(30);
    assert!(!prompt.should_show_dialog().unwrap());
}

#[test]
fn counters_survive_a_restart_through_the_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let clock = FixedClock::at(1_000);

    let mut prompt = RatePrompt::with_clock(
        JsonFileStore::open(&path).unwrap(),
        clock.clone(),
        StoreKind::GooglePlay,
        "dev.example.app",
    )
    .with_policy(lenient_policy());
    prompt.monitor().unwrap();
    prompt.monitor().unwrap();
    prompt.increment_event("export").unwrap();
    prompt.record_dialog_shown().unwrap();
    drop(prompt);

    let prompt = RatePrompt::with_clock(
        JsonFileStore::open(&path).unwrap(),
        clock,
        StoreKind::GooglePlay,
        "dev.example.app",
    );
    assert_eq!(prompt.ledger().install_timestamp().unwrap(), 1_000);
    assert_eq!(prompt.ledger().launch_count().unwrap(), 2);
    assert_eq!(prompt.ledger().custom_event_count("export").unwrap(), 1);
    assert_eq!(prompt.ledger().rolling_show_count().unwrap(), 1);
}

#[test]
fn yearly_cap_holds_across_a_simulated_year() {
    let clock = FixedClock::at(1_000);
    let mut prompt = RatePrompt::with_clock(
        MemoryStore::new(),
        clock.clone(),
        StoreKind::GooglePlay,
        "dev.example.app",
    )
    .with_policy(lenient_policy().with_max_shows_per_year(3));

    prompt.monitor().unwrap();
    for _ in 0..9 {
        prompt.monitor().unwrap();
    }
    clock.advance_days(4);
    for _ in 0..3 {
        assert!(prompt.should_show_dialog().unwrap());
        prompt.record_dialog_shown().unwrap();
        prompt
            .apply_choice(RateChoice::RemindLater, &BTreeSet::new())
            .unwrap();
        clock.advance_days(2);
    }
    // Cap reached; the cooldown alone no longer reopens the prompt.
    assert!(!prompt.should_show_dialog().unwrap());

    clock.advance_days(366);
    assert!(prompt.should_show_dialog().unwrap());
}

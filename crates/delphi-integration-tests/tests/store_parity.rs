//! Integration test: the in-memory and SQLite stores behave the same.
//!
//! Drives two engines with an identical write schedule (including rejected
//! writes and an oversized schedule that wraps the window several times)
//! and compares every observable result.

use delphi_db::SqliteStore;
use delphi_oracle::host::{ManualClock, StaticValidators};
use delphi_oracle::{Host, MemoryStore, OracleEngine, OracleParams, OracleStore};
use delphi_types::AccountName;

const T0: u64 = 1_700_000_000;

fn engine<S: OracleStore>(store: S, clock: &ManualClock) -> OracleEngine<S> {
    let host = Host::new(
        clock.clone(),
        StaticValidators::new(&["producer1".parse().expect("name")]),
    );
    OracleEngine::new(OracleParams::default(), store, host).expect("engine")
}

#[test]
fn test_memory_and_sqlite_agree() {
    let clock = ManualClock::new(T0);
    let mut memory = engine(MemoryStore::new(), &clock);
    let mut sqlite = engine(SqliteStore::open_memory().expect("store"), &clock);

    let base: AccountName = "feeder".parse().expect("name");
    let reporters: Vec<AccountName> = (1..=7)
        .map(|i| AccountName::from_u64(base.as_u64() + i))
        .collect();
    let controller = memory.params().controller;
    memory.set_reporters(controller, &reporters).expect("list");
    sqlite.set_reporters(controller, &reporters).expect("list");

    let producer: AccountName = "producer1".parse().expect("name");
    let mut accepted = 0;
    for step in 0..120u64 {
        let reporter = if step % 11 == 0 {
            producer
        } else {
            reporters[(step % 7) as usize]
        };
        // Some values fall out of range on purpose
        let value = 50 + (step * 7919) % 400_000;
        let a = memory.submit(reporter, reporter, value);
        let b = sqlite.submit(reporter, reporter, value);
        assert_eq!(a, b, "step {step}");
        if a.is_ok() {
            accepted += 1;
        }
        clock.advance(9);
    }
    assert!(accepted > 21, "schedule should wrap the window");

    assert_eq!(
        memory.observations(usize::MAX).expect("memory"),
        sqlite.observations(usize::MAX).expect("sqlite")
    );
    assert_eq!(
        memory.all_reporter_stats().expect("memory"),
        sqlite.all_reporter_stats().expect("sqlite")
    );
    assert_eq!(memory.snapshot().expect("memory"), sqlite.snapshot().expect("sqlite"));
    assert_eq!(
        memory.observations_between(T0 + 300, T0 + 700).expect("memory"),
        sqlite.observations_between(T0 + 300, T0 + 700).expect("sqlite")
    );
}

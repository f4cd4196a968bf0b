//! Integration test: a full feed lifecycle on the SQLite store.
//!
//! 1. The controller lists 22 reporters
//! 2. 21 writes fill the window, each averaged with its own value
//! 3. The 22nd write evicts the oldest and gets the trimmed mean
//! 4. A second round keeps the window at 21 with decreasing sequences
//! 5. State survives reopening the database
//! 6. Clear wipes everything and restarts sequences at the top

use delphi_db::SqliteStore;
use delphi_oracle::host::{ManualClock, StaticValidators};
use delphi_oracle::{Host, OracleEngine, OracleError, OracleParams};
use delphi_types::{AccountName, SEQ_MAX};

const T0: u64 = 1_700_000_000;

fn feeders(n: u64) -> Vec<AccountName> {
    let base: AccountName = "feeder".parse().expect("name");
    (1..=n)
        .map(|i| AccountName::from_u64(base.as_u64() + i))
        .collect()
}

fn engine(store: SqliteStore, clock: &ManualClock) -> OracleEngine<SqliteStore> {
    let host = Host::new(clock.clone(), StaticValidators::default());
    OracleEngine::new(OracleParams::default(), store, host).expect("engine")
}

fn trimmed(values: &[u64]) -> u64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted[5..14].iter().sum::<u64>() / 9
}

#[test]
fn test_window_lifecycle_on_sqlite() {
    let clock = ManualClock::new(T0);
    let mut engine = engine(SqliteStore::open_memory().expect("store"), &clock);
    let controller = engine.params().controller;
    let reporters = feeders(22);
    assert_eq!(
        engine.set_reporters(controller, &reporters).expect("list"),
        22
    );

    let mut window: Vec<u64> = Vec::new();
    for (i, reporter) in reporters.iter().take(21).enumerate() {
        let value = 10_000 + (i as u64 * 3571) % 2000;
        let obs = engine.submit(*reporter, *reporter, value).expect("fill");
        assert_eq!(obs.sequence, SEQ_MAX - i as u64);
        assert_eq!(obs.trimmed_average, value);
        window.push(value);
        clock.advance(3);
    }

    let obs = engine
        .submit(reporters[21], reporters[21], 15_000)
        .expect("overflow");
    window.remove(0);
    window.push(15_000);
    assert_eq!(obs.trimmed_average, trimmed(&window));
    assert_eq!(engine.window_len().expect("len"), 21);

    // Every reporter can write again after the interval
    clock.advance(55);
    for (i, reporter) in reporters.iter().enumerate() {
        let value = 9_000 + i as u64 * 10;
        let obs = engine.submit(*reporter, *reporter, value).expect("second round");
        window.remove(0);
        window.push(value);
        assert_eq!(obs.trimmed_average, trimmed(&window));
    }
    assert_eq!(engine.window_len().expect("len"), 21);

    let all = engine.observations(usize::MAX).expect("all");
    assert!(all.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert_eq!(all[0].sequence, SEQ_MAX - 43);

    let stats = engine.reporter_stats(reporters[0]).expect("stats").expect("present");
    assert_eq!(stats.write_count, 1);
}

#[test]
fn test_rejections_leave_sqlite_untouched() {
    let clock = ManualClock::new(T0);
    let mut engine = engine(SqliteStore::open_memory().expect("store"), &clock);
    let controller = engine.params().controller;
    let reporters = feeders(2);
    engine.set_reporters(controller, &reporters).expect("list");
    engine
        .submit(reporters[0], reporters[0], 500)
        .expect("first");
    let before = engine.observations(usize::MAX).expect("before");

    clock.advance(30);
    assert!(matches!(
        engine.submit(reporters[0], reporters[0], 600),
        Err(OracleError::RateLimited { .. })
    ));
    assert!(matches!(
        engine.submit(reporters[1], reporters[1], 50),
        Err(OracleError::OutOfRange { .. })
    ));
    let stranger: AccountName = "stranger".parse().expect("name");
    assert!(matches!(
        engine.submit(stranger, stranger, 600),
        Err(OracleError::NotQualified(_))
    ));

    assert_eq!(engine.observations(usize::MAX).expect("after"), before);
    assert!(engine.reporter_stats(reporters[1]).expect("stats").is_none());
    assert!(engine.reporter_stats(stranger).expect("stats").is_none());
}

#[test]
fn test_state_survives_reopen_and_clear() {
    let dir = std::env::temp_dir().join(format!("delphi-lifecycle-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("delphi.db");
    let _ = std::fs::remove_file(&path);

    let clock = ManualClock::new(T0);
    let reporters = feeders(3);
    {
        let mut engine = engine(SqliteStore::open(&path).expect("open"), &clock);
        let controller = engine.params().controller;
        engine.set_reporters(controller, &reporters).expect("list");
        for reporter in &reporters {
            engine.submit(*reporter, *reporter, 777).expect("write");
        }
    }

    let mut engine = engine(SqliteStore::open(&path).expect("reopen"), &clock);
    assert_eq!(engine.window_len().expect("len"), 3);
    assert_eq!(engine.reporters().expect("list"), reporters);
    // Rate state persisted too
    assert!(matches!(
        engine.submit(reporters[0], reporters[0], 778),
        Err(OracleError::RateLimited { .. })
    ));

    let controller = engine.params().controller;
    engine.clear_all(controller).expect("clear");
    assert_eq!(engine.window_len().expect("len"), 0);
    assert!(engine.reporters().expect("list").is_empty());
    assert!(engine.all_reporter_stats().expect("stats").is_empty());

    engine.set_reporters(controller, &reporters).expect("relist");
    let obs = engine
        .submit(reporters[0], reporters[0], 778)
        .expect("write after clear");
    assert_eq!(obs.sequence, SEQ_MAX);

    drop(engine);
    let _ = std::fs::remove_dir_all(&dir);
}

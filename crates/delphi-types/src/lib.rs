//! # delphi-types
//!
//! Shared domain types used across the Delphi workspace: account names,
//! the persisted feed records, and the signed actions pushed to the daemon.

pub mod account;
pub mod action;
pub mod feed;

pub use account::{AccountName, NameError};
pub use action::{Action, ActionEnvelope, SignedAction};
pub use feed::{Observation, PriceSnapshot, ReporterStats, Timestamp};

/// Number of observations held by the rolling window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 21;

/// Lowest values discarded before averaging.
pub const DEFAULT_TRIM_SKIP: usize = 5;

/// Values averaged after the low trim.
pub const DEFAULT_TRIM_TAKE: usize = 9;

/// Minimum accepted price: $0.01 in hundredths of a cent.
pub const VAL_MIN: u64 = 100;

/// Maximum accepted price: $10,000 in hundredths of a cent.
pub const VAL_MAX: u64 = 100_000_000;

/// Minimum seconds between two writes of the same reporter.
///
/// Slightly under a minute so that cron-driven reporters with jitter are not
/// rejected every other run.
pub const MIN_WRITE_INTERVAL_SECS: u64 = 55;

/// Capacity of the host-supplied validator list.
pub const MAX_VALIDATORS: usize = 21;

/// Sequence assigned to the first observation ever written.
pub const SEQ_MAX: u64 = u64::MAX;

/// Default controlling account for administrative actions (`eostitanprod`).
pub const DEFAULT_CONTROLLER: AccountName = AccountName::from_u64(6138854226386610320);

//! Host collaborators.
//!
//! The engine never reads time, identity or the validator list from ambient
//! process state. The host supplies them through these traits, which keeps
//! the engine deterministic under test.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use delphi_types::{AccountName, Timestamp, MAX_VALIDATORS};

/// Source of the current timestamp.
pub trait Clock: Send + Sync {
    /// Current time in Unix epoch seconds.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Settable clock shared between a test and the engine it drives.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self(Arc::new(AtomicU64::new(start)))
    }

    pub fn set(&self, now: Timestamp) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decides whether an authenticated caller may act as an account.
///
/// The caller identity has already been verified by the host (for example
/// by checking a signature). This trait only maps callers to the accounts
/// they may act for.
pub trait IdentityVerifier: Send + Sync {
    fn is_authorized(&self, caller: AccountName, account: AccountName) -> bool;
}

/// A caller may act only as itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl IdentityVerifier for ExactMatch {
    fn is_authorized(&self, caller: AccountName, account: AccountName) -> bool {
        caller == account
    }
}

/// The host's list of active validators, at most [`MAX_VALIDATORS`] entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorSet {
    slots: [Option<AccountName>; MAX_VALIDATORS],
}

impl ValidatorSet {
    /// Build from a list, keeping only the first [`MAX_VALIDATORS`] entries.
    pub fn from_slice(validators: &[AccountName]) -> Self {
        let mut slots = [None; MAX_VALIDATORS];
        for (slot, name) in slots.iter_mut().zip(validators) {
            *slot = Some(*name);
        }
        Self { slots }
    }

    pub fn contains(&self, account: AccountName) -> bool {
        self.iter().any(|v| v == account)
    }

    pub fn iter(&self) -> impl Iterator<Item = AccountName> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }
}

/// Supplies the current validator list.
pub trait ValidatorSource: Send + Sync {
    fn active_validators(&self) -> ValidatorSet;
}

/// A fixed validator list.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticValidators(pub ValidatorSet);

impl StaticValidators {
    pub fn new(validators: &[AccountName]) -> Self {
        Self(ValidatorSet::from_slice(validators))
    }
}

impl ValidatorSource for StaticValidators {
    fn active_validators(&self) -> ValidatorSet {
        self.0
    }
}

impl<F> ValidatorSource for F
where
    F: Fn() -> ValidatorSet + Send + Sync,
{
    fn active_validators(&self) -> ValidatorSet {
        self()
    }
}

/// The collaborators an engine is built with.
pub struct Host {
    pub clock: Box<dyn Clock>,
    pub identity: Box<dyn IdentityVerifier>,
    pub validators: Box<dyn ValidatorSource>,
}

impl Host {
    /// Host with exact-match identity.
    pub fn new(clock: impl Clock + 'static, validators: impl ValidatorSource + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            identity: Box::new(ExactMatch),
            validators: Box::new(validators),
        }
    }

    /// Replace the identity verifier.
    pub fn with_identity(mut self, identity: impl IdentityVerifier + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("now", &self.clock.now())
            .field("validators", &self.validators.active_validators().len())
            .finish()
    }
}

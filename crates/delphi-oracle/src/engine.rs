//! Write orchestration and read queries.
//!
//! A write runs these checks in order and stops at the first failure:
//!
//! 1. the caller may act as the reporter ([`OracleError::AuthMismatch`])
//! 2. the value is in range ([`OracleError::OutOfRange`])
//! 3. the reporter is qualified ([`OracleError::NotQualified`])
//! 4. the reporter is not rate limited ([`OracleError::RateLimited`])
//! 5. the observation is inserted into the window
//!
//! Steps 3 to 5 run inside one [`OracleStore::atomically`] unit, so a
//! rejected write leaves every store untouched.

use delphi_types::{Action, AccountName, Observation, PriceSnapshot, ReporterStats, Timestamp};

use crate::host::{Clock, Host, IdentityVerifier};
use crate::params::OracleParams;
use crate::rate_limit::RateLimiter;
use crate::registry::ReporterRegistry;
use crate::store::{ObservationStore, OracleStore, RateStore, ReporterStore};
use crate::window::ObservationWindow;
use crate::{OracleError, Result};

/// Outcome of [`OracleEngine::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Written(Observation),
    ReportersReplaced(usize),
    Cleared,
}

/// One oracle instance: its tunables, its stores and its host collaborators.
///
/// The engine takes `&mut self` for every state change. Hosts that share an
/// engine between threads must hold one lock around each call.
pub struct OracleEngine<S> {
    pub(crate) params: OracleParams,
    pub(crate) store: S,
    pub(crate) registry: ReporterRegistry,
    pub(crate) limiter: RateLimiter,
    pub(crate) window: ObservationWindow,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) identity: Box<dyn IdentityVerifier>,
}

impl<S: OracleStore> OracleEngine<S> {
    /// Build an engine over `store`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidParams`] if `params` fail validation
    pub fn new(params: OracleParams, store: S, host: Host) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            registry: ReporterRegistry::new(host.validators),
            limiter: RateLimiter::new(params.min_interval_secs),
            window: ObservationWindow::from_params(&params),
            clock: host.clock,
            identity: host.identity,
            params,
            store,
        })
    }

    pub fn params(&self) -> &OracleParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current host time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Submit a price observation for `reporter` on behalf of `caller`.
    pub fn submit(
        &mut self,
        caller: AccountName,
        reporter: AccountName,
        value: u64,
    ) -> Result<Observation> {
        let result = self.try_submit(caller, reporter, value);
        match &result {
            Ok(obs) => tracing::info!(
                reporter = %reporter,
                value,
                sequence = obs.sequence,
                trimmed_average = obs.trimmed_average,
                "observation accepted"
            ),
            Err(e) => tracing::debug!(reporter = %reporter, value, error = %e, "observation rejected"),
        }
        result
    }

    fn try_submit(
        &mut self,
        caller: AccountName,
        reporter: AccountName,
        value: u64,
    ) -> Result<Observation> {
        if !self.identity.is_authorized(caller, reporter) {
            return Err(OracleError::AuthMismatch { caller, reporter });
        }
        if !self.params.in_range(value) {
            return Err(OracleError::OutOfRange {
                value,
                min: self.params.val_min,
                max: self.params.val_max,
            });
        }

        let now = self.clock.now();
        let registry = &self.registry;
        let limiter = &self.limiter;
        let window = &self.window;
        self.store.atomically(|store| {
            if !registry.is_qualified(&*store, reporter)? {
                return Err(OracleError::NotQualified(reporter));
            }
            limiter.check_and_record(&mut *store, reporter, now)?;
            window.insert(store, reporter, value, now)
        })
    }

    /// Run a pushed action as `caller`.
    pub fn apply(&mut self, caller: AccountName, action: &Action) -> Result<Applied> {
        match action {
            Action::Write { owner, value } => self.submit(caller, *owner, *value).map(Applied::Written),
            Action::SetOracles { oracles } => self
                .set_reporters(caller, oracles)
                .map(Applied::ReportersReplaced),
            Action::Clear => self.clear_all(caller).map(|()| Applied::Cleared),
        }
    }

    /// The newest observation.
    pub fn latest(&self) -> Result<Option<Observation>> {
        self.store.newest_observation()
    }

    /// Latest price and smoothed price.
    pub fn snapshot(&self) -> Result<Option<PriceSnapshot>> {
        let Some(latest) = self.store.newest_observation()? else {
            return Ok(None);
        };
        let len = self.store.observation_count()?;
        Ok(Some(PriceSnapshot::from_latest(
            &latest,
            len,
            self.window.capacity(),
        )))
    }

    /// Up to `limit` observations, newest first.
    pub fn observations(&self, limit: usize) -> Result<Vec<Observation>> {
        self.store.newest_first(limit)
    }

    /// Observations written between `from` and `to` inclusive, oldest first.
    pub fn observations_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Observation>> {
        self.store.observed_between(from, to)
    }

    pub fn window_len(&self) -> Result<usize> {
        self.store.observation_count()
    }

    pub fn reporter_stats(&self, reporter: AccountName) -> Result<Option<ReporterStats>> {
        self.store.rate_state(reporter)
    }

    pub fn all_reporter_stats(&self) -> Result<Vec<ReporterStats>> {
        self.store.all_rate_states()
    }

    /// The explicit allow-list.
    pub fn reporters(&self) -> Result<Vec<AccountName>> {
        self.store.listed_reporters()
    }

    pub fn is_qualified(&self, principal: AccountName) -> Result<bool> {
        self.registry.is_qualified(&self.store, principal)
    }
}

impl<S> std::fmt::Debug for OracleEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

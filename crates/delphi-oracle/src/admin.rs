//! Controller-only operations.

use delphi_types::AccountName;

use crate::engine::OracleEngine;
use crate::store::{ObservationStore, OracleStore, RateStore, ReporterStore};
use crate::{OracleError, Result};

impl<S: OracleStore> OracleEngine<S> {
    fn require_controller(&self, caller: AccountName) -> Result<()> {
        if self.identity.is_authorized(caller, self.params.controller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, "administrative action refused");
            Err(OracleError::Unauthorized(caller))
        }
    }

    /// Replace the reporter allow-list. Returns the number of distinct
    /// reporters now listed.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Unauthorized`] unless `caller` is the controller
    pub fn set_reporters(&mut self, caller: AccountName, reporters: &[AccountName]) -> Result<usize> {
        self.require_controller(caller)?;
        let registry = &self.registry;
        let listed = self.store.atomically(|store| {
            registry.replace_all(&mut *store, reporters)?;
            store.listed_reporters().map(|list| list.len())
        })?;
        tracing::info!(reporters = listed, "reporter list replaced");
        Ok(listed)
    }

    /// Wipe observations, rate state and the allow-list.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Unauthorized`] unless `caller` is the controller
    pub fn clear_all(&mut self, caller: AccountName) -> Result<()> {
        self.require_controller(caller)?;
        self.store.atomically(|store| {
            store.clear_rate_states()?;
            store.clear_observations()?;
            store.clear_reporters()
        })?;
        tracing::info!("oracle state cleared");
        Ok(())
    }
}

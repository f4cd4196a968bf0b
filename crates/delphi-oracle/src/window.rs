//! Rolling observation window.
//!
//! Observations are keyed by a decreasing sequence: the first one ever
//! written gets [`SEQ_MAX`] and each later one gets the current newest key
//! minus one, so iterating in key order yields newest first and the oldest
//! observation is always the largest key.
//!
//! While the window is filling, each observation's trimmed average is its own
//! value. Once the window is full, each new observation evicts the oldest and
//! is annotated with the trimmed mean of the window's values:
//!
//! ```text
//! sorted = values ascending
//! trimmed_average = sum(sorted[skip .. skip + take]) / take     (floor)
//! ```
//!
//! With the defaults (21 / 5 / 9) this averages ranks 6 through 14 and drops
//! the 5 lowest and 7 highest values. Older observations keep the average
//! they were written with.

use delphi_types::{AccountName, Observation, Timestamp, SEQ_MAX};

use crate::params::OracleParams;
use crate::store::ObservationStore;
use crate::{OracleError, Result};

/// Window shape.
#[derive(Debug, Clone, Copy)]
pub struct ObservationWindow {
    capacity: usize,
    trim_skip: usize,
    trim_take: usize,
}

impl ObservationWindow {
    pub fn new(capacity: usize, trim_skip: usize, trim_take: usize) -> Self {
        Self {
            capacity,
            trim_skip,
            trim_take,
        }
    }

    pub fn from_params(params: &OracleParams) -> Self {
        Self::new(params.capacity, params.trim_skip, params.trim_take)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a new observation, evicting the oldest if the window is full.
    ///
    /// Admission and range checks are the caller's job.
    ///
    /// # Errors
    ///
    /// - [`OracleError::SequenceExhausted`] if the newest key is already 0
    /// - [`OracleError::Storage`] on backing store failures
    pub fn insert<S>(
        &self,
        store: &mut S,
        reporter: AccountName,
        value: u64,
        now: Timestamp,
    ) -> Result<Observation>
    where
        S: ObservationStore + ?Sized,
    {
        let Some(newest) = store.newest_observation()? else {
            let first = Observation {
                sequence: SEQ_MAX,
                reporter,
                value,
                trimmed_average: value,
                observed_at: now,
            };
            store.insert_observation(&first)?;
            return Ok(first);
        };

        let sequence = newest
            .sequence
            .checked_sub(1)
            .ok_or(OracleError::SequenceExhausted)?;
        let mut len = store.observation_count()?;

        if len < self.capacity {
            let observation = Observation {
                sequence,
                reporter,
                value,
                trimmed_average: value,
                observed_at: now,
            };
            store.insert_observation(&observation)?;
            return Ok(observation);
        }

        // A store written with a larger capacity may hold extra points.
        while len >= self.capacity {
            let oldest = store
                .oldest_observation()?
                .ok_or_else(|| OracleError::Storage("window count out of sync".to_string()))?;
            store.remove_observation(oldest.sequence)?;
            tracing::debug!(sequence = oldest.sequence, value = oldest.value, "evicted observation");
            len -= 1;
        }

        let mut observation = Observation {
            sequence,
            reporter,
            value,
            trimmed_average: 0,
            observed_at: now,
        };
        store.insert_observation(&observation)?;

        let average = self.trimmed_average(store)?;
        store.set_trimmed_average(sequence, average)?;
        observation.trimmed_average = average;
        Ok(observation)
    }

    /// Trimmed mean of the values currently stored.
    pub fn trimmed_average<S>(&self, store: &S) -> Result<u64>
    where
        S: ObservationStore + ?Sized,
    {
        let values = store.values_ascending(self.trim_skip, self.trim_take)?;
        Ok(trimmed_mean(&values))
    }
}

/// Floor of the mean of `values`; 0 for an empty slice.
pub fn trimmed_mean(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
    // Mean of u64 values always fits in u64
    (sum / values.len() as u128) as u64
}

//! Storage access patterns.
//!
//! The engine owns three keyed collections: observations (keyed by sequence,
//! with orderings by value and by observation time), per-reporter rate state
//! (keyed by reporter) and the reporter allow-list (keyed by account). Hosts
//! back them with whatever transactional store they have; [`MemoryStore`] is
//! the in-process implementation.

use std::collections::{BTreeMap, BTreeSet};

use delphi_types::{AccountName, Observation, ReporterStats, Timestamp};

use crate::{OracleError, Result};

/// Observation collection.
pub trait ObservationStore {
    fn observation_count(&self) -> Result<usize>;

    /// Observation with the smallest sequence.
    fn newest_observation(&self) -> Result<Option<Observation>>;

    /// Observation with the largest sequence.
    fn oldest_observation(&self) -> Result<Option<Observation>>;

    /// Fails if the sequence is already present.
    fn insert_observation(&mut self, observation: &Observation) -> Result<()>;

    /// Removing an absent sequence is a no-op.
    fn remove_observation(&mut self, sequence: u64) -> Result<()>;

    /// Fails if the sequence is absent.
    fn set_trimmed_average(&mut self, sequence: u64, average: u64) -> Result<()>;

    /// Values in ascending order, skipping the `skip` smallest and returning
    /// at most `take`.
    fn values_ascending(&self, skip: usize, take: usize) -> Result<Vec<u64>>;

    /// Up to `limit` observations, newest first.
    fn newest_first(&self, limit: usize) -> Result<Vec<Observation>>;

    /// Observations with `from <= observed_at <= to`, in time order.
    fn observed_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Observation>>;

    fn clear_observations(&mut self) -> Result<()>;
}

/// Per-reporter write statistics.
pub trait RateStore {
    fn rate_state(&self, reporter: AccountName) -> Result<Option<ReporterStats>>;

    /// Insert or overwrite.
    fn put_rate_state(&mut self, stats: &ReporterStats) -> Result<()>;

    /// All entries ordered by reporter.
    fn all_rate_states(&self) -> Result<Vec<ReporterStats>>;

    fn clear_rate_states(&mut self) -> Result<()>;
}

/// Reporter allow-list.
pub trait ReporterStore {
    fn is_listed(&self, reporter: AccountName) -> Result<bool>;

    /// Discard the list and store `reporters`; duplicates collapse.
    fn replace_reporters(&mut self, reporters: &[AccountName]) -> Result<()>;

    /// Entries ordered by account.
    fn listed_reporters(&self) -> Result<Vec<AccountName>>;

    fn clear_reporters(&mut self) -> Result<()>;
}

/// The full engine state.
pub trait OracleStore: ObservationStore + RateStore + ReporterStore {
    /// Run `f` as one unit of work. If `f` fails, every mutation it made is
    /// undone before the error is returned.
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>;
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    observations: BTreeMap<u64, Observation>,
    by_value: BTreeSet<(u64, u64)>,
    by_time: BTreeSet<(Timestamp, u64)>,
    rate: BTreeMap<AccountName, ReporterStats>,
    reporters: BTreeSet<AccountName>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObservationStore for MemoryStore {
    fn observation_count(&self) -> Result<usize> {
        Ok(self.observations.len())
    }

    fn newest_observation(&self) -> Result<Option<Observation>> {
        Ok(self.observations.values().next().cloned())
    }

    fn oldest_observation(&self) -> Result<Option<Observation>> {
        Ok(self.observations.values().next_back().cloned())
    }

    fn insert_observation(&mut self, observation: &Observation) -> Result<()> {
        if self.observations.contains_key(&observation.sequence) {
            return Err(OracleError::Storage(format!(
                "duplicate sequence {}",
                observation.sequence
            )));
        }
        self.by_value
            .insert((observation.value, observation.sequence));
        self.by_time
            .insert((observation.observed_at, observation.sequence));
        self.observations
            .insert(observation.sequence, observation.clone());
        Ok(())
    }

    fn remove_observation(&mut self, sequence: u64) -> Result<()> {
        if let Some(removed) = self.observations.remove(&sequence) {
            self.by_value.remove(&(removed.value, sequence));
            self.by_time.remove(&(removed.observed_at, sequence));
        }
        Ok(())
    }

    fn set_trimmed_average(&mut self, sequence: u64, average: u64) -> Result<()> {
        let observation = self
            .observations
            .get_mut(&sequence)
            .ok_or_else(|| OracleError::Storage(format!("no observation {sequence}")))?;
        observation.trimmed_average = average;
        Ok(())
    }

    fn values_ascending(&self, skip: usize, take: usize) -> Result<Vec<u64>> {
        Ok(self
            .by_value
            .iter()
            .skip(skip)
            .take(take)
            .map(|&(value, _)| value)
            .collect())
    }

    fn newest_first(&self, limit: usize) -> Result<Vec<Observation>> {
        Ok(self.observations.values().take(limit).cloned().collect())
    }

    fn observed_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Observation>> {
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self
            .by_time
            .range((from, u64::MIN)..=(to, u64::MAX))
            .filter_map(|(_, seq)| self.observations.get(seq).cloned())
            .collect())
    }

    fn clear_observations(&mut self) -> Result<()> {
        self.observations.clear();
        self.by_value.clear();
        self.by_time.clear();
        Ok(())
    }
}

impl RateStore for MemoryStore {
    fn rate_state(&self, reporter: AccountName) -> Result<Option<ReporterStats>> {
        Ok(self.rate.get(&reporter).cloned())
    }

    fn put_rate_state(&mut self, stats: &ReporterStats) -> Result<()> {
        self.rate.insert(stats.reporter, stats.clone());
        Ok(())
    }

    fn all_rate_states(&self) -> Result<Vec<ReporterStats>> {
        Ok(self.rate.values().cloned().collect())
    }

    fn clear_rate_states(&mut self) -> Result<()> {
        self.rate.clear();
        Ok(())
    }
}

impl ReporterStore for MemoryStore {
    fn is_listed(&self, reporter: AccountName) -> Result<bool> {
        Ok(self.reporters.contains(&reporter))
    }

    fn replace_reporters(&mut self, reporters: &[AccountName]) -> Result<()> {
        self.reporters = reporters.iter().copied().collect();
        Ok(())
    }

    fn listed_reporters(&self) -> Result<Vec<AccountName>> {
        Ok(self.reporters.iter().copied().collect())
    }

    fn clear_reporters(&mut self) -> Result<()> {
        self.reporters.clear();
        Ok(())
    }
}

impl OracleStore for MemoryStore {
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}

//! [`OracleStore`] backed by a SQLite connection.

use std::path::Path;

use delphi_oracle::store::{ObservationStore, OracleStore, RateStore, ReporterStore};
use delphi_types::{AccountName, Observation, ReporterStats, Timestamp};
use rusqlite::Connection;

use crate::queries::{observations, reporters, stats};
use crate::DbError;

type OracleResult<T> = delphi_oracle::Result<T>;

const SAVEPOINT: &str = "oracle_unit";

/// Durable engine state in one SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap a connection that has already been migrated.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> crate::Result<Self> {
        crate::open(path).map(Self::new)
    }

    /// Fresh in-memory database.
    pub fn open_memory() -> crate::Result<Self> {
        crate::open_memory().map(Self::new)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl ObservationStore for SqliteStore {
    fn observation_count(&self) -> OracleResult<usize> {
        Ok(observations::count(&self.conn)?)
    }

    fn newest_observation(&self) -> OracleResult<Option<Observation>> {
        Ok(observations::newest(&self.conn)?)
    }

    fn oldest_observation(&self) -> OracleResult<Option<Observation>> {
        Ok(observations::oldest(&self.conn)?)
    }

    fn insert_observation(&mut self, observation: &Observation) -> OracleResult<()> {
        Ok(observations::insert(&self.conn, observation)?)
    }

    fn remove_observation(&mut self, sequence: u64) -> OracleResult<()> {
        Ok(observations::remove(&self.conn, sequence)?)
    }

    fn set_trimmed_average(&mut self, sequence: u64, average: u64) -> OracleResult<()> {
        Ok(observations::set_trimmed_average(&self.conn, sequence, average)?)
    }

    fn values_ascending(&self, skip: usize, take: usize) -> OracleResult<Vec<u64>> {
        Ok(observations::values_ascending(&self.conn, skip, take)?)
    }

    fn newest_first(&self, limit: usize) -> OracleResult<Vec<Observation>> {
        Ok(observations::newest_first(&self.conn, limit)?)
    }

    fn observed_between(&self, from: Timestamp, to: Timestamp) -> OracleResult<Vec<Observation>> {
        Ok(observations::between(&self.conn, from, to)?)
    }

    fn clear_observations(&mut self) -> OracleResult<()> {
        Ok(observations::clear(&self.conn)?)
    }
}

impl RateStore for SqliteStore {
    fn rate_state(&self, reporter: AccountName) -> OracleResult<Option<ReporterStats>> {
        Ok(stats::get(&self.conn, reporter)?)
    }

    fn put_rate_state(&mut self, entry: &ReporterStats) -> OracleResult<()> {
        Ok(stats::put(&self.conn, entry)?)
    }

    fn all_rate_states(&self) -> OracleResult<Vec<ReporterStats>> {
        Ok(stats::all(&self.conn)?)
    }

    fn clear_rate_states(&mut self) -> OracleResult<()> {
        Ok(stats::clear(&self.conn)?)
    }
}

impl ReporterStore for SqliteStore {
    fn is_listed(&self, reporter: AccountName) -> OracleResult<bool> {
        Ok(reporters::contains(&self.conn, reporter)?)
    }

    fn replace_reporters(&mut self, accounts: &[AccountName]) -> OracleResult<()> {
        Ok(reporters::replace_all(&self.conn, accounts)?)
    }

    fn listed_reporters(&self) -> OracleResult<Vec<AccountName>> {
        Ok(reporters::list(&self.conn)?)
    }

    fn clear_reporters(&mut self) -> OracleResult<()> {
        Ok(reporters::clear(&self.conn)?)
    }
}

impl OracleStore for SqliteStore {
    fn atomically<T, F>(&mut self, f: F) -> OracleResult<T>
    where
        F: FnOnce(&mut Self) -> OracleResult<T>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {SAVEPOINT}"))
            .map_err(DbError::from)?;

        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {SAVEPOINT}"))
                    .map_err(DbError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch(&format!("ROLLBACK TO {SAVEPOINT}; RELEASE {SAVEPOINT}"))
                {
                    tracing::error!(error = %rollback, "savepoint rollback failed");
                }
                Err(e)
            }
        }
    }
}

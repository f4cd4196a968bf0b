//! # delphi-db
//!
//! SQLite storage for the Delphi daemon.
//! Manages the single database at `$DELPHI_DATA_DIR/delphi.db`.
//!
//! ## Schema
//!
//! - WAL mode
//! - All timestamps are Unix epoch seconds (u64)
//! - Every u64 column is stored order-preservingly in SQLite's signed
//!   INTEGER (see [`encode_u64`]), so `ORDER BY` matches Rust ordering
//! - Schema version stored in `PRAGMA user_version`

pub mod migrations;
pub mod queries;
pub mod schema;
pub mod store;

pub use store::SqliteStore;

use delphi_oracle::OracleError;
use rusqlite::Connection;
use std::path::Path;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for OracleError {
    fn from(e: DbError) -> Self {
        OracleError::Storage(e.to_string())
    }
}

const SIGN_BIT: u64 = 1 << 63;

/// Map a u64 onto i64 so that signed comparison matches unsigned order.
pub fn encode_u64(value: u64) -> i64 {
    (value ^ SIGN_BIT) as i64
}

/// Inverse of [`encode_u64`].
pub fn decode_u64(stored: i64) -> u64 {
    (stored as u64) ^ SIGN_BIT
}

/// Open or create the database at the given path.
///
/// Configures WAL mode and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -8000;",
    )?;
    Ok(())
}

//! Observation window queries.

use delphi_types::{AccountName, Observation, Timestamp};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{decode_u64, encode_u64, DbError, Result};

const COLUMNS: &str = "sequence, reporter, value, trimmed_average, observed_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Observation> {
    Ok(Observation {
        sequence: decode_u64(row.get(0)?),
        reporter: AccountName::from_u64(decode_u64(row.get(1)?)),
        value: decode_u64(row.get(2)?),
        trimmed_average: decode_u64(row.get(3)?),
        observed_at: decode_u64(row.get(4)?),
    })
}

fn sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Number of observations in the window.
pub fn count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Observation with the smallest sequence.
pub fn newest(conn: &Connection) -> Result<Option<Observation>> {
    let sql = format!("SELECT {COLUMNS} FROM observations ORDER BY sequence ASC LIMIT 1");
    Ok(conn.query_row(&sql, [], from_row).optional()?)
}

/// Observation with the largest sequence.
pub fn oldest(conn: &Connection) -> Result<Option<Observation>> {
    let sql = format!("SELECT {COLUMNS} FROM observations ORDER BY sequence DESC LIMIT 1");
    Ok(conn.query_row(&sql, [], from_row).optional()?)
}

/// Insert a new observation. Fails if the sequence is taken.
pub fn insert(conn: &Connection, observation: &Observation) -> Result<()> {
    conn.execute(
        "INSERT INTO observations (sequence, reporter, value, trimmed_average, observed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            encode_u64(observation.sequence),
            encode_u64(observation.reporter.as_u64()),
            encode_u64(observation.value),
            encode_u64(observation.trimmed_average),
            encode_u64(observation.observed_at),
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint(format!("duplicate sequence {}", observation.sequence))
        }
        other => DbError::Sqlite(other),
    })?;
    Ok(())
}

/// Delete an observation. Absent sequences are ignored.
pub fn remove(conn: &Connection, sequence: u64) -> Result<()> {
    conn.execute(
        "DELETE FROM observations WHERE sequence = ?1",
        [encode_u64(sequence)],
    )?;
    Ok(())
}

/// Overwrite the trimmed average of an existing observation.
pub fn set_trimmed_average(conn: &Connection, sequence: u64, average: u64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE observations SET trimmed_average = ?1 WHERE sequence = ?2",
        rusqlite::params![encode_u64(average), encode_u64(sequence)],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("observation {sequence}")));
    }
    Ok(())
}

/// Values in ascending order after skipping the `skip` smallest, at most `take`.
pub fn values_ascending(conn: &Connection, skip: usize, take: usize) -> Result<Vec<u64>> {
    let mut stmt = conn.prepare(
        "SELECT value FROM observations ORDER BY value ASC, sequence ASC LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map([sql_limit(take), sql_limit(skip)], |row| {
        row.get::<_, i64>(0).map(decode_u64)
    })?;
    let mut values = Vec::new();
    for row in rows {
        values.push(row?);
    }
    Ok(values)
}

/// Up to `limit` observations, newest first.
pub fn newest_first(conn: &Connection, limit: usize) -> Result<Vec<Observation>> {
    let sql = format!("SELECT {COLUMNS} FROM observations ORDER BY sequence ASC LIMIT ?1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([sql_limit(limit)], from_row)?;
    let mut observations = Vec::new();
    for row in rows {
        observations.push(row?);
    }
    Ok(observations)
}

/// Observations with `from <= observed_at <= to`, in time order.
pub fn between(conn: &Connection, from: Timestamp, to: Timestamp) -> Result<Vec<Observation>> {
    if from > to {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {COLUMNS} FROM observations
         WHERE observed_at BETWEEN ?1 AND ?2
         ORDER BY observed_at ASC, sequence ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([encode_u64(from), encode_u64(to)], from_row)?;
    let mut observations = Vec::new();
    for row in rows {
        observations.push(row?);
    }
    Ok(observations)
}

/// Delete every observation.
pub fn clear(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM observations", [])?;
    Ok(())
}

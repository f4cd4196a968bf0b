//! Per-reporter rate state queries.

use delphi_types::{AccountName, ReporterStats};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{decode_u64, encode_u64, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<ReporterStats> {
    Ok(ReporterStats {
        reporter: AccountName::from_u64(decode_u64(row.get(0)?)),
        last_write_at: decode_u64(row.get(1)?),
        write_count: decode_u64(row.get(2)?),
    })
}

/// Get the stats of one reporter.
pub fn get(conn: &Connection, reporter: AccountName) -> Result<Option<ReporterStats>> {
    Ok(conn
        .query_row(
            "SELECT reporter, last_write_at, write_count FROM reporter_stats WHERE reporter = ?1",
            [encode_u64(reporter.as_u64())],
            from_row,
        )
        .optional()?)
}

/// Insert or overwrite a reporter's stats.
pub fn put(conn: &Connection, stats: &ReporterStats) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO reporter_stats (reporter, last_write_at, write_count)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![
            encode_u64(stats.reporter.as_u64()),
            encode_u64(stats.last_write_at),
            encode_u64(stats.write_count),
        ],
    )?;
    Ok(())
}

/// All reporter stats ordered by reporter.
pub fn all(conn: &Connection) -> Result<Vec<ReporterStats>> {
    let mut stmt = conn.prepare(
        "SELECT reporter, last_write_at, write_count FROM reporter_stats ORDER BY reporter ASC",
    )?;
    let rows = stmt.query_map([], from_row)?;
    let mut stats = Vec::new();
    for row in rows {
        stats.push(row?);
    }
    Ok(stats)
}

/// Forget every reporter's stats.
pub fn clear(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM reporter_stats", [])?;
    Ok(())
}

//! Reporter allow-list queries.

use delphi_types::AccountName;
use rusqlite::Connection;

use crate::{decode_u64, encode_u64, Result};

/// Whether `account` is on the allow-list.
pub fn contains(conn: &Connection, account: AccountName) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reporters WHERE account = ?1",
        [encode_u64(account.as_u64())],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Replace the allow-list. Duplicates collapse.
pub fn replace_all(conn: &Connection, accounts: &[AccountName]) -> Result<()> {
    conn.execute("DELETE FROM reporters", [])?;
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO reporters (account) VALUES (?1)")?;
    for account in accounts {
        stmt.execute([encode_u64(account.as_u64())])?;
    }
    Ok(())
}

/// The allow-list ordered by account.
pub fn list(conn: &Connection) -> Result<Vec<AccountName>> {
    let mut stmt = conn.prepare("SELECT account FROM reporters ORDER BY account ASC")?;
    let rows = stmt.query_map([], |row| {
        row.get::<_, i64>(0)
            .map(|v| AccountName::from_u64(decode_u64(v)))
    })?;
    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row?);
    }
    Ok(accounts)
}

/// Empty the allow-list.
pub fn clear(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM reporters", [])?;
    Ok(())
}

//! SQL schema definitions.

/// Complete schema for the v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Observation window
-- ============================================================

CREATE TABLE IF NOT EXISTS observations (
    sequence INTEGER PRIMARY KEY,
    reporter INTEGER NOT NULL,
    value INTEGER NOT NULL,
    trimmed_average INTEGER NOT NULL,
    observed_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_observations_value ON observations(value, sequence);
CREATE INDEX IF NOT EXISTS idx_observations_time ON observations(observed_at, sequence);

-- ============================================================
-- Reporters
-- ============================================================

CREATE TABLE IF NOT EXISTS reporter_stats (
    reporter INTEGER PRIMARY KEY,
    last_write_at INTEGER NOT NULL,
    write_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS reporters (
    account INTEGER PRIMARY KEY
);
"#;

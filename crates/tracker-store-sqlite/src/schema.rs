//! SQL schema for the tracker's SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per named table. The header is a JSON array of column names.
CREATE TABLE IF NOT EXISTS grids (
    name        TEXT PRIMARY KEY,
    header      TEXT NOT NULL,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC
);

-- Data rows. `position` is the zero-based row index under the header and is
-- kept dense: inserts and deletes shift the rows below them.
CREATE TABLE IF NOT EXISTS grid_rows (
    id          INTEGER PRIMARY KEY,
    grid        TEXT NOT NULL REFERENCES grids(name),
    position    INTEGER NOT NULL,
    cells       TEXT NOT NULL,                -- JSON array of tagged cells
    checkboxes  TEXT NOT NULL DEFAULT '[]'    -- JSON array of column indices
);

CREATE INDEX IF NOT EXISTS grid_rows_position_idx ON grid_rows(grid, position);

PRAGMA user_version = 1;
";

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

pub const SCHEMA_VERSION: &str = "1";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (date('now')),
    status TEXT NOT NULL DEFAULT 'Te koop',
    brand TEXT NOT NULL DEFAULT '',
    model TEXT NOT NULL DEFAULT '',
    trim TEXT NOT NULL DEFAULT '',
    plate TEXT,
    chassis TEXT,
    color TEXT NOT NULL DEFAULT '',
    fuel TEXT NOT NULL DEFAULT '',
    transmission TEXT NOT NULL DEFAULT '',
    reporting_code TEXT NOT NULL DEFAULT '',
    first_registration TEXT NOT NULL DEFAULT '',
    purchase_excl REAL NOT NULL DEFAULT 0,
    levy REAL NOT NULL DEFAULT 0,
    sale_incl REAL NOT NULL DEFAULT 0,
    tax_scheme TEXT NOT NULL DEFAULT 'unknown',
    notes TEXT NOT NULL DEFAULT '',
    raw_extraction TEXT NOT NULL DEFAULT '',
    source_checksum TEXT,
    inspection_text TEXT NOT NULL DEFAULT '',
    inspection_report TEXT
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    vehicle_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    task_key TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    priority TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'open',
    category TEXT NOT NULL,
    system_generated INTEGER NOT NULL DEFAULT 1,
    UNIQUE (vehicle_id, task_key),
    FOREIGN KEY (vehicle_id) REFERENCES vehicles(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS costs (
    id INTEGER PRIMARY KEY,
    vehicle_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount >= 0),
    basis TEXT NOT NULL DEFAULT 'incl',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (vehicle_id) REFERENCES vehicles(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    city TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    tracing::debug!(path = %db_path.display(), "opening database");
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    if get_metadata(conn, "schema_version")?.is_none() {
        set_metadata(conn, "schema_version", SCHEMA_VERSION)?;
        tracing::info!(version = SCHEMA_VERSION, "database initialized");
    }
    Ok(())
}

pub fn get_metadata(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

pub fn set_metadata(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["vehicles", "tasks", "costs", "relations", "metadata"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        assert_eq!(
            get_metadata(&conn, "schema_version").unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
    }

    #[test]
    fn test_metadata_upsert() {
        let (_dir, conn) = test_db();
        assert_eq!(get_metadata(&conn, "missing").unwrap(), None);
        set_metadata(&conn, "k", "a").unwrap();
        set_metadata(&conn, "k", "b").unwrap();
        assert_eq!(get_metadata(&conn, "k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_vehicle_ids_are_not_reused() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO vehicles (brand) VALUES ('Kia')", []).unwrap();
        conn.execute("INSERT INTO vehicles (brand) VALUES ('Audi')", []).unwrap();
        conn.execute("DELETE FROM vehicles WHERE id = 2", []).unwrap();
        conn.execute("INSERT INTO vehicles (brand) VALUES ('Tesla')", []).unwrap();
        assert_eq!(conn.last_insert_rowid(), 3);
    }

    #[test]
    fn test_negative_cost_rejected_by_schema() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO vehicles (brand) VALUES ('Audi')", []).unwrap();
        let err = conn.execute(
            "INSERT INTO costs (vehicle_id, description, amount) VALUES (1, 'x', -5)",
            [],
        );
        assert!(err.is_err());
    }
}

//! SQLite-based store implementation

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use timegate_util::{DATETIME_FORMAT, IdentityId, parse_datetime};
use tracing::{debug, warn};

use crate::{AccessRecord, AccessStore, StoreError, StoreResult};

/// Bound on any single store call; a hit surfaces as a database error and the
/// caller fails closed.
const BUSY_TIMEOUT: Duration = Duration::from_millis(2000);

/// SQLite-based access record store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- One access record per identity
            CREATE TABLE IF NOT EXISTS access_records (
                identity TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                window_start TEXT NOT NULL,
                window_end TEXT NOT NULL,
                permanent INTEGER NOT NULL DEFAULT 0
            );

            -- Janitor sweep scans by window close
            CREATE INDEX IF NOT EXISTS idx_access_window_end
                ON access_records(window_end);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, bool)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn decode(
        (identity, display_name, start, end, permanent): (String, String, String, String, bool),
    ) -> StoreResult<AccessRecord> {
        let corrupt = |detail: String| StoreError::CorruptRecord {
            identity: identity.clone(),
            detail,
        };

        Ok(AccessRecord {
            identity: identity
                .parse::<IdentityId>()
                .map_err(|e| corrupt(e.to_string()))?,
            display_name,
            window_start: parse_datetime(&start).map_err(|e| corrupt(e.to_string()))?,
            window_end: parse_datetime(&end).map_err(|e| corrupt(e.to_string()))?,
            permanent,
        })
    }
}

impl AccessStore for SqliteStore {
    fn upsert(&self, record: &AccessRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO access_records (identity, display_name, window_start, window_end, permanent)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(identity)
            DO UPDATE SET display_name = excluded.display_name,
                          window_start = excluded.window_start,
                          window_end = excluded.window_end,
                          permanent = excluded.permanent
            "#,
            params![
                record.identity.to_string(),
                record.display_name,
                record.window_start.format(DATETIME_FORMAT).to_string(),
                record.window_end.format(DATETIME_FORMAT).to_string(),
                record.permanent,
            ],
        )?;

        debug!(identity = %record.identity, "Access record upserted");
        Ok(())
    }

    fn find_by_identity(&self, identity: &IdentityId) -> StoreResult<Option<AccessRecord>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT identity, display_name, window_start, window_end, permanent
                 FROM access_records WHERE identity = ?",
                [identity.to_string()],
                Self::row_to_record,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    fn delete_by_identity(&self, identity: &IdentityId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            "DELETE FROM access_records WHERE identity = ?",
            [identity.to_string()],
        )?;

        Ok(rows > 0)
    }

    fn delete_expired(&self, now: chrono::NaiveDateTime) -> StoreResult<usize> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            "DELETE FROM access_records WHERE permanent = 0 AND window_end <= ?",
            [now.format(DATETIME_FORMAT).to_string()],
        )?;

        if rows > 0 {
            debug!(removed = rows, "Expired access records purged");
        }
        Ok(rows)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

//! SQLite store
//!
//! Cells and the action log live in two tables:
//!
//! ```text
//! cells(row_id, column_name, version, data, created_at, updated_at)
//!     PRIMARY KEY (row_id, column_name)
//! action_log(id PRIMARY KEY, name, params, created_at)
//! ```
//!
//! Each transaction checks one connection out of the pool and holds it
//! until commit or drop. Read-write scopes start with `BEGIN IMMEDIATE`
//! (`BEGIN EXCLUSIVE` when serializable isolation is requested) so writers
//! queue on the database lock instead of failing on upgrade; read-only
//! scopes use `BEGIN DEFERRED`.

use crate::pool::{ConnectionPool, PooledConnection};
use crate::traits::{CellUpdate, IsolationLevel, NewCell, Store, StoreTxn, TxnOptions};
use cellstore_core::{ActionRecord, CellRecord, Error, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cells (
    row_id      TEXT    NOT NULL,
    column_name TEXT    NOT NULL,
    version     INTEGER NOT NULL,
    data        BLOB    NOT NULL,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL,
    PRIMARY KEY (row_id, column_name)
);
CREATE TABLE IF NOT EXISTS action_log (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    params      BLOB NOT NULL,
    created_at  TEXT NOT NULL
);
";

const SQL_GET: &str = "SELECT row_id, column_name, version, data, created_at, updated_at \
     FROM cells WHERE row_id = ?1 AND column_name = ?2";
const SQL_INSERT: &str = "INSERT INTO cells (row_id, column_name, version, data, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SQL_UPDATE: &str = "UPDATE cells SET data = ?1, version = ?2, updated_at = ?3 \
     WHERE row_id = ?4 AND column_name = ?5 AND version = ?6";
const SQL_ACTION_INSERT: &str =
    "INSERT INTO action_log (id, name, params, created_at) VALUES (?1, ?2, ?3, ?4)";
const SQL_ACTION_GET: &str = "SELECT id, name, params, created_at FROM action_log WHERE id = ?1";

/// Connection settings for [`SqliteStore`]
#[derive(Debug, Clone, Copy)]
pub struct SqliteOptions {
    /// Number of pooled connections (forced to 1 for in-memory databases)
    pub pool_size: usize,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
    /// How long a caller waits for a free pooled connection
    pub acquire_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            pool_size: 4,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Map a rusqlite error into the store error taxonomy
pub(crate) fn sql_error(e: rusqlite::Error) -> Error {
    Error::Store(e.to_string())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

fn to_sql_version(version: u64) -> Result<i64> {
    i64::try_from(version).map_err(|_| Error::Store(format!("version {} out of range", version)))
}

fn read_cell(row: &rusqlite::Row<'_>) -> rusqlite::Result<CellRecord> {
    let version: i64 = row.get(2)?;
    Ok(CellRecord {
        row_id: row.get(0)?,
        column_name: row.get(1)?,
        version: version as u64,
        data: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn read_action(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActionRecord> {
    Ok(ActionRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        params: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    conn.busy_timeout(busy_timeout).map_err(sql_error)?;
    Ok(())
}

/// SQLite-backed store
#[derive(Debug)]
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>, options: SqliteOptions) -> Result<Self> {
        let path = path.as_ref();
        let size = options.pool_size.max(1);

        let mut connections = Vec::with_capacity(size);
        for i in 0..size {
            let conn = Connection::open(path).map_err(sql_error)?;
            configure(&conn, options.busy_timeout)?;
            if i == 0 {
                // journal_mode returns a row, so it cannot go through execute_batch
                let mode: String = conn
                    .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                    .map_err(sql_error)?;
                conn.execute_batch(SCHEMA).map_err(sql_error)?;
                debug!(journal_mode = %mode, "sqlite schema ready");
            }
            connections.push(conn);
        }

        info!(path = %path.display(), pool_size = size, "opened sqlite store");
        Ok(Self {
            pool: ConnectionPool::new(connections, options.acquire_timeout),
        })
    }

    /// Private in-memory database with a single pooled connection
    pub fn open_in_memory(options: SqliteOptions) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sql_error)?;
        configure(&conn, options.busy_timeout)?;
        conn.execute_batch(SCHEMA).map_err(sql_error)?;
        Ok(Self {
            pool: ConnectionPool::new(vec![conn], options.acquire_timeout),
        })
    }

    /// Number of pooled connections
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// Number of connections currently checked in
    pub fn idle_connections(&self) -> usize {
        self.pool.idle_count()
    }
}

impl Store for SqliteStore {
    type Txn<'s> = SqliteTxn<'s>;

    fn begin(&self, options: TxnOptions) -> Result<SqliteTxn<'_>> {
        let conn = self.pool.acquire()?;
        let statement = match (options.read_only, options.isolation) {
            (true, _) => "BEGIN DEFERRED",
            (false, IsolationLevel::Serializable) => "BEGIN EXCLUSIVE",
            (false, _) => "BEGIN IMMEDIATE",
        };
        conn.execute_batch(statement).map_err(sql_error)?;
        Ok(SqliteTxn {
            conn,
            read_only: options.read_only,
            finished: false,
        })
    }

    fn get(&self, row_id: &str, column_name: &str) -> Result<CellRecord> {
        let conn = self.pool.acquire()?;
        conn.query_row(SQL_GET, params![row_id, column_name], read_cell)
            .optional()
            .map_err(sql_error)?
            .ok_or_else(|| Error::NotFound {
                row: row_id.to_string(),
                column: column_name.to_string(),
            })
    }

    fn append_action(&self, record: &ActionRecord) -> Result<()> {
        let conn = self.pool.acquire()?;
        conn.execute(
            SQL_ACTION_INSERT,
            params![record.id, record.name, record.params, record.created_at],
        )
        .map_err(sql_error)?;
        Ok(())
    }

    fn get_action(&self, id: &str) -> Result<Option<ActionRecord>> {
        let conn = self.pool.acquire()?;
        conn.query_row(SQL_ACTION_GET, params![id], read_action)
            .optional()
            .map_err(sql_error)
    }
}

/// Transaction holding one pooled connection
pub struct SqliteTxn<'s> {
    conn: PooledConnection<'s>,
    read_only: bool,
    finished: bool,
}

impl SqliteTxn<'_> {
    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::Store("transaction is read-only".to_string()));
        }
        Ok(())
    }
}

impl StoreTxn for SqliteTxn<'_> {
    fn insert(&mut self, cell: NewCell<'_>) -> Result<()> {
        self.ensure_writable()?;
        let result = self.conn.execute(
            SQL_INSERT,
            params![
                cell.row_id,
                cell.column_name,
                to_sql_version(cell.version)?,
                cell.data,
                cell.created_at,
                cell.updated_at,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::DuplicateKey {
                row: cell.row_id.to_string(),
                column: cell.column_name.to_string(),
            }),
            Err(e) => Err(sql_error(e)),
        }
    }

    fn update_if_version(&mut self, update: CellUpdate<'_>) -> Result<u64> {
        self.ensure_writable()?;
        let affected = self
            .conn
            .execute(
                SQL_UPDATE,
                params![
                    update.data,
                    to_sql_version(update.next_version()?)?,
                    update.updated_at,
                    update.row_id,
                    update.column_name,
                    to_sql_version(update.expected_version)?,
                ],
            )
            .map_err(sql_error)?;
        Ok(affected as u64)
    }

    fn commit(mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT").map_err(sql_error)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTxn<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!("sqlite txn rolled back"),
            // Connection goes back to the pool either way
            Err(e) => warn!(error = %e, "sqlite rollback failed"),
        }
    }
}

//! Fixed-size SQLite connection pool
//!
//! Connections are checked out for the duration of one call or one
//! transaction and returned when the [`PooledConnection`] guard drops, on
//! every exit path.

use cellstore_core::{Error, Result};
use parking_lot::{Condvar, Mutex};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

/// Pool of open connections to one database
pub struct ConnectionPool {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
    size: usize,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    /// Pool over already-configured connections
    pub fn new(connections: Vec<Connection>, acquire_timeout: Duration) -> Self {
        let size = connections.len();
        Self {
            idle: Mutex::new(connections),
            available: Condvar::new(),
            size,
            acquire_timeout,
        }
    }

    /// Number of connections owned by the pool
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of connections not checked out
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Check out a connection, waiting up to the acquire timeout
    pub fn acquire(&self) -> Result<PooledConnection<'_>> {
        let deadline = Instant::now() + self.acquire_timeout;
        let mut idle = self.idle.lock();
        loop {
            if let Some(conn) = idle.pop() {
                return Ok(PooledConnection {
                    pool: self,
                    conn: Some(conn),
                });
            }
            if self
                .available
                .wait_until(&mut idle, deadline)
                .timed_out()
                && idle.is_empty()
            {
                return Err(Error::Store(format!(
                    "timed out after {:?} waiting for a connection",
                    self.acquire_timeout
                )));
            }
        }
    }

    fn release(&self, conn: Connection) {
        self.idle.lock().push(conn);
        self.available.notify_one();
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("size", &self.size)
            .field("idle", &self.idle_count())
            .finish()
    }
}

/// Checked-out connection; returns to the pool on drop
pub struct PooledConnection<'p> {
    pool: &'p ConnectionPool,
    conn: Option<Connection>,
}

impl std::fmt::Debug for PooledConnection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("pool_size", &self.pool.size)
            .field("released", &self.conn.is_none())
            .finish()
    }
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in drop
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        match &mut self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

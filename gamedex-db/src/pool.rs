//! A fixed pool of read-only connections shared across request handlers.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, TryLockError};

use rusqlite::Connection;

use crate::schema::{SchemaError, open_database};

/// Pool of SQLite connections, handed out round-robin with idle ones
/// preferred.
///
/// Each connection sits behind its own mutex, so up to `size()` queries run
/// at once. Callers are expected to be on a blocking thread.
#[derive(Debug)]
pub struct Database {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl Database {
    /// Open `size` read-only connections to the database at `path`.
    pub fn open(path: &Path, size: usize) -> Result<Self, SchemaError> {
        let connections = (0..size.max(1))
            .map(|_| open_database(path).map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("opened {} connections to {}", connections.len(), path.display());
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Wrap a single existing connection (in-memory databases, tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            connections: vec![Mutex::new(conn)],
            next: AtomicUsize::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Run `f` on an idle connection, starting the search at the next one
    /// in rotation. Waits on the rotation's pick only when all are busy.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let len = self.connections.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;
        for offset in 0..len {
            match self.connections[(start + offset) % len].try_lock() {
                Ok(conn) => return f(&conn),
                Err(TryLockError::Poisoned(poisoned)) => return f(&poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => continue,
            }
        }
        let conn = self.connections[start]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&conn)
    }
}

pub mod error;
pub mod migrations;
pub mod models;
pub mod password;
pub mod questions;
pub mod users;

mod friends;

pub use error::{DbError, Result};
pub use questions::QuestionRepository;
pub use users::UserRepository;

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rusqlite::Connection;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub path: PathBuf,
    pub max_connections: usize,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// Upper bound on a single statement; the connection is interrupted after it.
    pub query_timeout: Duration,
    /// How long SQLite itself retries on a locked database.
    pub busy_timeout: Duration,
}

impl PoolConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle to a fixed-size pool of SQLite connections.
///
/// Cheap to clone; every repository holds its own clone.
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool>,
}

struct Pool {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
    query_timeout: Duration,
}

impl Database {
    pub fn open(config: &PoolConfig) -> Result<Self> {
        let size = config.max_connections.max(1);

        let mut first = open_connection(&config.path, config.busy_timeout)?;
        migrations::run(&mut first)?;

        let mut idle = Vec::with_capacity(size);
        idle.push(first);
        for _ in 1..size {
            idle.push(open_connection(&config.path, config.busy_timeout)?);
        }

        info!(
            "Database opened at {} ({} pooled connections)",
            config.path.display(),
            size
        );
        Ok(Self {
            pool: Arc::new(Pool {
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(size)),
                acquire_timeout: config.acquire_timeout,
                query_timeout: config.query_timeout,
            }),
        })
    }

    /// Check a connection out of the pool, waiting at most `acquire_timeout`.
    /// The connection goes back to the pool when the guard drops.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let wait = self.pool.acquire_timeout;
        let permit = tokio::time::timeout(wait, self.pool.permits.clone().acquire_owned())
            .await
            .map_err(|_| DbError::AcquireTimeout(wait))?
            .map_err(|_| DbError::Connection("connection pool closed".into()))?;

        let conn = self
            .pool
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .ok_or_else(|| DbError::Connection("no idle connection behind permit".into()))?;

        Ok(PooledConnection {
            conn: Some(conn),
            pool: self.pool.clone(),
            _permit: permit,
        })
    }

    /// Run `f` against a pooled connection on the blocking thread pool.
    ///
    /// The connection is released on every path before this returns, except
    /// on timeout: then the statement is interrupted and the connection
    /// returns to the pool once the worker unwinds.
    pub async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.acquire().await?;
        let interrupt = conn.get_interrupt_handle();
        let limit = self.pool.query_timeout;

        let task = tokio::task::spawn_blocking(move || f(&*conn));
        match tokio::time::timeout(limit, task).await {
            Ok(joined) => {
                joined.map_err(|e| DbError::Worker(e.to_string()))?
            }
            Err(_) => {
                interrupt.interrupt();
                warn!("Query exceeded {:?}, interrupted", limit);
                Err(DbError::QueryTimeout(limit))
            }
        }
    }

    /// Connections currently sitting idle in the pool.
    pub fn idle_connections(&self) -> usize {
        self.pool.permits.available_permits()
    }
}

pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<Pool>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("pooled connection used after release")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        // Runs before the permit is released, so a woken waiter always
        // finds a connection.
        if let Some(conn) = self.conn.take() {
            self.pool
                .idle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(conn);
        }
    }
}

fn open_connection(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    let conn = Connection::open(path).map_err(|e| {
        DbError::Connection(format!("cannot open {}: {}", path.display(), e))
    })?;

    // WAL mode for concurrent reads
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(busy_timeout)?;

    Ok(conn)
}

//! Connection Pool and Scoped Sessions

use crate::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite URL or file path (e.g. "sqlite://Resources/hawaii.sqlite")
    pub database_url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Seconds to wait for a free connection before giving up
    pub acquire_timeout_secs: u64,
    /// Open the database read-only and never create it
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://Resources/hawaii.sqlite".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
            read_only: true,
        }
    }
}

/// Process-wide handle on the observation store.
///
/// Cloning is cheap and shares the same pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the pool. Fails with `StoreUnavailable` if the first connection
    /// cannot be established.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StorageError> {
        let timeout = Duration::from_secs(config.acquire_timeout_secs);

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .read_only(config.read_only)
            .create_if_missing(!config.read_only)
            .busy_timeout(timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await?;

        info!(
            "Connected to observation store {} (read_only={}, max_connections={})",
            config.database_url, config.read_only, config.max_connections
        );

        Ok(Self::from_pool(pool))
    }

    pub(crate) fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Acquire a scoped session. The connection goes back to the pool when
    /// the session is dropped.
    pub async fn session(&self) -> Result<Session, StorageError> {
        let conn = self.pool.acquire().await?;
        trace!("Session acquired");
        Ok(Session { conn })
    }

    /// Close every pooled connection; used at shutdown
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Observation store closed");
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// One pooled connection, held for the duration of a request
pub struct Session {
    conn: PoolConnection<Sqlite>,
}

impl Session {
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Session released");
    }
}

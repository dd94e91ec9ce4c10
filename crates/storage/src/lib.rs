//! Observation Store
//!
//! Read-only SQLite access to weather-station observations, with a
//! statically declared schema and one long-lived connection pool.

mod models;
mod pool;
mod queries;
pub mod schema;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use models::{Observation, ObservationDate, PrecipitationReading, TemperatureStats};
pub use pool::{Session, Store, StoreConfig};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// A date string did not parse as `YYYY-MM-DD`
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),
    /// Connection, pool or query failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::StoreUnavailable(err.to_string())
    }
}

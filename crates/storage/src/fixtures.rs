//! Seeding helpers for test stores

use crate::pool::Session;
use crate::{schema, Observation, StorageError, Store};
use sqlx::sqlite::SqlitePoolOptions;

impl Store {
    /// Single-connection in-memory store with the schema installed.
    ///
    /// The one connection is kept alive for the life of the pool, so the
    /// data survives between sessions.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect("sqlite::memory:")
            .await?;

        let store = Self::from_pool(pool);
        let mut session = store.session().await?;
        schema::install(&mut session).await?;
        drop(session);

        Ok(store)
    }
}

impl Session {
    /// Insert one station row
    pub async fn insert_station(&mut self, station: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO station (station) VALUES (?)")
            .bind(station)
            .execute(self.conn())
            .await?;
        Ok(())
    }

    /// Insert one measurement row
    pub async fn insert_measurement(&mut self, row: &Observation) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
            .bind(&row.station)
            .bind(&row.date)
            .bind(row.prcp)
            .bind(row.tobs)
            .execute(self.conn())
            .await?;
        Ok(())
    }
}

/// Shorthand for building a measurement row
pub fn observation(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Observation {
    Observation {
        station: station.to_string(),
        date: date.to_string(),
        prcp,
        tobs,
    }
}

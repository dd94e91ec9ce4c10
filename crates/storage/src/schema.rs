//! Declared Schema
//!
//! The observation tables as this crate expects them. Queries only touch the
//! columns named here; the store may carry more.

use crate::{Session, StorageError};
use tracing::info;

pub const MEASUREMENT_TABLE: &str = "measurement";
pub const STATION_TABLE: &str = "station";

/// `measurement(id, station, date, prcp, tobs)`; `date` is ISO-8601 text
pub const CREATE_MEASUREMENT: &str = "CREATE TABLE IF NOT EXISTS measurement (
    id INTEGER PRIMARY KEY,
    station TEXT NOT NULL,
    date TEXT NOT NULL,
    prcp REAL,
    tobs REAL NOT NULL
)";

/// `station(id, station, name, latitude, longitude, elevation)`
pub const CREATE_STATION: &str = "CREATE TABLE IF NOT EXISTS station (
    id INTEGER PRIMARY KEY,
    station TEXT NOT NULL UNIQUE,
    name TEXT,
    latitude REAL,
    longitude REAL,
    elevation REAL
)";

/// Create both tables on an empty store. Never needed against a populated,
/// read-only dataset.
pub async fn install(session: &mut Session) -> Result<(), StorageError> {
    for ddl in [CREATE_STATION, CREATE_MEASUREMENT] {
        sqlx::query(ddl).execute(session.conn()).await?;
    }

    info!("Installed {} and {} tables", STATION_TABLE, MEASUREMENT_TABLE);
    Ok(())
}

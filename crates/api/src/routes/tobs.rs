//! Temperature Observation Routes

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use storage::Observation;
use tracing::debug;

use crate::config::StationMode;
use crate::error::ApiError;
use crate::session::DbSession;
use crate::AppState;

/// Every observation of the reporting station, flattened row by row into
/// `[station, date, prcp, tobs, station, date, ...]`
pub async fn get_tobs(
    State(state): State<Arc<AppState>>,
    DbSession(mut session): DbSession,
) -> Result<Json<Vec<Value>>, ApiError> {
    let reporting = &state.reporting;

    let station = match reporting.station_mode {
        StationMode::Fixed => Some(reporting.station_id.clone()),
        StationMode::MostActive => session.most_active_station().await?,
    };

    let Some(station) = station else {
        debug!("No measurements, no active station");
        return Ok(Json(Vec::new()));
    };

    let rows = session.observations_for_station(&station).await?;
    Ok(Json(flatten(rows)))
}

fn flatten(rows: Vec<Observation>) -> Vec<Value> {
    rows.into_iter()
        .flat_map(|row| {
            [
                Value::from(row.station),
                Value::from(row.date),
                row.prcp.map_or(Value::Null, Value::from),
                Value::from(row.tobs),
            ]
        })
        .collect()
}

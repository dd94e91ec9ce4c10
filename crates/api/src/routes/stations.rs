//! Station Routes

use axum::Json;

use crate::error::ApiError;
use crate::session::DbSession;

/// List every station id
pub async fn get_stations(
    DbSession(mut session): DbSession,
) -> Result<Json<Vec<String>>, ApiError> {
    let ids = session.all_station_ids().await?;
    Ok(Json(ids))
}

//! Precipitation Routes

use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;
use storage::{ObservationDate, Session};
use tracing::{debug, warn};

use crate::config::{ReferenceDateMode, ReportingConfig};
use crate::error::ApiError;
use crate::session::DbSession;
use crate::AppState;

/// Date → precipitation. Dates reported by several stations keep the value
/// of the last row in storage order.
pub type PrecipitationResponse = BTreeMap<String, Option<f64>>;

/// Get precipitation for the year before the reference date
pub async fn get_precipitation(
    State(state): State<Arc<AppState>>,
    DbSession(mut session): DbSession,
) -> Result<Json<PrecipitationResponse>, ApiError> {
    let reporting = &state.reporting;
    let reference = reference_date(reporting, &mut session).await?;
    let Some(cutoff) = reference.days_before(reporting.window_days) else {
        warn!(
            "reporting.window_days {} reaches past the earliest date from reference {}",
            reporting.window_days, reference
        );
        return Err(ApiError::StoreUnavailable(format!(
            "precipitation window misconfigured: reporting.window_days {} before {} is out of range",
            reporting.window_days, reference
        )));
    };

    debug!("Precipitation cutoff {} (reference {})", cutoff, reference);

    let readings = session.precipitation_since(cutoff).await?;
    let by_date = readings.into_iter().map(|r| (r.date, r.prcp)).collect();

    Ok(Json(by_date))
}

async fn reference_date(
    reporting: &ReportingConfig,
    session: &mut Session,
) -> Result<ObservationDate, ApiError> {
    match reporting.reference_mode {
        ReferenceDateMode::Fixed => Ok(reporting.reference_date),
        ReferenceDateMode::Latest => Ok(session
            .latest_observation_date()
            .await?
            .unwrap_or(reporting.reference_date)),
    }
}

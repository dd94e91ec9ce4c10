//! Temperature Range Routes

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    Json,
};
use storage::{ObservationDate, TemperatureStats};

use crate::error::ApiError;
use crate::session::DbSession;

/// `{start}/{end}` path segments, both validated as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: ObservationDate,
    pub end: ObservationDate,
}

#[async_trait]
impl<S> FromRequestParts<S> for DateRange
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((start, end)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidDate(rejection.body_text()))?;

        Ok(Self {
            start: ObservationDate::parse(&start)?,
            end: ObservationDate::parse(&end)?,
        })
    }
}

/// `[min, max, avg]` of observed temperature over an inclusive date range.
///
/// The range is extracted first so a malformed date never takes a session.
pub async fn get_temperature_range(
    range: DateRange,
    DbSession(mut session): DbSession,
) -> Result<Json<TemperatureStats>, ApiError> {
    let stats = session.temperature_stats(range.start, range.end).await?;
    Ok(Json(stats))
}

//! Scoped store sessions
//!
//! `DbSession` acquires a pooled connection before the handler runs and
//! hands it over by value. The connection returns to the pool whenever the
//! handler future is dropped, including when the request timeout cuts it off.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use storage::Session;

use crate::{error::ApiError, AppState};

/// Extractor holding one store session for the request
pub struct DbSession(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for DbSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        metrics::counter!("store_sessions_total").increment(1);
        let session = state.store.session().await?;
        Ok(DbSession(session))
    }
}

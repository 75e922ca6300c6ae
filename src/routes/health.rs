//! Health check endpoint
//!
//! `/health` and `/healthz` report liveness plus the active store and
//! notifier backends.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::{json_response, FullBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub store: &'static str,
    pub notifier: &'static str,
    pub prohibited_terms: usize,
}

pub fn health_check(state: Arc<AppState>) -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.started_at.elapsed().as_secs(),
            store: state.listings.store().backend(),
            notifier: state.notifier,
            prohibited_terms: state.term_count,
        },
    )
}

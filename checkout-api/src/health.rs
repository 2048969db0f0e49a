use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub health: Vec<ServiceHealth>,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub service: String,
    pub status: &'static str,
    pub time: String,
}

impl ServiceHealth {
    fn new(service: String, ok: bool) -> Self {
        Self {
            service,
            status: if ok { "OK" } else { "err" },
            time: Utc::now().to_rfc3339(),
        }
    }
}

/// GET /health: the service itself plus its order store.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_ok = match state.repository.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Order store health check failed");
            false
        }
    };

    Json(HealthReport {
        health: vec![
            ServiceHealth::new(state.service_name.clone(), true),
            ServiceHealth::new(format!("{}-db", state.service_name), db_ok),
        ],
    })
}

/// GET /metrics in the Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

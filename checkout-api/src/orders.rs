use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use checkout_order::NewOrderRequest;
use checkout_shared::CustomerOrder;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/orders", post(create_order))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<NewOrderRequest>,
) -> Result<(StatusCode, Json<CustomerOrder>), AppError> {
    let order = state.aggregator.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod health;
pub mod middleware;
pub mod orders;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(orders::routes())
        .merge(health::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_latency,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

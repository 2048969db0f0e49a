use std::sync::Arc;

use checkout_core::OrderRepository;
use checkout_order::OrderAggregator;

use crate::middleware::metrics::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<OrderAggregator>,
    pub repository: Arc<dyn OrderRepository>,
    pub metrics: Arc<HttpMetrics>,
    pub service_name: String,
}

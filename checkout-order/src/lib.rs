pub mod error;
pub mod fetcher;
pub mod finance;
pub mod models;
pub mod orchestrator;
pub mod pool;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::OrderError;
pub use fetcher::{FetchError, FetchHandle, ResourceFetcher};
pub use finance::{calculate_total, SHIPPING_FEE};
pub use models::{NewOrderRequest, OrderReferences, OrderStage};
pub use orchestrator::{AggregatorConfig, OrderAggregator};
pub use pool::WorkerPool;

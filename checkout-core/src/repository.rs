use async_trait::async_trait;
use checkout_shared::CustomerOrder;

use crate::CoreResult;

/// Persistence gateway for composite orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store the order and return it with its assigned id.
    async fn save(&self, order: CustomerOrder) -> CoreResult<CustomerOrder>;

    /// Liveness check used by the health endpoint.
    async fn ping(&self) -> CoreResult<()>;
}

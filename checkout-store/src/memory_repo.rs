use std::collections::HashMap;

use async_trait::async_trait;
use checkout_core::{CoreResult, OrderRepository};
use checkout_shared::CustomerOrder;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, CustomerOrder>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &Uuid) -> Option<CustomerOrder> {
        self.orders.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: CustomerOrder) -> CoreResult<CustomerOrder> {
        let id = Uuid::new_v4();
        let order = order.with_id(id);
        self.orders.write().await.insert(id, order.clone());
        Ok(order)
    }

    async fn ping(&self) -> CoreResult<()> {
        Ok(())
    }
}

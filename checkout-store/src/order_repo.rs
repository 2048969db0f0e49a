use async_trait::async_trait;
use checkout_core::{CoreError, CoreResult, OrderRepository};
use checkout_shared::CustomerOrder;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Stores each order as one JSONB document keyed by its id.
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn save(&self, order: CustomerOrder) -> CoreResult<CustomerOrder> {
        let id = Uuid::new_v4();
        let order = order.with_id(id);

        sqlx::query(
            r#"
            INSERT INTO customer_orders (id, customer_id, document, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(&order.customer_id)
        .bind(Json(&order))
        .bind(order.date)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        debug!(order_id = %id, "Order row inserted");
        Ok(order)
    }

    async fn ping(&self) -> CoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

fn storage_error(e: sqlx::Error) -> CoreError {
    CoreError::StorageError(e.to_string())
}

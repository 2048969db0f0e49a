use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{Address, Card, Customer, Item, Shipment};

/// The composite order handed to the persistence gateway.
///
/// Built once after every upstream call succeeded. `id` stays `None` until the
/// repository assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub customer_id: String,
    pub customer: Customer,
    pub address: Address,
    pub card: Card,
    pub items: Vec<Item>,
    pub shipment: Shipment,
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CustomerOrder {
    pub fn new(
        customer_id: String,
        customer: Customer,
        address: Address,
        card: Card,
        items: Vec<Item>,
        shipment: Shipment,
        total: Decimal,
    ) -> Self {
        Self {
            id: None,
            customer_id,
            customer,
            address,
            card,
            items,
            shipment,
            date: Utc::now(),
            total,
        }
    }

    /// Returns the same order carrying a persistence id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OrderError;

/// Inbound order-creation request. Every field is a locator of a resource
/// owned by another service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrderRequest {
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub items: Option<String>,
}

/// The four locators of a request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReferences {
    pub customer: String,
    pub address: String,
    pub card: String,
    pub items: String,
}

impl NewOrderRequest {
    pub fn new(customer: &str, address: &str, card: &str, items: &str) -> Self {
        Self {
            customer: Some(customer.to_string()),
            address: Some(address.to_string()),
            card: Some(card.to_string()),
            items: Some(items.to_string()),
        }
    }

    /// Require all four references to be present and non-blank.
    pub fn validate(self) -> Result<OrderReferences, OrderError> {
        fn required(value: Option<String>) -> Result<String, OrderError> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(OrderError::InvalidOrder),
            }
        }

        Ok(OrderReferences {
            customer: required(self.customer)?,
            address: required(self.address)?,
            card: required(self.card)?,
            items: required(self.items)?,
        })
    }
}

/// Stages of a single order-creation attempt, in the order they run.
///
/// There is no way back: an attempt either reaches `Done` or aborts in the
/// stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStage {
    Validating,
    FetchingDependencies,
    ComputingTotal,
    AwaitingPayment,
    ValidatingPayment,
    RequestingShipment,
    Assembling,
    Persisting,
    Done,
}

impl OrderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStage::Validating => "validating",
            OrderStage::FetchingDependencies => "fetching_dependencies",
            OrderStage::ComputingTotal => "computing_total",
            OrderStage::AwaitingPayment => "awaiting_payment",
            OrderStage::ValidatingPayment => "validating_payment",
            OrderStage::RequestingShipment => "requesting_shipment",
            OrderStage::Assembling => "assembling",
            OrderStage::Persisting => "persisting",
            OrderStage::Done => "done",
        }
    }
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

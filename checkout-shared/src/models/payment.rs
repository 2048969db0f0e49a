use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entities::{Address, Card, Customer};

/// Body posted to the payment service once every dependency has resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub address: Address,
    pub card: Card,
    pub customer: Customer,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub authorised: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl PaymentResponse {
    pub fn authorised() -> Self {
        Self {
            authorised: true,
            message: Some("Payment authorised".to_string()),
        }
    }

    pub fn declined(message: &str) -> Self {
        Self {
            authorised: false,
            message: Some(message.to_string()),
        }
    }
}

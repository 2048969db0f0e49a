use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::pii::Masked;

/// Shipping address owned by the user service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
}

/// Payment card. Number and CCV are masked in any `Debug` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub long_num: Masked<String>,
    #[serde(default)]
    pub expires: String,
    #[serde(default)]
    pub ccv: Masked<String>,
}

/// A cart line as returned by the cart service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub quantity: u32,
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "non_negative_price"
    )]
    pub unit_price: Decimal,
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let price = rust_decimal::serde::float::deserialize(deserializer)?;
    if price < Decimal::ZERO {
        return Err(de::Error::custom(format!("unitPrice must not be negative, got {}", price)));
    }
    Ok(price)
}

impl Item {
    pub fn new(item_id: &str, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            id: None,
            item_id: Some(item_id.to_string()),
            quantity,
            unit_price,
        }
    }

    /// `quantity × unit_price`, or `None` if the product overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// Shipment created by the shipping service for a paid order.
///
/// The shipping service echoes the customer id back as `name`, so that key is
/// accepted as well when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub customer_id: String,
}

impl Shipment {
    pub fn for_customer(customer_id: &str) -> Self {
        Self {
            id: None,
            customer_id: customer_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_decodes_numeric_price() {
        let item: Item =
            serde_json::from_str(r#"{"itemId":"sock-1","quantity":2,"unitPrice":9.00}"#).unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.line_total(), Some(Decimal::new(18, 0)));
    }

    #[test]
    fn test_item_rejects_negative_quantity() {
        let result: Result<Item, _> =
            serde_json::from_str(r#"{"quantity":-1,"unitPrice":1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_item_rejects_negative_price() {
        let result: Result<Item, _> =
            serde_json::from_str(r#"{"quantity":1,"unitPrice":-0.01}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("unitPrice must not be negative"));
    }

    #[test]
    fn test_item_accepts_free_line() {
        let item: Item = serde_json::from_str(r#"{"quantity":3,"unitPrice":0}"#).unwrap();
        assert_eq!(item.line_total(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        let item = Item::new("sock-1", u32::MAX, Decimal::MAX);
        assert_eq!(item.line_total(), None);
    }

    #[test]
    fn test_card_debug_is_masked() {
        let card = Card {
            id: Some("card-4".to_string()),
            long_num: Masked::from("5544154011345918"),
            expires: "08/27".to_string(),
            ccv: Masked::from("958"),
        };
        let rendered = format!("{:?}", card);
        assert!(!rendered.contains("5544154011345918"));
        assert!(!rendered.contains("958"));
    }

    #[test]
    fn test_shipment_accepts_name_alias() {
        let shipment: Shipment =
            serde_json::from_str(r#"{"id":"ship-1","name":"9"}"#).unwrap();
        assert_eq!(shipment.customer_id, "9");
    }
}

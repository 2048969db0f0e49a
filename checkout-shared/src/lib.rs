pub mod models;
pub mod pii;

pub use models::{
    Address, Card, Customer, CustomerOrder, HalResource, Item, Link, Links, PaymentRequest,
    PaymentResponse, Shipment,
};
pub use pii::Masked;

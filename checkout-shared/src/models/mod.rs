pub mod entities;
pub mod order;
pub mod payment;
pub mod resource;

pub use entities::{Address, Card, Customer, Item, Shipment};
pub use order::CustomerOrder;
pub use payment::{PaymentRequest, PaymentResponse};
pub use resource::{HalResource, Link, Links};

//! In-process doubles for the remote services and the persistence gateway.
//!
//! Compiled for this crate's tests and, through the `test-utils` feature,
//! for the API crate's integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use checkout_core::{CoreError, CoreResult, OrderRepository, RemoteClient, RemoteError};
use checkout_shared::{Customer, CustomerOrder, HalResource, PaymentResponse};
use serde_json::{json, Value};
use uuid::Uuid;

pub const PAYMENT_URI: &str = "http://payment/paymentAuth";
pub const SHIPPING_URI: &str = "http://shipping/shipping";

pub const ADDRESS_REF: &str = "/addr/1";
pub const CUSTOMER_REF: &str = "/cust/9";
pub const CARD_REF: &str = "/card/4";
pub const ITEMS_REF: &str = "/carts/9/items";

/// Canned answer for one locator.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Empty,
    Status(u16),
    Transport(String),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Reply::Json(value)
    }

    /// Answer only after `delay`.
    pub fn after(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub locator: String,
    pub body: Option<Value>,
}

/// Remote client answering from a per-locator script and logging every call.
/// Unscripted locators answer HTTP 404.
#[derive(Default)]
pub struct ScriptedRemoteClient {
    gets: Mutex<HashMap<String, Reply>>,
    posts: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRemoteClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client scripted for the happy path: one cart line of 2 × 9.00, an
    /// authorised payment and a created shipment for customer `9`.
    pub fn happy_path() -> Self {
        let client = Self::new();
        client.on_get(
            ADDRESS_REF,
            Reply::json(json!({
                "number": "246",
                "street": "Whitelees Road",
                "city": "Glasgow",
                "postcode": "G67 3DL",
                "country": "United Kingdom",
                "_links": {"self": {"href": "http://user/addresses/1"}}
            })),
        );
        let customer = Customer {
            id: None,
            first_name: "Eve".to_string(),
            last_name: "Berger".to_string(),
            username: "Eve_Berger".to_string(),
        };
        client.on_get(
            CUSTOMER_REF,
            Reply::json(json!(HalResource::new(customer, "http://user/customers/9"))),
        );
        client.on_get(
            CARD_REF,
            Reply::json(json!({
                "longNum": "5544154011345918",
                "expires": "08/27",
                "ccv": "958",
                "_links": {"self": {"href": "http://user/cards/4"}}
            })),
        );
        client.on_get(
            ITEMS_REF,
            Reply::json(json!([{"itemId": "sock-1", "quantity": 2, "unitPrice": 9.00}])),
        );
        client.on_post(PAYMENT_URI, Reply::json(json!(PaymentResponse::authorised())));
        client.on_post(SHIPPING_URI, Reply::json(json!({"id": "ship-1", "name": "9"})));
        client
    }

    pub fn on_get(&self, locator: &str, reply: Reply) {
        lock(&self.gets).insert(locator.to_string(), reply);
    }

    pub fn on_post(&self, locator: &str, reply: Reply) {
        lock(&self.posts).insert(locator.to_string(), reply);
    }

    /// Hold back the scripted GET answer for `locator` by `delay`.
    pub fn delay_get(&self, locator: &str, delay: Duration) {
        let mut gets = lock(&self.gets);
        if let Some(reply) = gets.remove(locator) {
            gets.insert(locator.to_string(), reply.after(delay));
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, method: Method, locator: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method && c.locator == locator)
            .count()
    }

    /// Body of the most recent POST to `locator`.
    pub fn posted_body(&self, locator: &str) -> Option<Value> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|c| c.method == Method::Post && c.locator == locator)
            .and_then(|c| c.body.clone())
    }

    fn record(&self, method: Method, locator: &str, body: Option<Value>) {
        lock(&self.calls).push(Call {
            method,
            locator: locator.to_string(),
            body,
        });
    }

    async fn answer(locator: &str, reply: Option<Reply>) -> Result<Option<Value>, RemoteError> {
        let mut reply = reply.unwrap_or(Reply::Status(404));
        loop {
            match reply {
                Reply::Json(Value::Null) | Reply::Empty => return Ok(None),
                Reply::Json(value) => return Ok(Some(value)),
                Reply::Status(status) => {
                    return Err(RemoteError::Status {
                        locator: locator.to_string(),
                        status,
                    })
                }
                Reply::Transport(detail) => {
                    return Err(RemoteError::Transport {
                        locator: locator.to_string(),
                        detail,
                    })
                }
                Reply::Delayed(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
            }
        }
    }
}

#[async_trait]
impl RemoteClient for ScriptedRemoteClient {
    async fn get(&self, locator: &str) -> Result<Option<Value>, RemoteError> {
        self.record(Method::Get, locator, None);
        let reply = lock(&self.gets).get(locator).cloned();
        Self::answer(locator, reply).await
    }

    async fn post(&self, locator: &str, body: &Value) -> Result<Option<Value>, RemoteError> {
        self.record(Method::Post, locator, Some(body.clone()));
        let reply = lock(&self.posts).get(locator).cloned();
        Self::answer(locator, reply).await
    }
}

/// Repository that keeps saved orders in a list and can be told to fail.
#[derive(Default)]
pub struct RecordingOrderRepository {
    saved: Mutex<Vec<CustomerOrder>>,
    failing: Mutex<bool>,
}

impl RecordingOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let repo = Self::default();
        *lock(&repo.failing) = true;
        repo
    }

    pub fn saved(&self) -> Vec<CustomerOrder> {
        lock(&self.saved).clone()
    }
}

#[async_trait]
impl OrderRepository for RecordingOrderRepository {
    async fn save(&self, order: CustomerOrder) -> CoreResult<CustomerOrder> {
        if *lock(&self.failing) {
            return Err(CoreError::StorageError("storage offline".to_string()));
        }
        let saved = order.with_id(Uuid::new_v4());
        lock(&self.saved).push(saved.clone());
        Ok(saved)
    }

    async fn ping(&self) -> CoreResult<()> {
        if *lock(&self.failing) {
            return Err(CoreError::StorageError("storage offline".to_string()));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

//! Order aggregation.
//!
//! One call to [`OrderAggregator::create_order`] is one attempt: validate the
//! request, fan out four reads, join them under a single deadline, then run
//! the payment and shipment writes in sequence before persisting. Any failure
//! aborts the whole attempt. Nothing is retried and nothing is rolled back.

use std::sync::Arc;
use std::time::Duration;

use checkout_core::identity::parse_resource_id;
use checkout_core::OrderRepository;
use checkout_shared::{
    Address, Card, Customer, CustomerOrder, HalResource, Item, PaymentRequest, PaymentResponse,
    Shipment,
};
use futures_util::future::try_join4;
use futures_util::TryFutureExt;
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::OrderError;
use crate::fetcher::{FetchError, FetchHandle, ResourceFetcher};
use crate::finance::calculate_total;
use crate::models::{NewOrderRequest, OrderStage};

const UNPARSEABLE_AUTHORISATION: &str = "Unable to parse authorisation packet";
const DEFAULT_DECLINE: &str = "Payment declined";

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub payment_uri: String,
    pub shipping_uri: String,
    /// Applied separately to the dependency join, the payment call and the
    /// shipment call.
    pub timeout: Duration,
}

impl AggregatorConfig {
    pub fn new(
        payment_uri: impl Into<String>,
        shipping_uri: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            payment_uri: payment_uri.into(),
            shipping_uri: shipping_uri.into(),
            timeout,
        }
    }
}

pub struct OrderAggregator {
    fetcher: ResourceFetcher,
    repository: Arc<dyn OrderRepository>,
    config: AggregatorConfig,
}

impl OrderAggregator {
    pub fn new(
        fetcher: ResourceFetcher,
        repository: Arc<dyn OrderRepository>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            fetcher,
            repository,
            config,
        }
    }

    /// Run one order-creation attempt and return the persisted order.
    pub async fn create_order(
        &self,
        request: NewOrderRequest,
    ) -> Result<CustomerOrder, OrderError> {
        let attempt = Uuid::new_v4();
        let span = info_span!("create_order", %attempt);

        async move {
            let result = self.run(request).await;
            match &result {
                Ok(order) => info!(
                    order_id = ?order.id,
                    customer_id = %order.customer_id,
                    total = %order.total,
                    "Order created"
                ),
                Err(e) if e.is_client_error() => {
                    warn!(stage = %e.stage(), detail = %e.detail(), "Order attempt rejected")
                }
                Err(e) => error!(stage = %e.stage(), detail = %e.detail(), "Order attempt failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: NewOrderRequest) -> Result<CustomerOrder, OrderError> {
        debug!(stage = %OrderStage::Validating, "Validating request");
        let refs = request.validate()?;

        debug!(stage = %OrderStage::FetchingDependencies, "Fetching order dependencies");
        let address = self
            .fetcher
            .fetch::<HalResource<Address>>(&refs.address)
            .map_err(dependency_failed);
        let customer = self
            .fetcher
            .fetch::<HalResource<Customer>>(&refs.customer)
            .map_err(dependency_failed);
        let card = self
            .fetcher
            .fetch::<HalResource<Card>>(&refs.card)
            .map_err(dependency_failed);
        let items = self.fetcher.fetch::<Vec<Item>>(&refs.items);
        let priced_items = async move {
            let items = items.await.map_err(dependency_failed)?;
            let total = calculate_total(&items).ok_or_else(|| OrderError::IllegalState {
                stage: OrderStage::ComputingTotal,
                message: "Order total exceeds the representable amount".to_string(),
            })?;
            debug!(
                stage = %OrderStage::ComputingTotal,
                %total,
                lines = items.len(),
                "Computed total"
            );
            Ok::<_, OrderError>((items, total))
        };

        let joined = try_join4(address, customer, card, priced_items);
        let (address, customer, card, (items, total)) =
            match timeout(self.config.timeout, joined).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(OrderError::Timeout {
                        stage: OrderStage::FetchingDependencies,
                        after: self.config.timeout,
                    })
                }
            };

        let customer_href = customer.self_href().map(str::to_string);
        let address = address.into_content();
        let customer = customer.into_content();
        let card = card.into_content();

        debug!(
            stage = %OrderStage::AwaitingPayment,
            amount = %total,
            "Requesting payment authorisation"
        );
        let payment = PaymentRequest {
            address: address.clone(),
            card: card.clone(),
            customer: customer.clone(),
            amount: total,
        };
        let handle = self
            .fetcher
            .submit::<_, PaymentResponse>(&self.config.payment_uri, &payment);
        let response = match self.within_deadline(OrderStage::AwaitingPayment, handle).await? {
            Ok(Some(response)) => response,
            Ok(None) | Err(FetchError::Decode { .. }) => {
                return Err(OrderError::PaymentDeclined(UNPARSEABLE_AUTHORISATION.to_string()))
            }
            Err(source) => {
                return Err(OrderError::UpstreamFetchFailed {
                    stage: OrderStage::AwaitingPayment,
                    source,
                })
            }
        };

        debug!(
            stage = %OrderStage::ValidatingPayment,
            authorised = response.authorised,
            "Received payment response"
        );
        if !response.authorised {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DECLINE.to_string());
            return Err(OrderError::PaymentDeclined(message));
        }

        let customer_id = customer_id_from(customer_href.as_deref())?;
        debug!(stage = %OrderStage::RequestingShipment, %customer_id, "Requesting shipment");
        let shipment_request = Shipment::for_customer(&customer_id);
        let handle = self
            .fetcher
            .submit::<_, Shipment>(&self.config.shipping_uri, &shipment_request);
        let shipment = match self.within_deadline(OrderStage::RequestingShipment, handle).await? {
            Ok(Some(shipment)) => shipment,
            Ok(None) => {
                return Err(OrderError::UpstreamFetchFailed {
                    stage: OrderStage::RequestingShipment,
                    source: FetchError::EmptyBody {
                        locator: self.config.shipping_uri.clone(),
                    },
                })
            }
            Err(source) => {
                return Err(OrderError::UpstreamFetchFailed {
                    stage: OrderStage::RequestingShipment,
                    source,
                })
            }
        };

        debug!(stage = %OrderStage::Assembling, "Assembling order");
        let order =
            CustomerOrder::new(customer_id, customer, address, card, items, shipment, total);

        debug!(stage = %OrderStage::Persisting, "Saving order");
        let saved = self
            .repository
            .save(order)
            .await
            .map_err(OrderError::Persistence)?;

        debug!(stage = %OrderStage::Done, "Order attempt complete");
        Ok(saved)
    }

    /// Join `handle` under the configured deadline. Only the deadline is
    /// mapped here; the call's own outcome is left to the caller.
    async fn within_deadline<T>(
        &self,
        stage: OrderStage,
        handle: FetchHandle<T>,
    ) -> Result<Result<T, FetchError>, OrderError> {
        timeout(self.config.timeout, handle)
            .await
            .map_err(|_| OrderError::Timeout {
                stage,
                after: self.config.timeout,
            })
    }
}

fn dependency_failed(source: FetchError) -> OrderError {
    OrderError::UpstreamFetchFailed {
        stage: OrderStage::FetchingDependencies,
        source,
    }
}

fn customer_id_from(href: Option<&str>) -> Result<String, OrderError> {
    let href = href.ok_or_else(|| OrderError::IllegalState {
        stage: OrderStage::RequestingShipment,
        message: "Customer resource carries no self link".to_string(),
    })?;
    parse_resource_id(href)
        .map(str::to_string)
        .map_err(|e| OrderError::IllegalState {
            stage: OrderStage::RequestingShipment,
            message: e.to_string(),
        })
}

use std::time::Duration;

use checkout_core::CoreError;

use crate::fetcher::FetchError;
use crate::models::OrderStage;

/// Why an order-creation attempt was aborted.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order request. Order requires customer, address, card and items.")]
    InvalidOrder,

    #[error("Unable to create order due to unspecified IO error.")]
    UpstreamFetchFailed {
        stage: OrderStage,
        #[source]
        source: FetchError,
    },

    #[error("Unable to create order due to timeout from one of the services.")]
    Timeout { stage: OrderStage, after: Duration },

    #[error("{0}")]
    PaymentDeclined(String),

    #[error("{message}")]
    IllegalState { stage: OrderStage, message: String },

    #[error("Unable to create order due to unspecified IO error.")]
    Persistence(#[source] CoreError),
}

impl OrderError {
    /// The stage the attempt was in when it aborted.
    pub fn stage(&self) -> OrderStage {
        match self {
            OrderError::InvalidOrder => OrderStage::Validating,
            OrderError::UpstreamFetchFailed { stage, .. } => *stage,
            OrderError::Timeout { stage, .. } => *stage,
            OrderError::PaymentDeclined(_) => OrderStage::ValidatingPayment,
            OrderError::IllegalState { stage, .. } => *stage,
            OrderError::Persistence(_) => OrderStage::Persisting,
        }
    }

    /// Faults caused by the request or the customer rather than by this
    /// service or its dependencies.
    pub fn is_client_error(&self) -> bool {
        matches!(self, OrderError::InvalidOrder | OrderError::PaymentDeclined(_))
    }

    /// The underlying cause, for logs.
    pub fn detail(&self) -> String {
        match self {
            OrderError::UpstreamFetchFailed { source, .. } => source.to_string(),
            OrderError::Timeout { after, .. } => format!("no answer within {:?}", after),
            OrderError::Persistence(source) => source.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::RemoteError;

    #[test]
    fn test_client_errors() {
        assert!(OrderError::InvalidOrder.is_client_error());
        assert!(OrderError::PaymentDeclined("insufficient funds".into()).is_client_error());
        assert!(!OrderError::Timeout {
            stage: OrderStage::FetchingDependencies,
            after: Duration::from_secs(5),
        }
        .is_client_error());
    }

    #[test]
    fn test_declined_message_is_forwarded() {
        let err = OrderError::PaymentDeclined("insufficient funds".into());
        assert_eq!(err.to_string(), "insufficient funds");
        assert_eq!(err.stage(), OrderStage::ValidatingPayment);
    }

    #[test]
    fn test_upstream_detail_keeps_cause() {
        let err = OrderError::UpstreamFetchFailed {
            stage: OrderStage::FetchingDependencies,
            source: FetchError::Remote(RemoteError::Status {
                locator: "/addr/1".into(),
                status: 503,
            }),
        };
        assert_eq!(err.to_string(), "Unable to create order due to unspecified IO error.");
        assert!(err.detail().contains("503"));
    }
}

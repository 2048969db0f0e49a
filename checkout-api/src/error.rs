use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkout_order::OrderError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// The request or the customer's payment was refused.
    NotAcceptable(String),
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        if err.is_client_error() {
            AppError::NotAcceptable(err.to_string())
        } else {
            AppError::InternalServerError(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotAcceptable(msg) => msg,
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                msg
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or_default(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_order::OrderStage;
    use std::time::Duration;

    #[test]
    fn test_order_errors_map_to_status() {
        let declined: AppError = OrderError::PaymentDeclined("insufficient funds".into()).into();
        assert_eq!(declined.status(), StatusCode::NOT_ACCEPTABLE);

        let invalid: AppError = OrderError::InvalidOrder.into();
        assert_eq!(invalid.status(), StatusCode::NOT_ACCEPTABLE);

        let timeout: AppError = OrderError::Timeout {
            stage: OrderStage::FetchingDependencies,
            after: Duration::from_secs(5),
        }
        .into();
        assert_eq!(timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let illegal: AppError = OrderError::IllegalState {
            stage: OrderStage::RequestingShipment,
            message: "bad link".into(),
        }
        .into();
        assert_eq!(illegal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_is_caller_facing_text() {
        match AppError::from(OrderError::PaymentDeclined("insufficient funds".into())) {
            AppError::NotAcceptable(msg) => assert_eq!(msg, "insufficient funds"),
            other => panic!("unexpected {:?}", other),
        }
    }
}

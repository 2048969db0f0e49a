//! Remote resource fetcher.
//!
//! Every call is dispatched to the shared [`WorkerPool`] as soon as it is
//! made and handed back as a [`FetchHandle`], so the caller decides when (and
//! under which deadline) to join.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use checkout_core::{RemoteClient, RemoteError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::pool::WorkerPool;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("{locator} returned no body")]
    EmptyBody { locator: String },
    #[error("could not decode body from {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("fetch task ended abnormally: {0}")]
    Aborted(String),
}

/// In-flight remote call.
///
/// Resolves to the call's result. Dropping an unresolved handle aborts the
/// underlying task, which is how siblings of a failed join get cancelled.
#[must_use = "a FetchHandle does nothing useful unless awaited"]
pub struct FetchHandle<T> {
    task: JoinHandle<Result<T, FetchError>>,
}

impl<T> Future for FetchHandle<T> {
    type Output = Result<T, FetchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => {
                Poll::Ready(Err(FetchError::Aborted(join_err.to_string())))
            }
        }
    }
}

impl<T> Drop for FetchHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Clone)]
pub struct ResourceFetcher {
    client: Arc<dyn RemoteClient>,
    pool: WorkerPool,
}

impl ResourceFetcher {
    pub fn new(client: Arc<dyn RemoteClient>, pool: WorkerPool) -> Self {
        Self { client, pool }
    }

    /// GET `locator` and decode the body into `T`. An empty body is an error.
    pub fn fetch<T>(&self, locator: &str) -> FetchHandle<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let locator = locator.to_string();
        let task = self.pool.spawn(async move { get_resource(client.as_ref(), &locator).await });
        FetchHandle { task }
    }

    /// POST `payload` as JSON to `locator`.
    ///
    /// Resolves to `None` when the remote answered with an empty body.
    pub fn submit<B, T>(&self, locator: &str, payload: &B) -> FetchHandle<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let locator = locator.to_string();
        let body = serde_json::to_value(payload).map_err(FetchError::Encode);
        let task = self.pool.spawn(async move {
            match body {
                Ok(body) => post_resource(client.as_ref(), &locator, &body).await,
                Err(e) => Err(e),
            }
        });
        FetchHandle { task }
    }
}

async fn get_resource<T: DeserializeOwned>(
    client: &dyn RemoteClient,
    locator: &str,
) -> Result<T, FetchError> {
    debug!(%locator, "Requesting resource");
    let body = client
        .get(locator)
        .await?
        .ok_or_else(|| FetchError::EmptyBody { locator: locator.to_string() })?;
    let value = decode(locator, body)?;
    debug!(%locator, "Received resource");
    Ok(value)
}

async fn post_resource<T: DeserializeOwned>(
    client: &dyn RemoteClient,
    locator: &str,
    body: &Value,
) -> Result<Option<T>, FetchError> {
    debug!(%locator, "Posting resource");
    let response = client.post(locator, body).await?;
    debug!(%locator, empty = response.is_none(), "Received response");
    response.map(|value| decode(locator, value)).transpose()
}

fn decode<T: DeserializeOwned>(locator: &str, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|source| FetchError::Decode {
        locator: locator.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedRemoteClient};
    use checkout_shared::{Customer, HalResource, Item, PaymentResponse};
    use serde_json::json;
    use std::time::Duration;

    fn fetcher(client: &Arc<ScriptedRemoteClient>) -> ResourceFetcher {
        ResourceFetcher::new(client.clone(), WorkerPool::new(4))
    }

    #[tokio::test]
    async fn test_fetch_decodes_hal_resource() {
        let client = Arc::new(ScriptedRemoteClient::new());
        client.on_get(
            "http://user/customers/9",
            Reply::json(json!({
                "username": "eve",
                "_links": {"self": {"href": "http://user/customers/9"}}
            })),
        );

        let customer: HalResource<Customer> = fetcher(&client)
            .fetch("http://user/customers/9")
            .await
            .unwrap();
        assert_eq!(customer.content.username, "eve");
        assert_eq!(customer.self_href(), Some("http://user/customers/9"));
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_error() {
        let client = Arc::new(ScriptedRemoteClient::new());
        client.on_get("/carts/9/items", Reply::Empty);

        let result = fetcher(&client).fetch::<Vec<Item>>("/carts/9/items").await;
        assert!(matches!(result, Err(FetchError::EmptyBody { .. })));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_decode_error() {
        let client = Arc::new(ScriptedRemoteClient::new());
        client.on_get("/carts/9/items", Reply::json(json!({"not": "a list"})));

        let result = fetcher(&client).fetch::<Vec<Item>>("/carts/9/items").await;
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_fetch_unknown_locator_is_remote_error() {
        let client = Arc::new(ScriptedRemoteClient::new());

        let result = fetcher(&client).fetch::<Vec<Item>>("/nowhere").await;
        assert!(matches!(result, Err(FetchError::Remote(RemoteError::Status { status: 404, .. }))));
    }

    #[tokio::test]
    async fn test_submit_posts_payload_and_decodes() {
        let client = Arc::new(ScriptedRemoteClient::new());
        client.on_post("http://payment/paymentAuth", Reply::json(json!({"authorised": true})));

        let response: Option<PaymentResponse> = fetcher(&client)
            .submit("http://payment/paymentAuth", &json!({"amount": 1.0}))
            .await
            .unwrap();
        assert!(response.unwrap().authorised);

        let posted = client.posted_body("http://payment/paymentAuth").unwrap();
        assert_eq!(posted["amount"], json!(1.0));
    }

    #[tokio::test]
    async fn test_submit_empty_body_is_none() {
        let client = Arc::new(ScriptedRemoteClient::new());
        client.on_post("http://payment/paymentAuth", Reply::Empty);

        let response: Option<PaymentResponse> = fetcher(&client)
            .submit("http://payment/paymentAuth", &json!({}))
            .await
            .unwrap();
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_call() {
        let client = Arc::new(ScriptedRemoteClient::new());
        client.on_get(
            "/slow",
            Reply::json(json!([])).after(Duration::from_secs(60)),
        );
        let pool = WorkerPool::new(1);
        let fetcher = ResourceFetcher::new(client.clone(), pool.clone());

        let handle = fetcher.fetch::<Vec<Item>>("/slow");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(pool.available(), 0);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(pool.available(), 1);
    }
}

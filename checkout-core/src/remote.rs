use async_trait::async_trait;
use serde_json::Value;

/// Transport-level failure talking to another service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("request to {locator} failed: {detail}")]
    Transport { locator: String, detail: String },
    #[error("{locator} answered HTTP {status}")]
    Status { locator: String, status: u16 },
    #[error("unreadable body from {locator}: {detail}")]
    Body { locator: String, detail: String },
}

/// Outbound HTTP seam used by the order fetcher.
///
/// Both calls resolve to `Ok(None)` when the remote answered successfully but
/// with an empty body (or a literal JSON `null`).
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// GET a resource, accepting HAL or plain JSON.
    async fn get(&self, locator: &str) -> Result<Option<Value>, RemoteError>;

    /// POST a JSON body and return the decoded JSON answer.
    async fn post(&self, locator: &str, body: &Value) -> Result<Option<Value>, RemoteError>;
}

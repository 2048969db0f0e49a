//! HTTP implementation of [`RemoteClient`].

use async_trait::async_trait;
use checkout_core::{RemoteClient, RemoteError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Proxy, Response};
use serde_json::Value;

const ACCEPTED_TYPES: &str = "application/hal+json, application/json";

/// JSON-over-HTTP client for the user, cart, payment and shipping services.
///
/// A 2xx answer with an empty (or `null`) body is reported as `Ok(None)`;
/// any other status is a [`RemoteError::Status`].
#[derive(Clone)]
pub struct HttpRemoteClient {
    client: Client,
}

impl HttpRemoteClient {
    pub fn new(proxy_url: Option<&str>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPTED_TYPES));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(url) = proxy_url {
            builder = builder.proxy(Proxy::all(url)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn read_body(locator: &str, response: Response) -> Result<Option<Value>, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport(locator, e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        match serde_json::from_slice(&bytes) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(RemoteError::Body {
                locator: locator.to_string(),
                detail: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn get(&self, locator: &str) -> Result<Option<Value>, RemoteError> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| transport(locator, e))?;
        Self::read_body(locator, response).await
    }

    async fn post(&self, locator: &str, body: &Value) -> Result<Option<Value>, RemoteError> {
        let response = self
            .client
            .post(locator)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(locator, e))?;
        Self::read_body(locator, response).await
    }
}

fn transport(locator: &str, e: reqwest::Error) -> RemoteError {
    RemoteError::Transport {
        locator: locator.to_string(),
        detail: e.to_string(),
    }
}

//! HTTP plumbing shared by the master, volume and filer clients.
//!
//! Every network wait (sending a request, reading a body, reading one chunk
//! of a stream) goes through [`Transport::guard`], which races it against the
//! client's cancellation token and bounds it by the configured request
//! timeout.

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use seaweed_core::{ClientConfig, WeedError, WeedResult};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
pub(crate) struct Transport {
    client: Client,
    scheme: &'static str,
    request_timeout: Duration,
    cancel: CancellationToken,
}

/// Error body returned by master, volume and filer servers.
#[derive(serde::Deserialize)]
struct ServerError {
    error: String,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> WeedResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| WeedError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            scheme: config.scheme(),
            request_timeout: config.request_timeout,
            cancel: CancellationToken::new(),
        })
    }

    /// Same connection pool and settings, bound to another cancellation token.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// URL on a server addressed as `host:port`, the form the master hands out.
    pub fn server_url(&self, server: &str, path: &str) -> String {
        let server = server.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if server.starts_with("http://") || server.starts_with("https://") {
            format!("{}/{}", server, path)
        } else {
            format!("{}://{}/{}", self.scheme, server, path)
        }
    }

    /// Run one network wait under cancellation and the request timeout.
    pub async fn guard<F, T>(&self, fut: F) -> WeedResult<T>
    where
        F: Future<Output = WeedResult<T>>,
    {
        let timeout = self.request_timeout;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(WeedError::Cancelled),
            result = tokio::time::timeout(timeout, fut) => {
                result.map_err(|_| WeedError::Timeout(timeout))?
            }
        }
    }

    pub async fn send(&self, request: RequestBuilder) -> WeedResult<Response> {
        self.guard(async {
            request
                .send()
                .await
                .map_err(|e| WeedError::transfer_with("Failed to send request", e))
        })
        .await
    }

    pub async fn bytes(&self, response: Response) -> WeedResult<Bytes> {
        let url = response.url().to_string();
        self.guard(async {
            response.bytes().await.map_err(|e| {
                WeedError::transfer_with(format!("Failed to read response from {}", url), e)
            })
        })
        .await
    }

    /// Read the body and deserialize it as JSON.
    pub async fn json<T: DeserializeOwned>(&self, response: Response) -> WeedResult<T> {
        let url = response.url().to_string();
        let body = self.bytes(response).await?;
        serde_json::from_slice(&body).map_err(|e| {
            WeedError::transfer_with(format!("Failed to parse response from {} as JSON", url), e)
        })
    }

    /// Pass successful responses through; turn anything else into `TransferFailed`.
    pub async fn error_for_status(&self, response: Response) -> WeedResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_text = match self.bytes(response).await {
            Ok(body) => error_message(&body),
            Err(_) => "Unknown error".to_string(),
        };

        tracing::warn!(url = %url, status = %status, error = %error_text, "SeaweedFS request failed");

        Err(WeedError::transfer(format!(
            "Request to {} failed with status {}: {}",
            url, status, error_text
        )))
    }

    /// Send `request` and deserialize a successful JSON response.
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> WeedResult<T> {
        let response = self.send(request).await?;
        let response = self.error_for_status(response).await?;
        self.json(response).await
    }
}

/// Prefer the `error` field of a JSON error body, fall back to the raw text.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ServerError>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                "Unknown error".to_string()
            } else {
                text
            }
        }
    }
}

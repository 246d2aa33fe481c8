//! REST client for the counter service.

use std::time::Duration;

use async_trait::async_trait;
use lantern_core::{
    CounterState, CounterStore, LanternError, LanternResult, TransportError, ValidationError,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// `CounterStore` backed by the lantern API over HTTP.
#[derive(Debug, Clone)]
pub struct CounterClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl CounterClient {
    pub fn new(base_url: &str, timeout: Duration) -> LanternResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::RequestFailed {
                endpoint: base_url.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> LanternResult<Response> {
        debug!(endpoint = path, "counter request");
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LanternError::from(TransportError::Timeout {
                    endpoint: path.to_string(),
                })
            } else {
                LanternError::from(TransportError::RequestFailed {
                    endpoint: path.to_string(),
                    reason: e.to_string(),
                })
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        if status == StatusCode::BAD_REQUEST {
            return Err(ValidationError::InvalidValue {
                field: "counter".to_string(),
                reason: message,
            }
            .into());
        }
        Err(TransportError::Status {
            endpoint: path.to_string(),
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

#[async_trait]
impl CounterStore for CounterClient {
    async fn read_state(&self) -> LanternResult<CounterState> {
        const PATH: &str = "/api/v1/counter";
        let response = self.send(PATH, self.client.get(self.url(PATH))).await?;
        response.json::<CounterState>().await.map_err(|e| {
            TransportError::Decode {
                endpoint: PATH.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn apply_delta(&self, delta: i64) -> LanternResult<()> {
        const PATH: &str = "/api/v1/counter/delta";
        let body = serde_json::json!({ "delta": delta });
        self.send(PATH, self.client.post(self.url(PATH)).json(&body))
            .await
            .map(drop)
    }

    async fn set_step(&self, step: i64) -> LanternResult<()> {
        const PATH: &str = "/api/v1/counter/step";
        let body = serde_json::json!({ "step": step });
        self.send(PATH, self.client.put(self.url(PATH)).json(&body))
            .await
            .map(drop)
    }
}

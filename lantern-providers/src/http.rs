//! Shared JSON-over-HTTP plumbing for the provider clients.

use std::time::Duration;

use lantern_core::{LanternError, LanternResult, NotFoundError, TransportError, ValidationError};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// A reqwest client bound to one base URL.
#[derive(Clone)]
pub(crate) struct JsonClient {
    client: Client,
    base_url: String,
}

impl JsonClient {
    pub(crate) fn new(base_url: impl Into<String>, timeout: Duration) -> LanternResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            LanternError::from(TransportError::RequestFailed {
                endpoint: "client".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })
        })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{path}` and decode the body.
    ///
    /// `path` labels errors, so it must not carry secrets; pass those in
    /// `query`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> LanternResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(endpoint = %path, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| request_error(path, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            LanternError::from(TransportError::Decode {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })
        })?;

        if status == StatusCode::NOT_FOUND {
            return Err(NotFoundError::Resource {
                endpoint: path.to_string(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
            }
            .into());
        }

        decode(path, &body)
    }
}

impl std::fmt::Debug for JsonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn request_error(path: &str, err: reqwest::Error) -> LanternError {
    if err.is_timeout() {
        TransportError::Timeout {
            endpoint: path.to_string(),
        }
        .into()
    } else {
        TransportError::RequestFailed {
            endpoint: path.to_string(),
            reason: err.to_string(),
        }
        .into()
    }
}

/// Decode a response body, reporting shape errors as a malformed payload.
pub(crate) fn decode<T: DeserializeOwned>(path: &str, body: &str) -> LanternResult<T> {
    serde_json::from_str(body).map_err(|e| {
        ValidationError::MalformedPayload {
            payload: path.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Pull `message` out of a JSON error body, or fall back to the raw text.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.is_empty() => "Unknown error".to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"cod":401,"message":"Invalid API key"}"#),
            "Invalid API key"
        );
        assert_eq!(error_message("bad gateway"), "bad gateway");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let result: LanternResult<Vec<u64>> = decode("topstories.json", r#"{"a":1}"#);
        assert!(matches!(result, Err(LanternError::Validation(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = JsonClient::new("http://localhost:1/v0/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/v0");
    }
}

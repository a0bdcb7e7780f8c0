//! HTTP client for OpenAI-compatible local model servers.
//!
//! Two operations, matching what LM Studio and compatibles expose:
//!
//! - [`list_models`] - `GET /v1/models`, used as the connectivity probe and
//!   for default-model selection
//! - [`chat_completion`] - `POST /v1/chat/completions`, one non-streaming
//!   request per send, no retry
//!
//! The server is local by design, so plain HTTP is allowed; the shared
//! client instead disables redirects and sets a connect timeout.

mod wire;

pub use wire::{ChatTurn, CompletionRequest, ModelInfo};

use std::sync::OnceLock;
use std::time::Duration;

use url::Url;

const CONNECT_TIMEOUT_SECS: u64 = 10;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Validated base URL of the model server, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ProviderError::InvalidUrl(format!(
                    "unsupported scheme `{other}`"
                )));
            }
        }
        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{path}", self.0)
    }
}

pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build tuned HTTP client: {e}. Using defaults.");
                reqwest::Client::new()
            })
    })
}

/// List the models the server has loaded. Doubles as the connectivity probe.
pub async fn list_models(endpoint: &Endpoint) -> Result<Vec<ModelInfo>, ProviderError> {
    let response = http_client()
        .get(endpoint.join("v1/models"))
        .send()
        .await?;
    let response = check_status(response).await?;
    let listing: wire::ModelsResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    tracing::debug!(models = listing.data.len(), "model listing received");
    Ok(listing.data)
}

/// Send one chat completion request and return the first choice's content.
pub async fn chat_completion(
    endpoint: &Endpoint,
    request: &CompletionRequest,
) -> Result<String, ProviderError> {
    let response = http_client()
        .post(endpoint.join("v1/chat/completions"))
        .json(request)
        .send()
        .await?;
    let response = check_status(response).await?;
    let completion: wire::CompletionResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse("response contained no choices".into()))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status,
        body: cap_error_body(body),
    })
}

fn cap_error_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...(truncated)");
    body
}

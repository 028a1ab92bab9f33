//! Chat-completions transport

use std::time::Duration;

use serde::{Deserialize, Serialize};
use service_probe::{ServiceEndpoint, TcpEndpoint};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {0}: {1}")]
    Status(u16, String),

    #[error("malformed-response")]
    Malformed(String),
}

impl TransportError {
    /// Network and HTTP failures are retried; a bad body is not
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Request(_) | TransportError::Status(_, _))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Trimmed content of the first choice, if it has any text
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Sends one chat-completions request
pub trait CompletionTransport: Send + Sync {
    /// Reachability target for the availability probe
    fn endpoint(&self) -> &dyn ServiceEndpoint;

    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// Blocking HTTP transport for OpenAI-compatible APIs
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: reqwest::Url,
    api_key: String,
    endpoint: TcpEndpoint,
}

impl HttpTransport {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self, TransportError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| TransportError::InvalidEndpoint(format!("{} has no host", url)))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(443);

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: TcpEndpoint::new("summarizer", &host, port, timeout),
            url,
            api_key: api_key.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl CompletionTransport for HttpTransport {
    fn endpoint(&self) -> &dyn ServiceEndpoint {
        &self.endpoint
    }

    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status(status.as_u16(), body));
        }

        response
            .json::<ChatResponse>()
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

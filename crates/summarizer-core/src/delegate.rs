//! Availability-aware summarization

use std::sync::Arc;

use service_probe::{AvailabilityProbe, RetryPolicy};
use shared_types::{ServiceAvailability, SummarizationOutcome};
use tracing::{debug, error, info, warn};

use crate::config::{SummarizerConfig, SYSTEM_PROMPT};
use crate::text::prepare_input;
use crate::transport::{
    ChatMessage, ChatRequest, CompletionTransport, HttpTransport, TransportError,
};

const MALFORMED_RESPONSE: &str = "malformed-response";

pub struct SummarizationDelegate {
    config: SummarizerConfig,
    transport: Option<Arc<dyn CompletionTransport>>,
    probe: Arc<AvailabilityProbe>,
}

impl SummarizationDelegate {
    /// Build from configuration. No transport is created without a credential.
    pub fn from_config(
        config: SummarizerConfig,
        probe: Arc<AvailabilityProbe>,
    ) -> Result<Self, TransportError> {
        let transport: Option<Arc<dyn CompletionTransport>> =
            match (config.enabled, config.credential()) {
                (true, Some(key)) => Some(Arc::new(HttpTransport::new(
                    &config.endpoint,
                    key,
                    config.timeout(),
                )?)),
                _ => None,
            };
        Ok(Self {
            config,
            transport,
            probe,
        })
    }

    pub fn with_transport(
        config: SummarizerConfig,
        transport: Arc<dyn CompletionTransport>,
        probe: Arc<AvailabilityProbe>,
    ) -> Self {
        Self {
            config,
            transport: Some(transport),
            probe,
        }
    }

    /// Delegate that always reports `Disabled`
    pub fn disabled() -> Self {
        Self {
            config: SummarizerConfig {
                enabled: false,
                ..SummarizerConfig::default()
            },
            transport: None,
            probe: Arc::new(AvailabilityProbe::new("summarizer", RetryPolicy::single())),
        }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn probe(&self) -> &Arc<AvailabilityProbe> {
        &self.probe
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.credential().is_some() && self.transport.is_some()
    }

    /// Full availability probe (startup / status)
    pub fn probe_service(&self) -> ServiceAvailability {
        match &self.transport {
            Some(transport) if self.is_enabled() => self.probe.probe(transport.endpoint()),
            _ => ServiceAvailability::Unavailable,
        }
    }

    /// The request that would be sent for `text`
    pub fn build_request(&self, text: &str) -> ChatRequest {
        let input = prepare_input(text, self.config.max_input_chars);
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("Please summarize the following document:\n\n{}", input)),
            ],
        }
    }

    pub fn summarize(&self, text: &str) -> SummarizationOutcome {
        let transport = match &self.transport {
            Some(transport) if self.is_enabled() => transport,
            _ => {
                info!("Summarization disabled: no credential configured");
                return SummarizationOutcome::Disabled;
            }
        };

        if !self.probe.check(transport.endpoint()).is_available() {
            warn!("Summarization service unavailable; skipping");
            return SummarizationOutcome::Unavailable;
        }

        let request = self.build_request(text);
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match transport.complete(&request) {
                Ok(response) => {
                    return match response.first_content() {
                        Some(summary) => {
                            info!("Summary generated ({} chars)", summary.chars().count());
                            SummarizationOutcome::Success(summary.to_string())
                        }
                        None => {
                            error!("Summarization returned no content");
                            SummarizationOutcome::Failure(MALFORMED_RESPONSE.to_string())
                        }
                    };
                }
                Err(e) if !e.is_retryable() => {
                    error!("Summarization response unreadable: {:?}", e);
                    return SummarizationOutcome::Failure(MALFORMED_RESPONSE.to_string());
                }
                Err(e) => {
                    warn!(
                        "Summarization attempt {}/{} failed: {}",
                        attempt, max_attempts, e
                    );
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        error!("Summarization failed after {} attempt(s): {}", max_attempts, reason);
        self.probe.mark_unavailable(&reason);
        debug!("Summarizer state now {}", self.probe.current());
        SummarizationOutcome::Failure(reason)
    }
}

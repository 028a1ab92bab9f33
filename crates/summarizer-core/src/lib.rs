//! Optional natural-language summaries of extracted disclosures
//!
//! The delegate never fails the pipeline: every path ends in a
//! [`SummarizationOutcome`](shared_types::SummarizationOutcome) that is
//! reported next to the classification result.

pub mod config;
pub mod delegate;
pub mod text;
pub mod transport;

pub use config::{SummarizerConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, SYSTEM_PROMPT};
pub use delegate::SummarizationDelegate;
pub use text::{prepare_input, sanitize_text, truncate_chars};
pub use transport::{
    ChatMessage, ChatRequest, ChatResponse, CompletionTransport, HttpTransport, TransportError,
};

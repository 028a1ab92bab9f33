//! Availability probing for optional network collaborators
//!
//! The malware scanner and the summarization API are both optional: the
//! pipeline has to know whether they are reachable without blocking forever
//! when they are not. Probing is a cheap presence check followed by a
//! bounded number of handshakes with fixed backoff.

pub mod endpoint;
pub mod probe;

pub use endpoint::{resolve, ProbeError, ServiceEndpoint, TcpEndpoint};
pub use probe::{AvailabilityProbe, RetryPolicy};

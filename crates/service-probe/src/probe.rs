//! Process-wide availability tracking for one optional service

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::ServiceAvailability;
use tracing::{error, info, warn};

use crate::endpoint::ServiceEndpoint;

/// Bounded retry with fixed spacing between handshake attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_ms")]
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 10;
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(15);

    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// One attempt, no waiting
    pub fn single() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_BACKOFF)
    }
}

/// Cached availability of one external service.
///
/// The state starts `Unknown`, is `Probing` while a probe runs and then
/// settles on `Available` or `Unavailable`. `Available` is cached until a
/// caller reports a failure through [`mark_unavailable`](Self::mark_unavailable).
/// That failure holds for the failing call only: the next [`check`](Self::check)
/// re-checks with a single handshake.
#[derive(Debug)]
pub struct AvailabilityProbe {
    service: String,
    policy: RetryPolicy,
    reprobe_on_call: bool,
    state: RwLock<ServiceAvailability>,
    call_failed: AtomicBool,
}

impl AvailabilityProbe {
    pub fn new(service: &str, policy: RetryPolicy) -> Self {
        Self {
            service: service.to_string(),
            policy,
            reprobe_on_call: false,
            state: RwLock::new(ServiceAvailability::Unknown),
            call_failed: AtomicBool::new(false),
        }
    }

    /// Allow a single-attempt re-probe on the next call after a failure
    pub fn with_reprobe_on_call(mut self, enabled: bool) -> Self {
        self.reprobe_on_call = enabled;
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn current(&self) -> ServiceAvailability {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(ServiceAvailability::Unknown)
    }

    fn set(&self, availability: ServiceAvailability) {
        if let Ok(mut state) = self.state.write() {
            *state = availability;
        }
    }

    /// Record that a call against the service failed
    pub fn mark_unavailable(&self, reason: &str) {
        warn!("{} marked unavailable for this call: {}", self.service, reason);
        self.set(ServiceAvailability::Unavailable);
        self.call_failed.store(true, Ordering::SeqCst);
    }

    /// Full probe with the configured retry policy (used at startup)
    pub fn probe(&self, endpoint: &dyn ServiceEndpoint) -> ServiceAvailability {
        self.probe_with(endpoint, self.policy)
    }

    /// Presence check, then up to `policy.max_attempts` handshakes
    pub fn probe_with(
        &self,
        endpoint: &dyn ServiceEndpoint,
        policy: RetryPolicy,
    ) -> ServiceAvailability {
        self.set(ServiceAvailability::Probing);
        self.call_failed.store(false, Ordering::SeqCst);

        if !endpoint.is_present() {
            info!(
                "No {} detected; continuing without it",
                endpoint.name()
            );
            self.set(ServiceAvailability::Unavailable);
            return ServiceAvailability::Unavailable;
        }

        for attempt in 1..=policy.max_attempts {
            match endpoint.handshake() {
                Ok(()) => {
                    info!("Connected to {}", endpoint.name());
                    self.set(ServiceAvailability::Available);
                    return ServiceAvailability::Available;
                }
                Err(e) => {
                    warn!(
                        "{} not ready. Retrying ({}/{})... | {}",
                        endpoint.name(),
                        attempt,
                        policy.max_attempts,
                        e
                    );
                    if attempt < policy.max_attempts && !policy.backoff.is_zero() {
                        std::thread::sleep(policy.backoff);
                    }
                }
            }
        }

        error!(
            "{} unavailable after {} attempt(s)",
            endpoint.name(),
            policy.max_attempts
        );
        self.set(ServiceAvailability::Unavailable);
        ServiceAvailability::Unavailable
    }

    /// Availability for the current call.
    ///
    /// `Available` is served from cache. `Unknown` triggers a full probe.
    /// `Unavailable` after a failed call gets a single fresh handshake.
    /// `Unavailable` settled by a probe is re-checked, again with a single
    /// attempt, only when re-probing is enabled, so a request never waits out
    /// the startup budget.
    pub fn check(&self, endpoint: &dyn ServiceEndpoint) -> ServiceAvailability {
        match self.current() {
            ServiceAvailability::Available => ServiceAvailability::Available,
            ServiceAvailability::Unknown => self.probe(endpoint),
            ServiceAvailability::Unavailable
                if self.reprobe_on_call || self.call_failed.load(Ordering::SeqCst) =>
            {
                self.probe_with(endpoint, RetryPolicy::single())
            }
            ServiceAvailability::Unavailable | ServiceAvailability::Probing => {
                ServiceAvailability::Unavailable
            }
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

//! Environment guarding: connectivity preflight and service readiness.
//!
//! Before any provider call, callers consult a shared [`ServiceGuard`]. It
//! combines an injectable [`Connectivity`] port (the host environment's
//! online/offline signal) with the outcome of a bounded readiness probe
//! against the provider. When either says no, suggestion and resolution
//! calls short-circuit to [`PlacesError::ServiceUnavailable`] without
//! touching the network.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::retry::{readiness_schedule, retry_with_schedule};

/// Host-environment online/offline signal.
///
/// Injectable so tests and embedders can substitute their own detection;
/// the default assumes connectivity and lets the probe decide.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Default [`Connectivity`]: always reports online.
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Shared pre-flight state for provider calls.
///
/// Starts optimistic: until [`ServiceGuard::initialize`] runs, only the
/// connectivity port can block calls. A failed probe pins the guard to
/// unavailable until a later `initialize` succeeds.
pub struct ServiceGuard {
    connectivity: Box<dyn Connectivity>,
    ready: AtomicBool,
}

impl ServiceGuard {
    #[must_use]
    pub fn new(connectivity: Box<dyn Connectivity>) -> Self {
        Self {
            connectivity,
            ready: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn always_online() -> Self {
        Self::new(Box::new(AlwaysOnline))
    }

    /// Probes the provider with bounded fixed-backoff retries (500 ms, then
    /// 1000 ms steps; `max_attempts` total attempts) and records the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::ServiceUnavailable`] when offline or when the
    /// probe exhausts its attempts. The guard stays unavailable until a
    /// later call succeeds.
    pub async fn initialize(
        &self,
        client: &PlacesClient,
        max_attempts: u32,
    ) -> Result<(), PlacesError> {
        if !self.connectivity.is_online() {
            self.ready.store(false, Ordering::SeqCst);
            return Err(PlacesError::ServiceUnavailable { attempts: 0 });
        }

        let schedule = readiness_schedule(max_attempts);
        match retry_with_schedule(&schedule, || client.probe()).await {
            Ok(()) => {
                self.ready.store(true, Ordering::SeqCst);
                tracing::debug!("mapping service ready");
                Ok(())
            }
            Err(err) => {
                self.ready.store(false, Ordering::SeqCst);
                tracing::error!(error = %err, attempts = max_attempts, "mapping service unreachable");
                Err(PlacesError::ServiceUnavailable {
                    attempts: max_attempts,
                })
            }
        }
    }

    /// Pre-flight check before a provider call.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::ServiceUnavailable`] (with `attempts: 0`,
    /// meaning no probe was issued) when offline or when the last probe
    /// failed.
    pub fn check(&self) -> Result<(), PlacesError> {
        if !self.connectivity.is_online() || !self.ready.load(Ordering::SeqCst) {
            return Err(PlacesError::ServiceUnavailable { attempts: 0 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Connectivity for Offline {
        fn is_online(&self) -> bool {
            false
        }
    }

    #[test]
    fn guard_starts_optimistic() {
        assert!(ServiceGuard::always_online().check().is_ok());
    }

    #[test]
    fn offline_connectivity_blocks_calls() {
        let guard = ServiceGuard::new(Box::new(Offline));
        assert!(matches!(
            guard.check(),
            Err(PlacesError::ServiceUnavailable { attempts: 0 })
        ));
    }

    #[tokio::test]
    async fn initialize_while_offline_fails_without_probing() {
        let guard = ServiceGuard::new(Box::new(Offline));
        let key = lotmark_core::ApiKey::parse("AIzaTestKey_0000000000000000000000").unwrap();
        // Unroutable base URL: a probe attempt would error slowly, but the
        // offline branch must return before any request is built.
        let client =
            PlacesClient::with_base_url(key, 1, "lotmark-test/0.1", "http://0.0.0.0:1").unwrap();
        let result = guard.initialize(&client, 3).await;
        assert!(matches!(
            result,
            Err(PlacesError::ServiceUnavailable { attempts: 0 })
        ));
    }
}

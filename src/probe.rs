//! Best-effort liveness probing over HTTP.
//!
//! A probe is a single bounded-timeout GET against the service's health
//! endpoint. It always produces a classification, never an error: one
//! unreachable service must not be able to fail an aggregate status
//! report.

use crate::registry::ServiceDescriptor;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Global shared HTTP client for health probes.
///
/// Using a shared client prevents file descriptor exhaustion when probing
/// many services; the connection pool is reused across all probes. The
/// client-level timeout is a fallback — each request applies the
/// configured per-probe timeout itself.
static SHARED_HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn shared_client() -> &'static Client {
    SHARED_HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create shared HTTP client")
    })
}

/// Classification of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Got an HTTP response with a 2xx status code.
    Running,
    /// Transport-level failure: connection refused, timeout, etc.
    Stopped,
    /// Got an HTTP response with a non-2xx status code.
    #[serde(rename = "error")]
    ErrorResponse,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Running => write!(f, "running"),
            HealthState::Stopped => write!(f, "stopped"),
            HealthState::ErrorResponse => write!(f, "error"),
        }
    }
}

/// Issues single-attempt liveness probes against service health endpoints.
#[derive(Debug, Clone)]
pub struct Prober {
    timeout: Duration,
}

impl Prober {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Probe a service's health endpoint and classify the result.
    ///
    /// Single attempt, no retry: the result reflects instantaneous state
    /// and callers re-probe on their own schedule. All transport failures
    /// map to [`HealthState::Stopped`].
    pub async fn probe(&self, descriptor: &ServiceDescriptor) -> HealthState {
        let url = descriptor.health_url();
        match shared_client()
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => HealthState::Running,
            Ok(response) => {
                tracing::debug!(
                    "probe of '{}' got HTTP {}",
                    descriptor.identifier,
                    response.status()
                );
                HealthState::ErrorResponse
            }
            Err(err) => {
                tracing::trace!("probe of '{}' failed: {}", descriptor.identifier, err);
                HealthState::Stopped
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn descriptor(port: u16) -> ServiceDescriptor {
        ServiceDescriptor {
            identifier: "probe_target".to_string(),
            display_name: "Probe Target".to_string(),
            working_directory: PathBuf::from("."),
            port,
            command: vec!["true".to_string()],
            health_path: "/health".to_string(),
            docs_path: None,
        }
    }

    #[tokio::test]
    async fn test_probe_unreachable_port_classifies_stopped() {
        // Valid but unlikely-to-be-used port
        let prober = Prober::new(Duration::from_secs(1));
        let state = prober.probe(&descriptor(59999)).await;
        assert_eq!(state, HealthState::Stopped);
    }

    #[test]
    fn test_health_state_serializes_to_report_vocabulary() {
        assert_eq!(
            serde_json::to_string(&HealthState::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&HealthState::Stopped).unwrap(),
            "\"stopped\""
        );
        assert_eq!(
            serde_json::to_string(&HealthState::ErrorResponse).unwrap(),
            "\"error\""
        );
    }
}

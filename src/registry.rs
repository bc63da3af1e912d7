//! Static registry of supervised services.
//!
//! The registry is built once from configuration and never mutated. It is
//! the authority on which service identifiers exist; every lifecycle
//! operation resolves its descriptor here before touching any process
//! state. Iteration order is configuration order, which keeps
//! human-facing listings stable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable configuration entry for a single supervised service.
///
/// Descriptors are created once at startup from the config file and live
/// for the supervisor's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Stable short key used to address the service (e.g. "user_service").
    pub identifier: String,

    /// Human-readable name for listings and logs.
    pub display_name: String,

    /// Working directory the child process is launched in.
    pub working_directory: PathBuf,

    /// Port the service is expected to bind. Unique across descriptors.
    pub port: u16,

    /// Command to launch, as argv. A literal `{{port}}` token in any
    /// argument is substituted with the configured port at launch time.
    pub command: Vec<String>,

    /// URL path probed for liveness.
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// URL path opened in the browser after launch. Falls back to
    /// `health_path` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_path: Option<String>,
}

fn default_health_path() -> String {
    "/health".to_string()
}

impl ServiceDescriptor {
    /// Base URL of the service on the local host.
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Full URL of the liveness endpoint.
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url(), self.health_path)
    }

    /// Full URL opened in the browser after a successful launch.
    pub fn docs_url(&self) -> String {
        let path = self.docs_path.as_deref().unwrap_or(&self.health_path);
        format!("{}{}", self.base_url(), path)
    }
}

/// Lookup table of all registered services.
///
/// Pure lookup: no mutation operations exist. `list_all` iterates in the
/// order services were declared in the configuration.
#[derive(Debug, Clone)]
pub struct Registry {
    services: Vec<ServiceDescriptor>,
}

impl Registry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    /// Resolve a descriptor by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownService`] if the identifier is not among
    /// the statically configured set.
    pub fn describe(&self, identifier: &str) -> Result<&ServiceDescriptor> {
        self.services
            .iter()
            .find(|s| s.identifier == identifier)
            .ok_or_else(|| Error::UnknownService(identifier.to_string()))
    }

    /// All descriptors, in configuration order.
    pub fn list_all(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, port: u16) -> ServiceDescriptor {
        ServiceDescriptor {
            identifier: id.to_string(),
            display_name: id.to_string(),
            working_directory: PathBuf::from("."),
            port,
            command: vec!["sleep".to_string(), "30".to_string()],
            health_path: "/health".to_string(),
            docs_path: None,
        }
    }

    #[test]
    fn test_describe_unknown_service() {
        let registry = Registry::new(vec![descriptor("api", 9001)]);
        let err = registry.describe("nope").unwrap_err();
        assert!(matches!(err, Error::UnknownService(id) if id == "nope"));
    }

    #[test]
    fn test_list_all_preserves_configuration_order() {
        let registry = Registry::new(vec![
            descriptor("c", 9001),
            descriptor("a", 9002),
            descriptor("b", 9003),
        ]);
        let ids: Vec<&str> = registry
            .list_all()
            .map(|s| s.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_urls() {
        let mut d = descriptor("api", 9001);
        assert_eq!(d.health_url(), "http://localhost:9001/health");
        assert_eq!(d.docs_url(), "http://localhost:9001/health");

        d.docs_path = Some("/docs".to_string());
        assert_eq!(d.docs_url(), "http://localhost:9001/docs");
    }
}

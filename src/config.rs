//! Configuration loading and validation.
//!
//! The config file (`convoy.yaml`) declares the supervised services as a
//! YAML sequence — the sequence order becomes the registry order — plus
//! settings for the supervisor itself.

use crate::error::{Error, Result};
use crate::registry::ServiceDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for convoy.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

/// Settings for the supervisor process itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Port the management API listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Per-probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Grace period in seconds between SIGTERM and SIGKILL on stop.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Open each service's docs URL in the browser after launch.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_listen_port() -> u16 {
    8007
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_grace_period_secs() -> u64 {
    5
}

fn default_open_browser() -> bool {
    true
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            probe_timeout_ms: default_probe_timeout_ms(),
            grace_period_secs: default_grace_period_secs(),
            open_browser: default_open_browser(),
        }
    }
}

impl SupervisorConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// Checks that identifiers are non-empty and unique, ports are
    /// non-zero and unique, commands are non-empty, and health paths are
    /// absolute URL paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut seen_ports: HashSet<u16> = HashSet::new();

        for service in &self.services {
            if service.identifier.is_empty() {
                return Err(Error::Validation(
                    "Service identifier must not be empty".to_string(),
                ));
            }
            if !seen_ids.insert(&service.identifier) {
                return Err(Error::Validation(format!(
                    "Duplicate service identifier: '{}'",
                    service.identifier
                )));
            }
            if service.port == 0 {
                return Err(Error::Validation(format!(
                    "Service '{}': port must be in 1-65535",
                    service.identifier
                )));
            }
            if !seen_ports.insert(service.port) {
                return Err(Error::Validation(format!(
                    "Service '{}': port {} is already assigned to another service",
                    service.identifier, service.port
                )));
            }
            if service.command.is_empty() {
                return Err(Error::Validation(format!(
                    "Service '{}': command must not be empty",
                    service.identifier
                )));
            }
            if !service.health_path.starts_with('/') {
                return Err(Error::Validation(format!(
                    "Service '{}': health_path must start with '/', got '{}'",
                    service.identifier, service.health_path
                )));
            }
            if let Some(docs) = &service.docs_path {
                if !docs.starts_with('/') {
                    return Err(Error::Validation(format!(
                        "Service '{}': docs_path must start with '/', got '{}'",
                        service.identifier, docs
                    )));
                }
            }
        }

        Ok(())
    }
}

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find config file starting from current directory
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join("convoy.yaml");
        if config_path.exists() {
            return Ok(config_path);
        }

        // Try alternate name
        let alt_path = dir.join("convoy.yml");
        if alt_path.exists() {
            return Ok(alt_path);
        }

        // Try parent directory
        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(
            "Could not find convoy.yaml in current directory or any parent".to_string(),
        ))
    }

    /// Load and validate config from file path
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_config(&content)
    }

    /// Parse and validate config from YAML string
    pub fn parse_config(&self, content: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse YAML config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

//! Lifecycle orchestration: start, stop, and status for the whole fleet.
//!
//! The [`Supervisor`] owns the registry and the process handle table —
//! the table is the only mutable shared state in the crate. Handle
//! presence and live health are tracked independently: a handle can
//! exist while the process has already died or is still booting, and
//! reported status always comes from a live probe, never from the table.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::launcher::{Launcher, ProcessHandle};
use crate::probe::{HealthState, Prober};
use crate::registry::{Registry, ServiceDescriptor};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of a `start` call. An already-running service is a no-op, not
/// an error (idempotent start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Ephemeral status record for one service, recomputed on every query.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatusReport {
    #[serde(rename = "service")]
    pub service_identifier: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub port: u16,
    pub status: HealthState,
}

/// Orchestrates process lifecycle for all registered services.
///
/// Explicitly constructed and owns all of its state; there are no
/// ambient singletons. Start/stop for the same identifier are serialized
/// through the handle-table lock, preserving the at-most-one-handle
/// invariant under concurrent calls.
pub struct Supervisor {
    registry: Registry,
    launcher: Launcher,
    prober: Prober,
    grace_period: Duration,
    /// The only mutable shared state: service identifier -> live handle.
    /// Never held across an await point.
    handles: Mutex<HashMap<String, ProcessHandle>>,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        let settings = &config.supervisor;
        Self {
            launcher: Launcher::new(settings.open_browser),
            prober: Prober::new(settings.probe_timeout()),
            grace_period: settings.grace_period(),
            registry: Registry::new(config.services),
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether a handle currently exists for the identifier.
    ///
    /// Handle presence is not the same thing as the service being alive;
    /// see [`Supervisor::status`] for live health.
    pub fn is_tracked(&self, identifier: &str) -> bool {
        self.handles.lock().contains_key(identifier)
    }

    pub fn tracked_count(&self) -> usize {
        self.handles.lock().len()
    }

    /// Start a service.
    ///
    /// Idempotent: if a handle already exists for the identifier this
    /// returns [`StartOutcome::AlreadyRunning`] without error and without
    /// side effects. The table lock is held across the (synchronous)
    /// spawn so two concurrent starts cannot both launch.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownService`] if the identifier is not registered;
    /// [`Error::Launch`] if process creation fails (the table is left
    /// unchanged).
    pub async fn start(&self, identifier: &str) -> Result<StartOutcome> {
        let descriptor = self.registry.describe(identifier)?.clone();

        let mut handles = self.handles.lock();
        if handles.contains_key(identifier) {
            tracing::info!(
                "'{}' is already running on port {}",
                descriptor.identifier,
                descriptor.port
            );
            return Ok(StartOutcome::AlreadyRunning);
        }

        let handle = self.launcher.launch(&descriptor)?;
        handles.insert(identifier.to_string(), handle);
        Ok(StartOutcome::Started)
    }

    /// Stop a service.
    ///
    /// Removes the handle, then terminates the process group with
    /// SIGTERM, escalating to SIGKILL if it has not exited within the
    /// grace period. A process that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownService`] if the identifier is not registered;
    /// [`Error::NotRunning`] if no handle exists (the table is left
    /// unchanged).
    pub async fn stop(&self, identifier: &str) -> Result<()> {
        self.registry.describe(identifier)?;

        let handle = self
            .handles
            .lock()
            .remove(identifier)
            .ok_or_else(|| Error::NotRunning(identifier.to_string()))?;

        self.terminate(handle).await;
        Ok(())
    }

    /// Stop every service currently in the handle table.
    ///
    /// Order is unspecified. Each stop is independent: a failure to
    /// terminate one process never prevents attempting the rest, and a
    /// process that is already gone is silently reaped. Never errors;
    /// a no-op on an empty table.
    pub async fn stop_all(&self) {
        let drained: Vec<ProcessHandle> = {
            let mut handles = self.handles.lock();
            handles.drain().map(|(_, handle)| handle).collect()
        };

        for handle in drained {
            tracing::info!("stopping '{}'", handle.service_identifier);
            self.terminate(handle).await;
        }
    }

    /// Status of a single service, derived from a live probe.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownService`] if the identifier is not registered —
    /// the one failure mode, since there is no descriptor to probe.
    pub async fn status(&self, identifier: &str) -> Result<ServiceStatusReport> {
        let descriptor = self.registry.describe(identifier)?;
        Ok(self.report_for(descriptor).await)
    }

    /// Status of every registered service, in registry order.
    ///
    /// Probes run concurrently, so one unreachable service costs at most
    /// the per-probe timeout rather than a serial sum.
    pub async fn status_all(&self) -> Vec<ServiceStatusReport> {
        let probes = self.registry.list_all().map(|d| self.report_for(d));
        futures::future::join_all(probes).await
    }

    async fn report_for(&self, descriptor: &ServiceDescriptor) -> ServiceStatusReport {
        let status = self.prober.probe(descriptor).await;
        ServiceStatusReport {
            service_identifier: descriptor.identifier.clone(),
            display_name: descriptor.display_name.clone(),
            port: descriptor.port,
            status,
        }
    }

    /// Terminate a child: SIGTERM to its process group, then SIGKILL
    /// after the grace period. Signal errors (process already gone) are
    /// swallowed; the child is always reaped.
    async fn terminate(&self, mut handle: ProcessHandle) {
        let name = handle.service_identifier.clone();

        let pgid = handle.pid.and_then(|pid| i32::try_from(pid).ok());
        let Some(pgid) = pgid else {
            // No usable pid: the child was already reaped by the runtime.
            let _ = handle.child.wait().await;
            return;
        };

        // The launcher put the child in its own session, so its pid is
        // the process group id.
        if let Err(err) = signal::killpg(Pid::from_raw(pgid), Signal::SIGTERM) {
            tracing::debug!("SIGTERM to '{}' (pgid {}) failed: {}", name, pgid, err);
        }

        match tokio::time::timeout(self.grace_period, handle.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!("stopped '{}' ({})", name, status);
            }
            Ok(Err(err)) => {
                tracing::warn!("failed to reap '{}': {}", name, err);
            }
            Err(_) => {
                tracing::warn!(
                    "'{}' did not exit within {:?}, sending SIGKILL",
                    name,
                    self.grace_period
                );
                if let Err(err) = signal::killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                    tracing::debug!("SIGKILL to '{}' failed: {}", name, err);
                }
                let _ = handle.child.wait().await;
            }
        }
    }
}

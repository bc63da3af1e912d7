//! Process launching.
//!
//! The launcher is single-purpose: given a descriptor it spawns one
//! detached child process and returns the handle. Checking that no handle
//! already exists is the caller's job (the supervisor), which keeps the
//! at-most-one-handle invariant in exactly one place.

use crate::error::{Error, Result};
use crate::registry::ServiceDescriptor;
use chrono::{DateTime, Utc};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Delay before the docs URL is opened in the browser, giving the service
/// a moment to bind its port.
const BROWSER_OPEN_DELAY: Duration = Duration::from_secs(2);

/// In-memory record of one launched child process.
///
/// Owned exclusively by the supervisor's handle table. At most one handle
/// exists per service identifier at any time.
#[derive(Debug)]
pub struct ProcessHandle {
    pub service_identifier: String,
    pub child: Child,
    pub pid: Option<u32>,
    pub started_at: DateTime<Utc>,
}

/// Spawns detached child processes for service descriptors.
#[derive(Debug, Clone)]
pub struct Launcher {
    open_browser: bool,
}

impl Launcher {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }

    /// Spawn an independent OS process for the given descriptor.
    ///
    /// The child runs in the descriptor's working directory with the
    /// configured port substituted into its command (any literal
    /// `{{port}}` argument token) and exported as `PORT`. It is placed in
    /// its own session so it is detached from the supervisor's terminal
    /// and can be signalled as a process group.
    ///
    /// On success a detached one-shot task is scheduled that opens the
    /// service's docs URL in the default browser after a short delay.
    /// That task is best-effort UX sugar: it is never awaited and its
    /// failures are silently ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] with the underlying OS error if process
    /// creation fails. No retry.
    pub fn launch(&self, descriptor: &ServiceDescriptor) -> Result<ProcessHandle> {
        let port = descriptor.port.to_string();
        let argv: Vec<String> = descriptor
            .command
            .iter()
            .map(|arg| arg.replace("{{port}}", &port))
            .collect();

        let program = argv.first().ok_or_else(|| {
            Error::Config(format!(
                "Service '{}' has an empty command",
                descriptor.identifier
            ))
        })?;

        tracing::debug!(
            "spawning '{}' in {:?}: {:?}",
            descriptor.identifier,
            descriptor.working_directory,
            argv
        );

        let mut cmd = Command::new(program);
        cmd.args(&argv[1..])
            .current_dir(&descriptor.working_directory)
            .env("PORT", &port)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // New session: detaches the child from our terminal and makes its
        // pid the process group leader, so stop can signal the whole group.
        #[allow(unsafe_code)]
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid()
                    .map(|_| ())
                    .map_err(std::io::Error::from)
            });
        }

        let child = cmd.spawn().map_err(|source| Error::Launch {
            service: descriptor.identifier.clone(),
            source,
        })?;

        let pid = child.id();
        tracing::info!(
            "started '{}' ({}) on port {} (pid {:?})",
            descriptor.identifier,
            descriptor.display_name,
            descriptor.port,
            pid
        );

        if self.open_browser {
            spawn_browser_open(descriptor.docs_url());
        }

        Ok(ProcessHandle {
            service_identifier: descriptor.identifier.clone(),
            child,
            pid,
            started_at: Utc::now(),
        })
    }
}

/// Fire-and-forget delayed browser open. No handle is retained and the
/// outcome is never observed.
fn spawn_browser_open(url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(BROWSER_OPEN_DELAY).await;
        if let Err(err) = open::that_detached(&url) {
            tracing::debug!("could not open browser for {}: {}", url, err);
        }
    });
}

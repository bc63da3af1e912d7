//! # Convoy
//!
//! A lightweight multi-process service supervisor for local development:
//! it launches, tracks, health-checks, and tears down a fixed set of
//! independently-running network services, and exposes its own HTTP
//! control API for starting/stopping/querying them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use convoy::{Parser, Supervisor};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), convoy::Error> {
//! // Load and validate configuration
//! let parser = Parser::new();
//! let config = parser.load_config("convoy.yaml")?;
//! let listen_port = config.supervisor.listen_port;
//!
//! // The supervisor owns the registry and the process handle table
//! let supervisor = Arc::new(Supervisor::new(config));
//!
//! // Serve the management API; stops all services on SIGINT/SIGTERM
//! convoy::api::serve(supervisor, listen_port).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! The process handle table is the only mutable shared state, guarded by
//! a single lock that is never held across an await point. Health probes
//! are independent bounded network calls and run concurrently for
//! aggregate status queries. Reported status always comes from a live
//! probe — handle presence and live health are tracked independently.

pub mod api;
pub mod config;
pub mod error;
pub mod launcher;
pub mod probe;
pub mod registry;
pub mod supervisor;

// Re-export commonly used types
pub use config::{Config, Parser, SupervisorConfig};
pub use error::{Error, Result};
pub use launcher::{Launcher, ProcessHandle};
pub use probe::{HealthState, Prober};
pub use registry::{Registry, ServiceDescriptor};
pub use supervisor::{ServiceStatusReport, StartOutcome, Supervisor};

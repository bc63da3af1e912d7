use miette::Diagnostic;
use std::io;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Unknown service: {0}")]
    #[diagnostic(
        code(convoy::service::unknown),
        help("List registered services with `convoy validate` or GET /status")
    )]
    UnknownService(String),

    #[error("Service '{0}' is not running")]
    #[diagnostic(
        code(convoy::service::not_running),
        help("Start the service with: POST /start/{0}")
    )]
    NotRunning(String),

    #[error("Failed to launch service '{service}': {source}")]
    #[diagnostic(
        code(convoy::service::launch_failed),
        help("Check that the command exists and the working directory is valid")
    )]
    Launch {
        service: String,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(convoy::config::error))]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(convoy::config::validation),
        help("Run `convoy validate` for detailed validation errors")
    )]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

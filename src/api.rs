//! HTTP management interface.
//!
//! Exposes the supervisor's control operations to operators and tooling:
//!
//! - `GET /` and `GET /status` — status report for every registered
//!   service, in registry order
//! - `POST /start/{identifier}` — start one service (404 unknown, 500
//!   launch failure)
//! - `POST /stop/{identifier}` — stop one service (404 unknown, 500 not
//!   running)
//!
//! The server runs until SIGINT/SIGTERM, then stops all supervised
//! processes exactly once before returning.

use crate::error::{Error, Result};
use crate::supervisor::Supervisor;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the management API until an interrupt arrives, then stop all
/// supervised services and return.
pub async fn serve(supervisor: Arc<Supervisor>, listen_port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("management interface listening on http://{}", addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, remote)) => {
                        let io = TokioIo::new(stream);
                        let supervisor = supervisor.clone();
                        tokio::spawn(async move {
                            let service = service_fn(move |req| {
                                let supervisor = supervisor.clone();
                                async move {
                                    Ok::<_, Infallible>(handle_request(supervisor, req).await)
                                }
                            });
                            if let Err(err) = hyper::server::conn::http1::Builder::new()
                                .serve_connection(io, service)
                                .await
                            {
                                tracing::debug!("connection error from {}: {}", remote, err);
                            }
                        });
                    }
                    Err(err) => {
                        tracing::error!("failed to accept connection: {}", err);
                    }
                }
            }
            _ = shutdown_signal() => break,
        }
    }

    // Guaranteed cleanup: runs exactly once, no child processes leak.
    tracing::info!("shutting down, stopping all services");
    supervisor.stop_all().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

/// Route one request. Generic over the body type — routing never reads
/// the request body.
pub async fn handle_request<B>(
    supervisor: Arc<Supervisor>,
    req: Request<B>,
) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();

    match (req.method(), path.as_str()) {
        (&Method::GET, "/") | (&Method::GET, "/status") => {
            let services = supervisor.status_all().await;
            json_response(
                StatusCode::OK,
                &serde_json::json!({ "services": services }),
            )
        }
        (&Method::POST, p) if p.starts_with("/start/") => {
            start_service(supervisor, &p["/start/".len()..]).await
        }
        (&Method::POST, p) if p.starts_with("/stop/") => {
            stop_service(supervisor, &p["/stop/".len()..]).await
        }
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn start_service(supervisor: Arc<Supervisor>, identifier: &str) -> Response<Full<Bytes>> {
    match supervisor.start(identifier).await {
        Ok(_) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "status": "starting", "service": identifier }),
        ),
        Err(Error::UnknownService(_)) => {
            error_response(StatusCode::NOT_FOUND, "Service not found")
        }
        Err(err) => {
            tracing::error!("failed to start '{}': {}", identifier, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to start service")
        }
    }
}

async fn stop_service(supervisor: Arc<Supervisor>, identifier: &str) -> Response<Full<Bytes>> {
    match supervisor.stop(identifier).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "status": "stopped", "service": identifier }),
        ),
        Err(Error::UnknownService(_)) => {
            error_response(StatusCode::NOT_FOUND, "Service not found")
        }
        Err(Error::NotRunning(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Service was not running")
        }
        Err(err) => {
            tracing::error!("failed to stop '{}': {}", identifier, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to stop service")
        }
    }
}

fn json_response(status: StatusCode, value: &serde_json::Value) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn error_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "detail": detail }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SupervisorConfig};
    use crate::registry::ServiceDescriptor;
    use std::path::PathBuf;

    fn supervisor() -> Arc<Supervisor> {
        let config = Config {
            supervisor: SupervisorConfig {
                probe_timeout_ms: 500,
                open_browser: false,
                ..SupervisorConfig::default()
            },
            services: vec![ServiceDescriptor {
                identifier: "svc_a".to_string(),
                display_name: "Service A".to_string(),
                working_directory: PathBuf::from("."),
                port: 59901,
                command: vec!["sleep".to_string(), "30".to_string()],
                health_path: "/health".to_string(),
                docs_path: None,
            }],
        };
        Arc::new(Supervisor::new(config))
    }

    fn request(method: Method, path: &str) -> Request<()> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_routes_report_all_services() {
        let supervisor = supervisor();
        for path in ["/", "/status"] {
            let response =
                handle_request(supervisor.clone(), request(Method::GET, path)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_start_unknown_service_is_404() {
        let response =
            handle_request(supervisor(), request(Method::POST, "/start/ghost")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stop_unknown_service_is_404() {
        let response =
            handle_request(supervisor(), request(Method::POST, "/stop/ghost")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stop_not_running_is_500() {
        let response =
            handle_request(supervisor(), request(Method::POST, "/stop/svc_a")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response =
            handle_request(supervisor(), request(Method::GET, "/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Probe classification against real listeners: 2xx is running, non-2xx
//! is an error response, and transport failures are stopped — never an
//! error surfaced to the caller.

use convoy::{HealthState, Prober, ServiceDescriptor};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

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

async fn stub_http_server(port: u16, status_line: &'static str) -> tokio::task::JoinHandle<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("stub server bind");

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status_line
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    })
}

#[tokio::test]
async fn test_200_classifies_running() {
    let stub = stub_http_server(59931, "200 OK").await;
    let state = Prober::new(Duration::from_secs(1))
        .probe(&descriptor(59931))
        .await;
    assert_eq!(state, HealthState::Running);
    stub.abort();
}

#[tokio::test]
async fn test_503_classifies_error_response() {
    let stub = stub_http_server(59932, "503 Service Unavailable").await;
    let state = Prober::new(Duration::from_secs(1))
        .probe(&descriptor(59932))
        .await;
    assert_eq!(state, HealthState::ErrorResponse);
    stub.abort();
}

#[tokio::test]
async fn test_no_listener_classifies_stopped() {
    let state = Prober::new(Duration::from_secs(1))
        .probe(&descriptor(59933))
        .await;
    assert_eq!(state, HealthState::Stopped);
}

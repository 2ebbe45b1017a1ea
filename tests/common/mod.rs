//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lgtm_demo::config::{DelayRange, ServiceConfig, SimulationConfig};
use lgtm_demo::http::HttpServer;
use lgtm_demo::lifecycle::Shutdown;
use lgtm_demo::observability::Telemetry;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Read the request head (request line and headers) off `socket`.
async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Start a programmable mock upstream on an ephemeral port. `f` receives the
/// raw request head and returns the status and body to send back.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let (status, body) = f(head).await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a mock upstream that always answers `status` with a small JSON body.
pub async fn start_mock_backend(status: u16) -> SocketAddr {
    start_programmable_backend(move |_| async move { (status, r#"{"id":1}"#.to_string()) }).await
}

/// Config with no simulated latency, no DB failures, no emitter and no OTLP,
/// pointed at `upstream`.
pub fn test_config(upstream: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.telemetry.otlp_enabled = false;
    config.telemetry.log_file = None;
    config.emitter.enabled = false;
    config.upstream.url = format!("http://{}/posts/1", upstream);
    config.upstream.timeout_secs = 1;
    config.simulation = SimulationConfig {
        home_delay_ms: DelayRange::new(0, 0),
        db_delay_ms: DelayRange::new(0, 0),
        items_delay_ms: DelayRange::new(0, 0),
        db_error_probability: 0.0,
        ..SimulationConfig::default()
    };
    config
}

/// A running service on an ephemeral port.
pub struct TestService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop");
        result.unwrap().unwrap();
    }
}

/// Serve `config` with the given telemetry context.
pub async fn spawn_service_with(config: ServiceConfig, telemetry: Arc<Telemetry>) -> TestService {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, telemetry).unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestService {
        addr,
        shutdown,
        handle,
    }
}

/// Serve `config` with telemetry export disabled.
pub async fn spawn_service(config: ServiceConfig) -> TestService {
    let telemetry = Arc::new(Telemetry::disabled(&config.service));
    spawn_service_with(config, telemetry).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

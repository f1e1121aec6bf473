#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{http::HeaderMap, http::StatusCode as AxumStatus, routing::post, Router};
use reqwest::StatusCode;

/// Token the fake OAuth service accepts.
pub const VALID_TOKEN: &str = "valid.token.sig";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Stand-in for the OAuth service's /validate endpoint.
async fn validate(headers: HeaderMap) -> AxumStatus {
    let expected = format!("Bearer {}", VALID_TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => AxumStatus::OK,
        _ => AxumStatus::UNAUTHORIZED,
    }
}

/// Start the fake OAuth service on the current runtime; returns its port.
pub async fn spawn_fake_oauth() -> Result<u16> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind fake oauth")?;
    let port = listener.local_addr()?.port();
    let app = Router::new().route("/validate", post(validate));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(port)
}

impl TestServer {
    fn spawn(oauth_port: u16) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_classe-microservice"));
        cmd.arg("--port")
            .arg(port.to_string())
            .env("CLASSES_STORAGE", "memory")
            .env("OAUTH_INTERNAL_PROTOCOL", "http")
            .env("OAUTH_INTERNAL_HOST", "127.0.0.1")
            .env("OAUTH_INTERNAL_API_PORT", oauth_port.to_string())
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request carrying the token the fake OAuth service accepts.
    pub fn authed(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("authorization", format!("Bearer {}", VALID_TOKEN))
    }
}

/// Server backed by the in-memory store and a working fake OAuth service.
pub async fn start_server() -> Result<TestServer> {
    let oauth_port = spawn_fake_oauth().await?;
    start_server_with_oauth_port(oauth_port).await
}

/// Server whose OAuth service lives on `oauth_port` (which may be closed).
pub async fn start_server_with_oauth_port(oauth_port: u16) -> Result<TestServer> {
    let server = TestServer::spawn(oauth_port)?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

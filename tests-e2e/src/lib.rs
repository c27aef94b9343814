//! Harness for end-to-end tests: a real `todo-server` on an ephemeral port,
//! driven over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use serde_json::{Value, json};
use todo_server::{config::Config, state::AppState};
use tokio::{net::TcpListener, task::JoinHandle};

pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by a fresh in-memory database.
    pub async fn start() -> anyhow::Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut config = Config::with_database("sqlite::memory:");
        config.jwt_secret = Some("e2e-secret".to_string());
        let state = AppState::from_config(&config).await?;
        let app = todo_server::app(state, &config);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("Test server stopped: {e}");
            }
        });

        log::info!("Test server listening on {addr}");
        Ok(Self { addr, handle })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A client that keeps cookies, like a browser tab.
    pub fn client(&self) -> anyhow::Result<reqwest::Client> {
        Ok(reqwest::Client::builder().cookie_store(true).build()?)
    }

    /// A client already signed in as a fresh, uniquely named user.
    pub async fn signed_in_client(&self) -> anyhow::Result<(reqwest::Client, String)> {
        let client = self.client()?;
        let username = format!("user-{}", uuid::Uuid::new_v4());

        let response = client
            .post(self.url("/api/register"))
            .json(&json!({ "username": username, "password": "password" }))
            .send()
            .await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::CREATED,
            "register failed: {}",
            response.status()
        );
        let _: Value = response.json().await?;

        Ok((client, username))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

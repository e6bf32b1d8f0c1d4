//! End-to-end tests for the phone dialer server.
//!
//! Each test boots the real router on an ephemeral port over a fresh
//! temporary data directory and talks to it with a cookie-keeping client.
//!
//! ```rust,ignore
//! let server = TestServer::start().await;
//! let client = server.login("admin", "admin123", "admin").await;
//! let resp = client.get(server.url("/api/stats")).send().await.unwrap();
//! assert_eq!(resp.status(), 200);
//! ```

use std::net::SocketAddr;
use std::path::Path;

use reqwest::Client;
use serde_json::json;
use tempfile::TempDir;

use phone_dialer_server::app;
use phone_dialer_server::config::ServerConfig;
use phone_dialer_server::state::AppState;

/// A server running on `127.0.0.1` for the lifetime of the value.
pub struct TestServer {
    addr: SocketAddr,
    data_dir: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Seed a temporary data directory and serve the app over it.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be seeded or the listener cannot bind.
    pub async fn start() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create data directory");
        let state = AppState::new(ServerConfig::for_data_dir(data_dir.path()));
        state
            .store()
            .initialize()
            .await
            .expect("Failed to seed data directory");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to read local address");

        let router = app(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            data_dir,
            handle,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The server's data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// A fresh client with its own cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// A fresh client logged in as `username`.
    ///
    /// # Panics
    ///
    /// Panics if the login request fails or is rejected.
    pub async fn login(&self, username: &str, password: &str, role: &str) -> Client {
        let client = self.client();
        let resp = client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password, "role": role }))
            .send()
            .await
            .expect("Failed to send login request");
        assert!(
            resp.status().is_success(),
            "login as {username} failed: {}",
            resp.status()
        );
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//! Test server management
//!
//! Spawns the real router on a random port with its own database.

use super::constants::*;
use super::fixtures::create_test_db;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use vidshare::server::{make_app, RequestsLoggingLevel, ServerConfig};
use vidshare::user::IdentitySettings;
use vidshare::{AppState, GuardedAppState};

/// A running server, shut down when dropped.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:54321`
    pub base_url: String,

    /// The state the server works on, for assertions behind its back
    pub app: GuardedAppState,

    // Keeps the database alive for the whole test
    _temp_dir: TempDir,

    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server whose database holds the fixture users, nobody is
    /// logged in.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = create_test_db(temp_dir.path());
        let app = AppState::load(store, IdentitySettings::default()).into_guarded();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let router = make_app(config, app.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test port");
        let port = listener.local_addr().expect("No local address").port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Test server failed");
        });

        let server = TestServer {
            base_url,
            app,
            _temp_dir: temp_dir,
            shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::new();
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(SERVER_READY_TIMEOUT_MS);
        while tokio::time::Instant::now() < deadline {
            if let Ok(response) = client.get(format!("{}/", self.base_url)).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
        }
        panic!("Test server did not become ready in time");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

use std::net::SocketAddr;
use std::time::Duration;

use crate::core::{Config, Result, ServerState};

/// Binds the API router and serves it until ctrl-c
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn new(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// In-flight requests get `SHUTDOWN_TIMEOUT_MS` to finish after the
    /// signal; whatever is still running then is dropped.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let app = crate::api::build_app(&self.state).with_state(self.state);

        let handle = axum_server::Handle::new();
        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::spawn({
            let handle = handle.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!(grace_ms = grace.as_millis() as u64, "Draining requests");
                    handle.graceful_shutdown(Some(grace));
                }
            }
        });

        tracing::info!(%addr, environment = %self.config.environment, "Listening");
        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::api::handlers::{handle_command, handle_health, handle_task, handle_tasks};
use crate::plugin::LogAnalyzerPlugin;

/// HTTP face of the plugin for hosts that dispatch commands over the wire.
pub struct AnalyzerServer {
    pub port: u16,
    pub plugin: LogAnalyzerPlugin,
}

impl AnalyzerServer {
    pub fn new(port: u16, plugin: LogAnalyzerPlugin) -> Self {
        Self { port, plugin }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handle_health))
            .route("/command", post(handle_command))
            .route("/tasks", get(handle_tasks))
            .route("/tasks/:id", get(handle_task))
            .with_state(self.plugin.clone())
    }

    pub async fn start(&self) -> Result<(), String> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "log analyzer listening");
        axum::Server::bind(&addr)
            .serve(self.router().into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}

//! HTTP server for the demo.
//!
//! `GET /api/hello` answers with a fixed JSON greeting in every mode. In
//! production the server also serves static files from the public and
//! frontend directories and falls back to the frontend `index.html` for any
//! other path. In development only `GET /` is answered, with plain text.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    Development,
    Production,
}

impl ServerMode {
    /// `production` selects production mode; anything else is development.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => ServerMode::Production,
            _ => ServerMode::Development,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub mode: ServerMode,
    pub public_dir: PathBuf,
    pub frontend_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: ServerMode::Development,
            public_dir: PathBuf::from("public"),
            frontend_dir: PathBuf::from("frontend"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub message: String,
}

async fn hello() -> Json<Hello> {
    Json(Hello {
        message: "Hello from the server!".to_string(),
    })
}

async fn dev_root() -> &'static str {
    "Hello World!"
}

pub fn router(config: &ServerConfig) -> Router {
    let app = Router::new().route("/api/hello", get(hello));

    let app = match config.mode {
        ServerMode::Production => {
            let index = ServeFile::new(config.frontend_dir.join("index.html"));
            let files = ServeDir::new(&config.public_dir)
                .fallback(ServeDir::new(&config.frontend_dir).fallback(index));
            app.fallback_service(files)
        }
        ServerMode::Development => app.route("/", get(dev_root)),
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `0.0.0.0:port` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!(
        mode = ?config.mode,
        "server running at http://localhost:{}",
        config.port
    );
    axum::serve(listener, router(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

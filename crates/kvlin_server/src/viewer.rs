//! Viewer server

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default listen host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Viewer server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Page to serve
    pub artifact: PathBuf,
}

impl ServerConfig {
    /// Serve `artifact` on the default address
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            artifact: artifact.into(),
        }
    }

    /// Set the listen port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the listen host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// `host:port`
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Browser URL of the page
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.address())
    }
}

/// Viewer server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// There is no page to serve
    #[error("artifact not found: {}", .path.display())]
    MissingArtifact {
        /// Expected page location
        path: PathBuf,
    },

    /// The listen address could not be bound
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Requested address
        address: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// The server stopped with an error
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Serves a single report page
#[derive(Debug, Clone)]
pub struct ViewerServer {
    config: ServerConfig,
}

impl ViewerServer {
    /// Create a server for an existing page
    ///
    /// # Errors
    ///
    /// Returns error if the page does not exist
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        if !config.artifact.is_file() {
            return Err(ServerError::MissingArtifact {
                path: config.artifact,
            });
        }
        Ok(Self { config })
    }

    /// Server configuration
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Routes: every path answers with the page
    pub fn router(&self) -> Router {
        let artifact = Arc::new(self.config.artifact.clone());
        Router::new()
            .route("/", get(page))
            .fallback(page)
            .layer(TraceLayer::new_for_http())
            .with_state(artifact)
    }

    /// Serve until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or serving fails
    pub async fn serve(self) -> Result<(), ServerError> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;

        info!(
            url = %self.config.url(),
            artifact = %self.config.artifact.display(),
            "serving report"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Serve)?;

        info!("viewer stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C");
    }
}

async fn page(State(artifact): State<Arc<PathBuf>>) -> Response {
    match tokio::fs::read_to_string(artifact.as_path()).await {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            warn!(path = %artifact.display(), error = %err, "artifact unreadable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to read {}: {err}", artifact.display()),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn fetch(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::new("report.html");
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.with_port(9000).url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerServer::new(ServerConfig::new(dir.path().join("none.html"))).unwrap_err();
        assert!(matches!(err, ServerError::MissingArtifact { .. }));
    }

    #[tokio::test]
    async fn test_serves_page_on_every_path() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("history.html");
        std::fs::write(&artifact, "<html>report</html>").unwrap();

        let server = ViewerServer::new(ServerConfig::new(&artifact)).unwrap();
        let (status, body) = fetch(server.router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>report</html>");

        let (status, body) = fetch(server.router(), "/history.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("report"));
    }

    #[tokio::test]
    async fn test_page_removed_after_start() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("history.html");
        std::fs::write(&artifact, "x").unwrap();
        let server = ViewerServer::new(ServerConfig::new(&artifact)).unwrap();

        std::fs::remove_file(&artifact).unwrap();
        let (status, _) = fetch(server.router(), "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Axum-based development server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::handlers;
use crate::state::DevState;

/// Every API route over `state`, with permissive CORS.
pub fn router(state: Arc<DevState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/candidates/getcandidates", get(handlers::list_candidates))
        .route("/api/candidates/addcandidate", post(handlers::add_candidate))
        .route("/api/elections/getelections", get(handlers::list_elections))
        .route("/api/elections/addelection", post(handlers::add_election))
        .route("/api/elections/:id/vote", post(handlers::cast_vote))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The development backend, configured with a port and seeded state.
pub struct RpcServer {
    pub port: u16,
    pub state: Arc<DevState>,
}

impl RpcServer {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        Ok(Self {
            port: config.port,
            state: Arc::new(DevState::seeded(config)?),
        })
    }

    /// Bind `0.0.0.0:<port>` and serve until the process exits.
    pub async fn start(&self) -> Result<(), RpcError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Internal(format!("failed to bind {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), RpcError> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "development backend listening");
        }
        axum::serve(listener, router(self.state.clone()))
            .await
            .map_err(|e| RpcError::Internal(format!("server error: {e}")))
    }
}

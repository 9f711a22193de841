/// Admin gateway for the Leshan server.
///
/// The gateway is a thin proxy. It never stores device state. It:
/// - Authenticates callers with a static token
/// - Forwards reads/writes/deletes of registrations, bootstrap and
///   security configurations to the Leshan REST API
/// - Runs bulk provisioning on request
pub mod auth;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pacing::Pacer;
use crate::pipeline::PipelineConfig;
use crate::upstream::LeshanApi;

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Leshan REST API client.
    pub upstream: Arc<dyn LeshanApi>,
    /// Pacing between devices of a bulk run.
    pub pacer: Arc<dyn Pacer>,
    pub pipeline: PipelineConfig,
    /// Token callers must present.
    pub gateway_token: String,
}

/// Build the Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::client_routes())
        .merge(routes::bootstrap_routes())
        .merge(routes::generate_routes())
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway.
pub async fn serve(state: AppState, addr: &str) -> crate::error::Result<()> {
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("leshan-admin gateway listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

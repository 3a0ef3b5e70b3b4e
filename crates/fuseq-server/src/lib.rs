//! fuseq-server - Service wiring and HTTP query surface
//!
//! [`QueryService`] wires the configured adapters, embedder and weight
//! strategy into a [`fuseq_query::QueryEngine`]; the axum router exposes
//! it as `GET /query` plus a `GET /health` probe.

mod error;
mod routes;
mod service;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use service::QueryService;
pub use state::AppState;

use std::sync::Arc;

use tracing::info;

use fuseq_core::Result;

/// Run the HTTP server until the process is stopped.
pub async fn serve(service: Arc<QueryService>, bind: &str) -> Result<()> {
    let state = AppState::new(service);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

//! HTTP route definitions.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use fuseq_core::{QueryRequest, QueryResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", get(query))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /query?q=<text>&k=<int>&mmr=<float 0..1>`
///
/// Dropping the connection cancels the in-flight source requests along
/// with this handler's future.
async fn query(
    State(state): State<AppState>,
    Query(request): Query<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let response = state.service.search(&request).await?;
    Ok(Json(response))
}

/// `GET /health`
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.uptime_seconds(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use fuseq_core::{
        Candidate, CandidateSource, FixedWeights, FuseConfig, SearchConfig, SourceKind,
    };
    use fuseq_query::{FixedStrategy, QueryEngine};
    use fuseq_source::StaticSource;

    use crate::service::QueryService;

    fn source(name: &str, kind: SourceKind, ids: &[&str]) -> Arc<dyn CandidateSource> {
        let candidates = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Candidate::new(*id, 1.0 - i as f32 * 0.1, kind))
            .collect();
        Arc::new(StaticSource::new(name, kind, candidates))
    }

    fn app(sources: Vec<Arc<dyn CandidateSource>>) -> Router {
        let engine = QueryEngine::new(
            sources,
            Arc::new(FixedStrategy::new(FixedWeights::default())),
            SearchConfig::default(),
            Duration::from_millis(200),
        );
        let service = QueryService::with_engine(engine, FuseConfig::default());
        router(AppState::new(Arc::new(service)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(vec![source("qdrant", SourceKind::Vector, &["a"])]);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_query_returns_results_and_explanation() {
        let app = app(vec![
            source("qdrant", SourceKind::Vector, &["A", "B", "C"]),
            source("meili", SourceKind::Lexical, &["C", "A", "D"]),
        ]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/query?q=rust%20async&k=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_results"], 2);
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
        assert_eq!(json["explain"]["degraded"], false);
        assert_eq!(json["explain"]["sources"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_with_mmr_reports_rerank() {
        let app = app(vec![source("qdrant", SourceKind::Vector, &["a", "b"])]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/query?q=rust&k=2&mmr=0.3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["explain"]["reranked"], true);
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let app = app(vec![source("qdrant", SourceKind::Vector, &["a"])]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/query?q=%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_all_sources_down_is_service_unavailable() {
        let app = app(vec![
            Arc::new(StaticSource::failing(
                "qdrant",
                SourceKind::Vector,
                "down",
            )),
            Arc::new(StaticSource::failing(
                "meili",
                SourceKind::Lexical,
                "down",
            )),
        ]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/query?q=rust")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "ALL_SOURCES_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_degraded_query_still_succeeds() {
        let app = app(vec![
            Arc::new(StaticSource::failing(
                "qdrant",
                SourceKind::Vector,
                "down",
            )),
            source("meili", SourceKind::Lexical, &["a", "b"]),
        ]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/query?q=rust")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["explain"]["degraded"], true);
        assert_eq!(json["total_results"], 2);
    }
}

use crate::api::{handlers, AppState};
use crate::metrics::track_metrics;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Index management
        .route("/v1/indexes", get(handlers::list_indexes))
        .route("/v1/indexes/:name", get(handlers::get_index))
        .route(
            "/v1/indexes/:name/rebuild",
            post(handlers::rebuild_index).get(handlers::rebuild_status),
        )
        // Search
        .route("/v1/indexes/:name/search", post(handlers::search))
        // Per-route metrics, so the matched path is known
        .route_layer(middleware::from_fn(track_metrics))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}

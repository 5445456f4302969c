use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::map_page))
        .route("/stats", get(handlers::stats_page))
        .route(
            "/api/sessions/:session/passes/:seq",
            get(handlers::render_pass),
        )
        .route("/api/charts", get(handlers::get_charts))
        .route("/api/world", get(handlers::get_world))
        .route("/data.json", get(handlers::data_json))
        .route("/stats.json", get(handlers::stats_json))
        .route("/locations.json", get(handlers::locations_json))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

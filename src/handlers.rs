use crate::errors::AppError;
use crate::filters::FilterState;
use crate::models::{Dataset, Locations, StatsSeries};
use crate::render::RenderPass;
use crate::state::AppState;
use crate::stats::{build_charts, ChartsResponse};
use crate::storage::{load_raw, load_snapshot};
use crate::ui::{render_map_page, render_stats_page};
use crate::world::{build_world_map, WorldMapConfig};
use axum::{
    extract::{Path, RawQuery, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

pub async fn map_page(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, AppError> {
    let filters = FilterState::from_query(query.as_deref().unwrap_or_default());
    let session = open_session(&state).await?;
    Ok(Html(render_map_page(&filters, &state.config.map, session)))
}

pub async fn stats_page() -> Html<String> {
    Html(render_stats_page())
}

pub async fn render_pass(
    State(state): State<AppState>,
    Path((session, seq)): Path<(u64, u64)>,
    RawQuery(query): RawQuery,
) -> Result<Json<RenderPass>, AppError> {
    let filters = FilterState::from_query(query.as_deref().unwrap_or_default());
    let pass = state.sessions.lock().await.render(session, seq, &filters)?;
    debug!(
        session,
        seq,
        removed = pass.removed_layers,
        shown = pass.shown,
        total = pass.total,
        layers = pass.layers.len(),
        "rendered markers"
    );
    Ok(Json(pass))
}

pub async fn get_charts(State(state): State<AppState>) -> Result<Json<ChartsResponse>, AppError> {
    let stats: StatsSeries = load_snapshot(&state.source.stats_path()).await?;
    Ok(Json(build_charts(&stats)))
}

pub async fn get_world(State(state): State<AppState>) -> Result<Json<WorldMapConfig>, AppError> {
    let locations: Locations = load_snapshot(&state.source.locations_path()).await?;
    Ok(Json(build_world_map(locations, &state.config.master_country)))
}

pub async fn data_json(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    raw_json(state.source.data_path()).await
}

pub async fn stats_json(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    raw_json(state.source.stats_path()).await
}

pub async fn locations_json(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    raw_json(state.source.locations_path()).await
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn open_session(state: &AppState) -> Result<u64, AppError> {
    let data: Dataset = load_snapshot(&state.source.data_path()).await?;
    let mut sessions = state.sessions.lock().await;
    let id = sessions.open(Arc::new(data), &state.config.link_base);
    debug!(session = id, open = sessions.len(), "opened map session");
    Ok(id)
}

async fn raw_json(path: PathBuf) -> Result<impl IntoResponse, AppError> {
    let bytes = load_raw(&path).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes))
}

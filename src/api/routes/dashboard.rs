//! Dashboard Routes
//!
//! - GET / - The rendered panel as an HTML page
//! - GET /data.json - The raw payload, never cached
//! - GET /api/v1/panel - Container contents as JSON
//! - POST /api/v1/refresh - Run a refresh cycle now

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PanelResponse, RefreshResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let panel = state.dashboard.panel().await;
    let layout = state.dashboard.renderer().layout();
    let order = [
        layout.timestamp.as_str(),
        layout.breaches.as_str(),
        layout.rss.as_str(),
        layout.summary.as_str(),
    ];
    let reload = state.dashboard.interval().as_secs();

    Html(panel.to_page(&state.title, &order, Some(reload)))
}

/// GET /data.json
pub async fn data_json(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let path = state.data_path();
    let body = match tokio::fs::read(&path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "{} has not been built yet",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    ))
}

/// GET /api/v1/panel
pub async fn panel(State(state): State<Arc<AppState>>) -> Json<PanelResponse> {
    Json(PanelResponse {
        containers: state.dashboard.panel().await.snapshot(),
        stats: state.dashboard.stats().await,
    })
}

/// POST /api/v1/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    state.dashboard.refresh().await?;

    Ok(Json(RefreshResponse {
        status: "refreshed".to_string(),
        stats: state.dashboard.stats().await,
    }))
}

pub mod model;

use crate::database::{Pager, SnapshotListCriteria};
use crate::domain::snapshot::SnapshotCriteria;
use crate::features::{error_status, parse_sort};
use crate::services::snapshot_manager::parse_keep;
use crate::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use model::JsonSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub fn snapshots_router() -> Router<AppState> {
    Router::new()
        .route("/pages/{id}/publish", post(publish_page_handler))
        .route("/pages/{id}/snapshots", get(list_snapshots_handler))
        .route("/pages/{id}/snapshots/cleanup", post(cleanup_handler))
        .route("/snapshots", get(snapshot_pager_handler))
        .route("/snapshots/active", get(active_snapshot_handler))
}

#[derive(Deserialize, Debug, Default)]
pub struct CleanupParams {
    pub keep: Option<String>,
}

#[derive(Serialize)]
pub struct CleanupResult {
    pub deleted: u64,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPagerParams {
    pub enabled: Option<bool>,
    pub site: Option<String>,
    pub page_id: Option<String>,
    pub parent: Option<String>,
    pub root: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

async fn publish_page_handler(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<(StatusCode, Json<JsonSnapshot>), StatusCode> {
    let page = state.pages.find(&page_id).await.map_err(error_status)?;
    let snapshot = state
        .snapshots
        .publish_page(&page, &state.blocks)
        .await
        .map_err(error_status)?;
    state.pages.mark_published(page).await.map_err(error_status)?;

    Ok((StatusCode::CREATED, Json(JsonSnapshot::from(&snapshot))))
}

async fn list_snapshots_handler(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Vec<JsonSnapshot>>, StatusCode> {
    let snapshots = state
        .snapshots
        .get_snapshots_by_page(&page_id)
        .await
        .map_err(error_status)?;

    Ok(Json(snapshots.iter().map(JsonSnapshot::from).collect()))
}

async fn snapshot_pager_handler(
    State(state): State<AppState>,
    Query(params): Query<SnapshotPagerParams>,
) -> Result<Json<Pager<JsonSnapshot>>, StatusCode> {
    let sort = parse_sort(params.sort.as_deref())?;
    let criteria = SnapshotListCriteria {
        enabled: params.enabled,
        site_id: params.site,
        page_id: params.page_id,
        parent_id: params.parent,
        root: params.root,
    };

    let pager = state
        .snapshots
        .get_pager(criteria, params.page.unwrap_or(1), params.limit.unwrap_or(10), &sort)
        .await
        .map_err(error_status)?;

    Ok(Json(pager.map(|snapshot| JsonSnapshot::from(&snapshot))))
}

async fn cleanup_handler(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupResult>, StatusCode> {
    let keep = match params.keep.as_deref() {
        Some(raw) => parse_keep(raw).map_err(error_status)?,
        None => state.snapshots.retention(),
    };

    let deleted = state
        .snapshots
        .cleanup(&page_id, keep)
        .await
        .map_err(error_status)?;

    Ok(Json(CleanupResult { deleted }))
}

async fn active_snapshot_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<JsonSnapshot>, StatusCode> {
    let criteria = SnapshotCriteria::from_params(&params).map_err(error_status)?;
    let snapshot = state
        .snapshots
        .find_enable_snapshot(&criteria, None)
        .await
        .map_err(error_status)?;

    Ok(Json(JsonSnapshot::from(&snapshot)))
}

pub mod model;

use crate::database::{PageCriteria, Pager};
use crate::domain::document::{JsonPage, page_tree_to_json};
use crate::features::{error_status, parse_sort};
use crate::services::TreeSession;
use crate::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value};

pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/sites/{site_id}/pages", get(list_pages_handler))
        .route("/sites/{site_id}/tree", get(page_tree_handler))
        .route("/pages", post(create_page_handler))
        .route("/pages/{id}", get(get_page_handler))
}

#[derive(Deserialize, Debug, Default)]
pub struct PagerParams {
    pub enabled: Option<bool>,
    pub edited: Option<bool>,
    pub parent: Option<String>,
    pub root: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

async fn list_pages_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Query(params): Query<PagerParams>,
) -> Result<Json<Pager<JsonPage>>, StatusCode> {
    let sort = parse_sort(params.sort.as_deref())?;
    let criteria = PageCriteria {
        enabled: params.enabled,
        edited: params.edited,
        site_id: Some(site_id),
        parent_id: params.parent.clone(),
        root: params.root,
    };

    let pager = state
        .pages
        .get_pager(criteria, params.page.unwrap_or(1), params.limit.unwrap_or(10), &sort)
        .await
        .map_err(error_status)?;

    Ok(Json(pager.map(|page| JsonPage::from(&page))))
}

async fn page_tree_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<Vec<JsonPage>>, StatusCode> {
    let session = TreeSession::new();
    let tree = state
        .pages
        .load_pages(&session, &site_id)
        .await
        .map_err(error_status)?;

    Ok(Json(page_tree_to_json(&tree)))
}

async fn create_page_handler(
    State(state): State<AppState>,
    Json(values): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<JsonPage>), StatusCode> {
    let page = state.pages.create(values).map_err(error_status)?;
    let page = state.pages.save(page).await.map_err(error_status)?;

    Ok((StatusCode::CREATED, Json(JsonPage::from(&page))))
}

async fn get_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JsonPage>, StatusCode> {
    let page = state.pages.find(&id).await.map_err(error_status)?;
    Ok(Json(JsonPage::from(&page)))
}

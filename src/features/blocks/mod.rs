pub mod model;

use crate::database::{BlockCriteria, Pager};
use crate::domain::block::BlockPosition;
use crate::domain::document::{JsonBlock, block_tree_to_json};
use crate::features::{error_status, parse_sort};
use crate::services::block_interactor::ContainerValues;
use crate::services::TreeSession;
use crate::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub fn blocks_router() -> Router<AppState> {
    Router::new()
        .route("/blocks", get(list_blocks_handler))
        .route("/pages/{id}/blocks", get(page_blocks_handler))
        .route("/pages/{id}/containers", post(create_container_handler))
        .route("/blocks/positions", post(save_positions_handler))
}

#[derive(Serialize)]
pub struct PositionsResult {
    pub updated: u64,
}

#[derive(Deserialize, Debug, Default)]
pub struct BlockPagerParams {
    pub enabled: Option<bool>,
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

async fn list_blocks_handler(
    State(state): State<AppState>,
    Query(params): Query<BlockPagerParams>,
) -> Result<Json<Pager<JsonBlock>>, StatusCode> {
    let sort = parse_sort(params.sort.as_deref())?;
    let criteria = BlockCriteria {
        enabled: params.enabled,
        block_type: params.block_type,
    };

    let pager = state
        .blocks
        .get_pager(criteria, params.page.unwrap_or(1), params.limit.unwrap_or(10), &sort)
        .await
        .map_err(error_status)?;

    Ok(Json(pager.map(|block| JsonBlock::from(&block))))
}

async fn page_blocks_handler(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Vec<JsonBlock>>, StatusCode> {
    let session = TreeSession::new();
    let tree = state
        .blocks
        .load_page_blocks(&session, &page_id)
        .await
        .map_err(error_status)?;

    Ok(Json(block_tree_to_json(&tree)))
}

async fn create_container_handler(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    Json(mut values): Json<ContainerValues>,
) -> Result<(StatusCode, Json<JsonBlock>), StatusCode> {
    // the page must exist before anything is attached to it
    state.pages.find(&page_id).await.map_err(error_status)?;
    values.page_id = Some(page_id);

    let container = state
        .blocks
        .create_new_container(values)
        .await
        .map_err(error_status)?;

    Ok((StatusCode::CREATED, Json(JsonBlock::from(&container))))
}

async fn save_positions_handler(
    State(state): State<AppState>,
    Json(entries): Json<Vec<Value>>,
) -> Result<Json<PositionsResult>, StatusCode> {
    let items = BlockPosition::from_entries(entries);
    let updated = state
        .blocks
        .save_blocks_position(&items)
        .await
        .map_err(error_status)?;

    Ok(Json(PositionsResult { updated }))
}

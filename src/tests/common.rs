use crate::database::sqlite::SqliteRepository;
use crate::db;
use crate::domain::block::CONTAINER_TYPE;
use crate::domain::page::PAGE_ROUTE_CMS_NAME;
use crate::domain::{Block, LoadStatus, Page, Snapshot};
use chrono::NaiveDateTime;
use serde_json::{Map, Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

// a fresh in-memory database with the schema applied. one connection only: every
// connection to `sqlite::memory:` would otherwise get its own empty database
pub async fn setup_test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    db::migrate(&pool).await.expect("Failed to run migrations");

    pool
}

pub async fn setup_test_db() -> SqliteRepository {
    SqliteRepository::new(setup_test_pool().await)
}

pub fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").expect("valid timestamp")
}

pub fn mock_page(id: &str, site_id: &str, parent_id: Option<&str>) -> Page {
    Page {
        id: id.to_string(),
        site_id: site_id.to_string(),
        parent_id: parent_id.map(str::to_string),
        name: id.to_string(),
        slug: None,
        url: None,
        route_name: PAGE_ROUTE_CMS_NAME.to_string(),
        page_alias: None,
        enabled: true,
        edited: false,
        position: 1,
        created_at: ts("2024-01-01 12:00:00"),
        updated_at: ts("2024-01-01 12:00:00"),
        children: Vec::new(),
        load_status: LoadStatus::Unloaded,
    }
}

pub fn mock_block(id: &str, page_id: &str, parent_id: Option<&str>) -> Block {
    let mut settings = Map::new();
    settings.insert("code".to_string(), Value::String(id.to_string()));

    Block {
        id: id.to_string(),
        page_id: Some(page_id.to_string()),
        parent_id: parent_id.map(str::to_string),
        block_type: CONTAINER_TYPE.to_string(),
        name: id.to_string(),
        settings,
        position: 1,
        enabled: true,
        created_at: ts("2024-01-01 12:00:00"),
        updated_at: ts("2024-01-01 12:00:00"),
        children: Vec::new(),
        load_status: LoadStatus::Unloaded,
    }
}

pub fn mock_snapshot(id: &str, page_id: &str, created_at: &str) -> Snapshot {
    Snapshot {
        id: id.to_string(),
        page_id: page_id.to_string(),
        site_id: "site-1".to_string(),
        parent_id: None,
        route_name: PAGE_ROUTE_CMS_NAME.to_string(),
        url: Some(format!("/{page_id}")),
        page_alias: None,
        name: page_id.to_string(),
        enabled: true,
        content: json!({ "page": { "id": page_id } }),
        publication_date_start: None,
        publication_date_end: None,
        created_at: ts(created_at),
    }
}

use crate::domain::Snapshot;
use crate::error::PageTreeError;
use crate::domain::document::DATETIME_FORMAT;
use chrono::NaiveDateTime;
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(sqlx::FromRow, Debug, Eq, PartialEq, Clone, Display)]
#[display("{} of page {}", id, page_id)]
pub struct DbSnapshot {
    pub id: String,
    pub page_id: String,
    pub site_id: String,
    pub parent_id: Option<String>,
    pub route_name: String,
    pub url: Option<String>,
    pub page_alias: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub content: String,
    pub publication_date_start: Option<NaiveDateTime>,
    pub publication_date_end: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<DbSnapshot> for Snapshot {
    type Error = PageTreeError;

    fn try_from(db_snapshot: DbSnapshot) -> Result<Self, Self::Error> {
        Ok(Snapshot {
            content: serde_json::from_str(&db_snapshot.content)?,
            id: db_snapshot.id,
            page_id: db_snapshot.page_id,
            site_id: db_snapshot.site_id,
            parent_id: db_snapshot.parent_id,
            route_name: db_snapshot.route_name,
            url: db_snapshot.url,
            page_alias: db_snapshot.page_alias,
            name: db_snapshot.name,
            enabled: db_snapshot.enabled,
            publication_date_start: db_snapshot.publication_date_start,
            publication_date_end: db_snapshot.publication_date_end,
            created_at: db_snapshot.created_at,
        })
    }
}

impl From<&Snapshot> for DbSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        DbSnapshot {
            id: snapshot.id.clone(),
            page_id: snapshot.page_id.clone(),
            site_id: snapshot.site_id.clone(),
            parent_id: snapshot.parent_id.clone(),
            route_name: snapshot.route_name.clone(),
            url: snapshot.url.clone(),
            page_alias: snapshot.page_alias.clone(),
            name: snapshot.name.clone(),
            enabled: snapshot.enabled,
            content: snapshot.content.to_string(),
            publication_date_start: snapshot.publication_date_start,
            publication_date_end: snapshot.publication_date_end,
            created_at: snapshot.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JsonSnapshot {
    pub id: String,
    pub page_id: String,
    pub site_id: String,
    pub parent_id: Option<String>,
    pub route_name: String,
    pub url: Option<String>,
    pub page_alias: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub content: Value,
    pub publication_date_start: Option<String>,
    pub publication_date_end: Option<String>,
    pub created_at: String,
}

impl From<&Snapshot> for JsonSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let format = |dt: NaiveDateTime| dt.format(DATETIME_FORMAT).to_string();

        JsonSnapshot {
            id: snapshot.id.clone(),
            page_id: snapshot.page_id.clone(),
            site_id: snapshot.site_id.clone(),
            parent_id: snapshot.parent_id.clone(),
            route_name: snapshot.route_name.clone(),
            url: snapshot.url.clone(),
            page_alias: snapshot.page_alias.clone(),
            name: snapshot.name.clone(),
            enabled: snapshot.enabled,
            content: snapshot.content.clone(),
            publication_date_start: snapshot.publication_date_start.map(format),
            publication_date_end: snapshot.publication_date_end.map(format),
            created_at: format(snapshot.created_at),
        }
    }
}

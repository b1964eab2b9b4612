use crate::domain::{LoadStatus, Page};
use chrono::NaiveDateTime;
use derive_more::derive::Display;

#[derive(sqlx::FromRow, Debug, Eq, PartialEq, Clone, Display)]
#[display("{}", id)]
pub struct DbPage {
    pub id: String,
    pub site_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub route_name: String,
    pub page_alias: Option<String>,
    pub enabled: bool,
    pub edited: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DbPage> for Page {
    fn from(db_page: DbPage) -> Self {
        Page {
            id: db_page.id,
            site_id: db_page.site_id,
            parent_id: db_page.parent_id,
            name: db_page.name,
            slug: db_page.slug,
            url: db_page.url,
            route_name: db_page.route_name,
            page_alias: db_page.page_alias,
            enabled: db_page.enabled,
            edited: db_page.edited,
            position: db_page.position,
            created_at: db_page.created_at,
            updated_at: db_page.updated_at,
            children: Vec::new(),
            load_status: LoadStatus::Unloaded,
        }
    }
}

impl From<&Page> for DbPage {
    fn from(page: &Page) -> Self {
        DbPage {
            id: page.id.clone(),
            site_id: page.site_id.clone(),
            parent_id: page.parent_id.clone(),
            name: page.name.clone(),
            slug: page.slug.clone(),
            url: page.url.clone(),
            route_name: page.route_name.clone(),
            page_alias: page.page_alias.clone(),
            enabled: page.enabled,
            edited: page.edited,
            position: page.position,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

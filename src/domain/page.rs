use crate::domain::tree::{LoadStatus, TreeNode};
use crate::error::{PageTreeError, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Route of pages whose url is managed by the page tree.
pub const PAGE_ROUTE_CMS_NAME: &str = "page_slug";

/// Route prefix of pages that are only reachable internally (error pages,
/// global containers) and never get a url.
pub const PAGE_ROUTE_INTERNAL_PREFIX: &str = "_page_internal_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub site_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub route_name: String,
    pub page_alias: Option<String>,
    pub enabled: bool,
    /// Changed since it was last published.
    pub edited: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    // not persisted, filled by a tree load
    pub children: Vec<String>,
    pub load_status: LoadStatus,
}

impl Page {
    pub fn is_internal(&self) -> bool {
        self.route_name.starts_with(PAGE_ROUTE_INTERNAL_PREFIX)
    }

    /// Hybrid pages are served by an application route; their url is owned by
    /// that route.
    pub fn is_hybrid(&self) -> bool {
        self.route_name != PAGE_ROUTE_CMS_NAME && !self.is_internal()
    }

    /// Builds a page from caller values already merged over the configured
    /// defaults.
    pub fn from_values(values: PageValues, id: String, now: NaiveDateTime) -> Result<Self> {
        let site_id = values
            .site_id
            .ok_or_else(|| PageTreeError::InvalidArgument("a page needs a siteId".into()))?;

        Ok(Self {
            id,
            site_id,
            parent_id: values.parent_id,
            name: values.name.unwrap_or_default(),
            slug: values.slug,
            url: values.url,
            route_name: values
                .route_name
                .unwrap_or_else(|| PAGE_ROUTE_CMS_NAME.to_string()),
            page_alias: values.page_alias,
            enabled: values.enabled.unwrap_or(true),
            edited: false,
            position: values.position.unwrap_or(1),
            created_at: now,
            updated_at: now,
            children: Vec::new(),
            load_status: LoadStatus::Unloaded,
        })
    }
}

impl TreeNode for Page {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn children(&self) -> &[String] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<String> {
        &mut self.children
    }

    fn set_load_status(&mut self, status: LoadStatus) {
        self.load_status = status;
    }
}

/// Attribute values accepted when creating a page. Keys are camelCase, the way
/// they appear in configured defaults and API payloads.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageValues {
    pub site_id: Option<String>,
    pub parent_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub route_name: Option<String>,
    pub page_alias: Option<String>,
    pub enabled: Option<bool>,
    pub position: Option<i64>,
}

use crate::error::{PageTreeError, Result};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashMap;

/// A published copy of a page. Its publication window is
/// `[publication_date_start, publication_date_end)`; an open end means the
/// snapshot is still the live one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub page_id: String,
    pub site_id: String,
    /// Parent of the page at the time it was snapshotted.
    pub parent_id: Option<String>,
    pub route_name: String,
    pub url: Option<String>,
    pub page_alias: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub content: Value,
    pub publication_date_start: Option<NaiveDateTime>,
    pub publication_date_end: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// The single field an active-snapshot lookup filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLookup {
    PageId(String),
    Url(String),
    RouteName(String),
    PageAlias(String),
    Name(String),
}

impl SnapshotLookup {
    pub const KEYS: [&'static str; 5] = ["pageId", "url", "routeName", "pageAlias", "name"];

    /// Column holding the looked-up value.
    pub fn column(&self) -> &'static str {
        match self {
            SnapshotLookup::PageId(_) => "page_id",
            SnapshotLookup::Url(_) => "url",
            SnapshotLookup::RouteName(_) => "route_name",
            SnapshotLookup::PageAlias(_) => "page_alias",
            SnapshotLookup::Name(_) => "name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SnapshotLookup::PageId(v)
            | SnapshotLookup::Url(v)
            | SnapshotLookup::RouteName(v)
            | SnapshotLookup::PageAlias(v)
            | SnapshotLookup::Name(v) => v,
        }
    }
}

/// Filter for resolving the active snapshot: one lookup field, optionally
/// narrowed to a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotCriteria {
    pub lookup: SnapshotLookup,
    pub site_id: Option<String>,
}

impl SnapshotCriteria {
    pub fn new(lookup: SnapshotLookup) -> Self {
        Self {
            lookup,
            site_id: None,
        }
    }

    pub fn with_site(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    /// Parses loosely typed criteria such as HTTP query parameters. Exactly one
    /// of the lookup keys must be present; `site` is an optional extra filter
    /// and anything else is rejected.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let mut lookup = None;
        let mut site_id = None;

        for (key, value) in params {
            let candidate = match key.as_str() {
                "site" => {
                    site_id = Some(value.clone());
                    continue;
                }
                "pageId" => SnapshotLookup::PageId(value.clone()),
                "url" => SnapshotLookup::Url(value.clone()),
                "routeName" => SnapshotLookup::RouteName(value.clone()),
                "pageAlias" => SnapshotLookup::PageAlias(value.clone()),
                "name" => SnapshotLookup::Name(value.clone()),
                other => {
                    return Err(PageTreeError::InvalidCriteria(format!(
                        "unknown criteria key `{other}`"
                    )));
                }
            };

            if lookup.replace(candidate).is_some() {
                return Err(PageTreeError::InvalidCriteria(format!(
                    "provide exactly one of {}",
                    Self::key_list()
                )));
            }
        }

        let lookup = lookup.ok_or_else(|| {
            PageTreeError::InvalidCriteria(format!("provide one of {}", Self::key_list()))
        })?;

        Ok(Self { lookup, site_id })
    }

    fn key_list() -> String {
        SnapshotLookup::KEYS
            .iter()
            .map(|k| format!("`{k}`"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

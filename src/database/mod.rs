use crate::domain::block::PositionUpdate;
use crate::domain::snapshot::SnapshotCriteria;
use crate::domain::{Block, Page, Snapshot};
use crate::error::{PageTreeError, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;

pub mod sqlite;

// repositories are shared between request handlers, sqlx::Pool is thread safe.
// every method that writes more than one row runs in a single transaction.
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn get_page(&self, id: &str) -> Result<Option<Page>>;
    async fn get_pages_by_site(&self, site_id: &str) -> Result<Vec<Page>>;
    async fn get_page_by_url(&self, site_id: &str, url: &str) -> Result<Option<Page>>;
    async fn get_hybrid_pages(&self, site_id: &str) -> Result<Vec<Page>>;
    /// One window of pages plus the number of pages matching the criteria.
    async fn list_pages(&self, query: &PageQuery) -> Result<(Vec<Page>, i64)>;

    async fn save_page(&self, page: &Page) -> Result<()>;
    async fn save_pages(&self, pages: &[Page]) -> Result<()>;
}

#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn get_block(&self, id: &str) -> Result<Option<Block>>;
    async fn get_blocks_by_page(&self, page_id: &str) -> Result<Vec<Block>>;
    async fn get_all_blocks(&self) -> Result<Vec<Block>>;
    async fn list_blocks(&self, query: &BlockQuery) -> Result<(Vec<Block>, i64)>;

    async fn save_block(&self, block: &Block) -> Result<()>;
    async fn save_blocks(&self, blocks: &[Block]) -> Result<()>;
    /// Applies each update whose parent belongs to the update's page and
    /// returns how many were applied.
    async fn update_positions(&self, updates: &[PositionUpdate]) -> Result<u64>;
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    async fn get_snapshot(&self, id: &str) -> Result<Option<Snapshot>>;
    /// A page's history, most recently created first.
    async fn get_snapshots_by_page(&self, page_id: &str) -> Result<Vec<Snapshot>>;
    async fn list_snapshots(&self, query: &SnapshotQuery) -> Result<(Vec<Snapshot>, i64)>;
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()>;

    /// Writes `snapshots` as given, then closes at `as_of` every other
    /// still-open snapshot of the same pages. Returns the number closed.
    async fn activate_snapshots(&self, snapshots: &[Snapshot], as_of: NaiveDateTime) -> Result<u64>;
    /// Most recently created snapshot matching `criteria` whose publication
    /// window covers `as_of`.
    async fn find_active_snapshot(
        &self,
        criteria: &SnapshotCriteria,
        as_of: NaiveDateTime,
    ) -> Result<Option<Snapshot>>;
    /// Deletes a page's snapshots outside the `keep` newest by publication
    /// end (open ones count as newest). Returns the number deleted.
    async fn delete_snapshots_beyond(&self, page_id: &str, keep: i64) -> Result<u64>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCriteria {
    pub enabled: Option<bool>,
    /// Pages changed since they were last published.
    pub edited: Option<bool>,
    pub site_id: Option<String>,
    pub parent_id: Option<String>,
    /// `Some(true)` keeps top-level pages only, `Some(false)` only pages with a parent.
    pub root: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockCriteria {
    pub enabled: Option<bool>,
    pub block_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotListCriteria {
    pub enabled: Option<bool>,
    pub site_id: Option<String>,
    pub page_id: Option<String>,
    /// Parent of the snapshotted page.
    pub parent_id: Option<String>,
    /// `Some(true)` keeps snapshots of top-level pages only.
    pub root: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Page columns a listing may be sorted on.
pub const PAGE_SORT_FIELDS: [&str; 10] = [
    "name",
    "slug",
    "url",
    "route_name",
    "page_alias",
    "enabled",
    "edited",
    "position",
    "created_at",
    "updated_at",
];

pub const BLOCK_SORT_FIELDS: [&str; 6] = [
    "name",
    "block_type",
    "position",
    "enabled",
    "created_at",
    "updated_at",
];

pub const SNAPSHOT_SORT_FIELDS: [&str; 7] = [
    "name",
    "url",
    "route_name",
    "enabled",
    "publication_date_start",
    "publication_date_end",
    "created_at",
];

/// A validated listing request. Sort fields always come from the entity's
/// allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<C> {
    pub criteria: C,
    pub sort: Vec<(&'static str, SortDirection)>,
    pub offset: i64,
    pub limit: i64,
}

pub type PageQuery = ListQuery<PageCriteria>;
pub type BlockQuery = ListQuery<BlockCriteria>;
pub type SnapshotQuery = ListQuery<SnapshotListCriteria>;

impl<C> ListQuery<C> {
    /// Checks paging and sort input against `allowed`. `default_sort` applies
    /// when `sort` is empty.
    pub fn new(
        criteria: C,
        page: u32,
        limit: u32,
        sort: &[(String, SortDirection)],
        allowed: &[&'static str],
        default_sort: (&'static str, SortDirection),
    ) -> Result<Self> {
        if page == 0 || limit == 0 {
            return Err(PageTreeError::InvalidArgument(
                "page and limit start at 1".into(),
            ));
        }

        let mut validated = Vec::with_capacity(sort.len());
        for (field, direction) in sort {
            let column = allowed
                .iter()
                .find(|known| **known == field.as_str())
                .ok_or_else(|| PageTreeError::InvalidArgument(format!("invalid sort field `{field}`")))?;
            validated.push((*column, *direction));
        }
        if validated.is_empty() {
            validated.push(default_sort);
        }

        Ok(Self {
            criteria,
            sort: validated,
            offset: i64::from(page - 1) * i64::from(limit),
            limit: i64::from(limit),
        })
    }
}

/// One window of a listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub total: i64,
}

impl<T> Pager<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let size = i64::from(per_page.max(1));
        let last_page = ((total + size - 1) / size).max(1);

        Self {
            items,
            page,
            per_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Pager<U> {
        Pager {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            last_page: self.last_page,
            total: self.total,
        }
    }
}

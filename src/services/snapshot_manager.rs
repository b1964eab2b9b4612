use crate::database::{
    Pager, SnapshotListCriteria, SnapshotQuery, SnapshotRepository, SortDirection,
    SNAPSHOT_SORT_FIELDS,
};
use crate::domain::document::{block_tree_to_json, JsonPage};
use crate::domain::snapshot::SnapshotCriteria;
use crate::domain::{new_id, Block, Page, Snapshot, Tree};
use crate::error::{PageTreeError, Result};
use crate::services::block_interactor::BlockInteractor;
use crate::services::tree_loader::TreeSession;
use chrono::{NaiveDateTime, Utc};
use serde_json::json;

pub struct SnapshotManager {
    repo: Box<dyn SnapshotRepository>,
    // snapshots kept per page after a publish
    retention: i64,
}

impl SnapshotManager {
    pub fn new(repo: Box<dyn SnapshotRepository>, retention: i64) -> Self {
        Self { repo, retention }
    }

    pub fn retention(&self) -> i64 {
        self.retention
    }

    /// Freezes `page` and its block tree into a new, unpublished snapshot.
    pub fn create(&self, page: &Page, blocks: &Tree<Block>) -> Snapshot {
        Snapshot {
            id: new_id(),
            page_id: page.id.clone(),
            site_id: page.site_id.clone(),
            parent_id: page.parent_id.clone(),
            route_name: page.route_name.clone(),
            url: page.url.clone(),
            page_alias: page.page_alias.clone(),
            name: page.name.clone(),
            enabled: page.enabled,
            content: json!({
                "page": JsonPage::from(page),
                "blocks": block_tree_to_json(blocks),
            }),
            publication_date_start: None,
            publication_date_end: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.repo.save_snapshot(snapshot).await
    }

    pub async fn get_snapshots_by_page(&self, page_id: &str) -> Result<Vec<Snapshot>> {
        self.repo.get_snapshots_by_page(page_id).await
    }

    /// One page of the snapshots matching `criteria`, newest first unless
    /// `sort` says otherwise.
    pub async fn get_pager(
        &self,
        criteria: SnapshotListCriteria,
        page: u32,
        limit: u32,
        sort: &[(String, SortDirection)],
    ) -> Result<Pager<Snapshot>> {
        let query = SnapshotQuery::new(
            criteria,
            page,
            limit,
            sort,
            &SNAPSHOT_SORT_FIELDS,
            ("created_at", SortDirection::Desc),
        )?;

        let (items, total) = self.repo.list_snapshots(&query).await?;
        Ok(Pager::new(items, page, limit, total))
    }

    /// Makes `snapshots` the live snapshots of their pages from `as_of` (now
    /// when omitted) and closes every other open snapshot of those pages at
    /// the same instant, atomically.
    pub async fn enable_snapshots(
        &self,
        mut snapshots: Vec<Snapshot>,
        as_of: Option<NaiveDateTime>,
    ) -> Result<Vec<Snapshot>> {
        if snapshots.is_empty() {
            return Ok(snapshots);
        }

        let as_of = as_of.unwrap_or_else(|| Utc::now().naive_utc());
        for snapshot in &mut snapshots {
            snapshot.publication_date_start = Some(as_of);
            snapshot.publication_date_end = None;
        }

        let closed = self.repo.activate_snapshots(&snapshots, as_of).await?;
        tracing::info!(activated = snapshots.len(), closed, %as_of, "snapshots enabled");

        Ok(snapshots)
    }

    /// The snapshot currently serving the page that `criteria` points at.
    pub async fn find_enable_snapshot(
        &self,
        criteria: &SnapshotCriteria,
        as_of: Option<NaiveDateTime>,
    ) -> Result<Snapshot> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().naive_utc());

        self.repo
            .find_active_snapshot(criteria, as_of)
            .await?
            .ok_or_else(|| {
                PageTreeError::not_found(
                    "active snapshot",
                    format!("{}={}", criteria.lookup.column(), criteria.lookup.value()),
                )
            })
    }

    /// Keeps the `keep` newest snapshots of a page (open ones first, then by
    /// publication end) and deletes the rest. Returns how many were deleted.
    pub async fn cleanup(&self, page_id: &str, keep: i64) -> Result<u64> {
        if keep < 0 {
            return Err(PageTreeError::InvalidArgument(format!(
                "keep must be a non-negative integer, {keep} given"
            )));
        }

        let deleted = self.repo.delete_snapshots_beyond(page_id, keep).await?;
        tracing::info!(page_id, keep, deleted, "snapshots cleaned up");

        Ok(deleted)
    }

    /// Snapshots `page` with its current blocks, puts the snapshot live and
    /// trims the page's history down to the configured retention.
    pub async fn publish_page(&self, page: &Page, blocks: &BlockInteractor) -> Result<Snapshot> {
        let session = TreeSession::new();
        let block_tree = blocks.load_page_blocks(&session, &page.id).await?;

        let snapshot = self.create(page, &block_tree);
        let mut enabled = self.enable_snapshots(vec![snapshot], None).await?;
        self.cleanup(&page.id, self.retention).await?;

        enabled
            .pop()
            .ok_or_else(|| PageTreeError::not_found("snapshot", page.id.clone()))
    }
}

/// Parses a retention count coming from outside, e.g. a query string.
pub fn parse_keep(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|keep| *keep >= 0)
        .ok_or_else(|| {
            PageTreeError::InvalidArgument(format!(
                "keep must be a non-negative integer, `{raw}` given"
            ))
        })
}

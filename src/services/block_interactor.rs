use crate::database::{BlockCriteria, BlockQuery, BlockRepository, Pager, SortDirection, BLOCK_SORT_FIELDS};
use crate::domain::block::{BlockPosition, CONTAINER_TYPE};
use crate::domain::tree::LoadStatus;
use crate::domain::{new_id, Block, Tree};
use crate::error::{PageTreeError, Result};
use crate::services::tree_loader::{load_tree, TreeKind, TreeSession};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_CONTAINER_CODE: &str = "no code defined";
pub const DEFAULT_CONTAINER_NAME: &str = "No name defined";

/// Values for a new container block. Every field is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContainerValues {
    pub code: Option<String>,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub position: Option<i64>,
    pub page_id: Option<String>,
    pub parent_id: Option<String>,
}

pub struct BlockInteractor {
    repo: Box<dyn BlockRepository>,
}

impl BlockInteractor {
    pub fn new(repo: Box<dyn BlockRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_block(&self, id: &str) -> Result<Option<Block>> {
        self.repo.get_block(id).await
    }

    pub async fn get_blocks_by_page(&self, page_id: &str) -> Result<Vec<Block>> {
        self.repo.get_blocks_by_page(page_id).await
    }

    /// One page of the blocks matching `criteria`, by position unless `sort`
    /// says otherwise.
    pub async fn get_pager(
        &self,
        criteria: BlockCriteria,
        page: u32,
        limit: u32,
        sort: &[(String, SortDirection)],
    ) -> Result<Pager<Block>> {
        let query = BlockQuery::new(
            criteria,
            page,
            limit,
            sort,
            &BLOCK_SORT_FIELDS,
            ("position", SortDirection::Asc),
        )?;

        let (items, total) = self.repo.list_blocks(&query).await?;
        Ok(Pager::new(items, page, limit, total))
    }

    /// Loads the block tree of a page, once per session. The tree's roots are
    /// the page's top-level blocks.
    pub async fn load_page_blocks(&self, session: &TreeSession, page_id: &str) -> Result<Tree<Block>> {
        load_tree(session, TreeKind::PageBlocks, page_id, || {
            self.repo.get_blocks_by_page(page_id)
        })
        .await
    }

    /// Moves blocks in one transaction. Entries missing an id, position,
    /// parent or page are skipped, as are entries whose parent is on another
    /// page. Returns the number of blocks moved.
    pub async fn save_blocks_position(&self, items: &[BlockPosition]) -> Result<u64> {
        let updates: Vec<_> = items.iter().filter_map(BlockPosition::validated).collect();

        let skipped = items.len() - updates.len();
        if skipped > 0 {
            tracing::warn!(skipped, "skipping incomplete block position entries");
        }

        let applied = self.repo.update_positions(&updates).await?;
        tracing::info!(applied, requested = items.len(), "block positions saved");

        Ok(applied)
    }

    pub async fn create_new_container(&self, values: ContainerValues) -> Result<Block> {
        self.create_new_container_with(values, |_| {}).await
    }

    /// Builds a container block from `values`, lets `alter` adjust it, then
    /// saves it.
    pub async fn create_new_container_with<F>(&self, values: ContainerValues, alter: F) -> Result<Block>
    where
        F: FnOnce(&mut Block) + Send,
    {
        let mut page_id = values.page_id;

        if let Some(parent_id) = values.parent_id.as_deref() {
            let parent = self
                .repo
                .get_block(parent_id)
                .await?
                .ok_or_else(|| PageTreeError::not_found("block", parent_id))?;

            if let Some(parent_page) = parent.page_id {
                if let Some(page) = page_id.as_deref().filter(|page| *page != parent_page) {
                    return Err(PageTreeError::InvalidArgument(format!(
                        "parent block {parent_id} belongs to page {parent_page}, not {page}"
                    )));
                }
                page_id.get_or_insert(parent_page);
            }
        }

        let now = Utc::now().naive_utc();
        let name = values
            .name
            .or_else(|| values.code.clone())
            .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());

        let mut settings = Map::new();
        settings.insert(
            "code".to_string(),
            Value::String(values.code.unwrap_or_else(|| DEFAULT_CONTAINER_CODE.to_string())),
        );

        let mut container = Block {
            id: new_id(),
            page_id,
            parent_id: values.parent_id,
            block_type: CONTAINER_TYPE.to_string(),
            name,
            settings,
            position: values.position.unwrap_or(1),
            enabled: values.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
            children: Vec::new(),
            load_status: LoadStatus::Unloaded,
        };

        alter(&mut container);

        self.repo.save_block(&container).await?;
        tracing::info!(block_id = %container.id, name = %container.name, "container created");

        Ok(container)
    }
}

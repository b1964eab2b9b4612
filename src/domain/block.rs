use crate::domain::tree::{LoadStatus, TreeNode};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};

/// Block type of containers, the blocks that group child blocks.
pub const CONTAINER_TYPE: &str = "container";

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub page_id: Option<String>,
    pub parent_id: Option<String>,
    pub block_type: String,
    pub name: String,
    pub settings: Map<String, Value>,
    pub position: i64,
    pub enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub children: Vec<String>,
    pub load_status: LoadStatus,
}

impl Block {
    pub fn is_container(&self) -> bool {
        self.block_type == CONTAINER_TYPE
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

impl TreeNode for Block {
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

/// One entry of a batched reposition request. Every field is optional on the
/// wire; incomplete entries are skipped.
#[derive(serde::Deserialize, Debug, Default, Clone)]
pub struct BlockPosition {
    pub id: Option<String>,
    pub position: Option<i64>,
    #[serde(alias = "parentId")]
    pub parent_id: Option<String>,
    #[serde(alias = "pageId")]
    pub page_id: Option<String>,
}

/// A reposition entry with every field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: String,
    pub position: i64,
    pub parent_id: String,
    pub page_id: String,
}

impl BlockPosition {
    /// Reads a batch of loosely typed entries. An entry that isn't an object
    /// or has a field of the wrong type is dropped; the rest are kept in
    /// order.
    pub fn from_entries(entries: Vec<Value>) -> Vec<BlockPosition> {
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(position) => Some(position),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed block position entry");
                    None
                }
            })
            .collect()
    }

    pub fn validated(&self) -> Option<PositionUpdate> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        Some(PositionUpdate {
            id: non_empty(&self.id)?,
            position: self.position?,
            parent_id: non_empty(&self.parent_id)?,
            page_id: non_empty(&self.page_id)?,
        })
    }
}

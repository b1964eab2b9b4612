use crate::domain::{Block, LoadStatus};
use crate::error::PageTreeError;
use chrono::NaiveDateTime;
use derive_more::derive::Display;
use serde_json::{Map, Value};

#[derive(sqlx::FromRow, Debug, Eq, PartialEq, Clone, Display)]
#[display("{} ({})", id, block_type)]
pub struct DbBlock {
    pub id: String,
    pub page_id: Option<String>,
    pub parent_id: Option<String>,
    pub block_type: String,
    pub name: String,
    // JSON object
    pub settings: String,
    pub position: i64,
    pub enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<DbBlock> for Block {
    type Error = PageTreeError;

    fn try_from(db_block: DbBlock) -> Result<Self, Self::Error> {
        let settings: Map<String, Value> = serde_json::from_str(&db_block.settings)?;

        Ok(Block {
            id: db_block.id,
            page_id: db_block.page_id,
            parent_id: db_block.parent_id,
            block_type: db_block.block_type,
            name: db_block.name,
            settings,
            position: db_block.position,
            enabled: db_block.enabled,
            created_at: db_block.created_at,
            updated_at: db_block.updated_at,
            children: Vec::new(),
            load_status: LoadStatus::Unloaded,
        })
    }
}

impl From<&Block> for DbBlock {
    fn from(block: &Block) -> Self {
        DbBlock {
            id: block.id.clone(),
            page_id: block.page_id.clone(),
            parent_id: block.parent_id.clone(),
            block_type: block.block_type.clone(),
            name: block.name.clone(),
            settings: Value::Object(block.settings.clone()).to_string(),
            position: block.position,
            enabled: block.enabled,
            created_at: block.created_at,
            updated_at: block.updated_at,
        }
    }
}

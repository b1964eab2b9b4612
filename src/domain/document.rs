// JSON documents of pages and blocks, served by the API and frozen into
// snapshot content

use crate::domain::{Block, Page, Tree};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JsonPage {
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
    pub is_internal: bool,
    pub is_hybrid: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonPage>,
}

impl From<&Page> for JsonPage {
    fn from(page: &Page) -> Self {
        JsonPage {
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
            is_internal: page.is_internal(),
            is_hybrid: page.is_hybrid(),
            created_at: page.created_at.format(DATETIME_FORMAT).to_string(),
            updated_at: page.updated_at.format(DATETIME_FORMAT).to_string(),
            children: Vec::new(),
        }
    }
}

/// Nests a loaded page tree, starting from its top-level pages.
pub fn page_tree_to_json(tree: &Tree<Page>) -> Vec<JsonPage> {
    tree.roots().map(|root| nest_page(tree, root)).collect()
}

fn nest_page(tree: &Tree<Page>, page: &Page) -> JsonPage {
    let mut json_page = JsonPage::from(page);
    json_page.children = tree
        .children_of(&page.id)
        .map(|child| nest_page(tree, child))
        .collect();
    json_page
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JsonBlock {
    pub id: String,
    pub page_id: Option<String>,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub block_type: String,
    pub name: String,
    pub settings: Map<String, Value>,
    pub position: i64,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonBlock>,
}

impl From<&Block> for JsonBlock {
    fn from(block: &Block) -> Self {
        JsonBlock {
            id: block.id.clone(),
            page_id: block.page_id.clone(),
            parent_id: block.parent_id.clone(),
            block_type: block.block_type.clone(),
            name: block.name.clone(),
            settings: block.settings.clone(),
            position: block.position,
            enabled: block.enabled,
            created_at: block.created_at.format(DATETIME_FORMAT).to_string(),
            updated_at: block.updated_at.format(DATETIME_FORMAT).to_string(),
            children: Vec::new(),
        }
    }
}

/// Nests a loaded block tree under the page's top-level blocks.
pub fn block_tree_to_json(tree: &Tree<Block>) -> Vec<JsonBlock> {
    tree.roots().map(|root| nest_block(tree, root)).collect()
}

fn nest_block(tree: &Tree<Block>, block: &Block) -> JsonBlock {
    let mut json_block = JsonBlock::from(block);
    json_block.children = tree
        .children_of(&block.id)
        .map(|child| nest_block(tree, child))
        .collect();
    json_block
}

pub mod block;
pub mod document;
pub mod page;
pub mod slug;
pub mod snapshot;
pub mod tree;

pub use block::Block;
pub use page::Page;
pub use snapshot::Snapshot;
pub use tree::{LoadStatus, Tree, TreeNode};

/// Fresh opaque identifier for a new page, block or snapshot.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub mod block_interactor;
pub mod block_migration;
pub mod page_manager;
pub mod snapshot_manager;
pub mod tree_loader;
pub mod url_fixer;

pub use block_interactor::BlockInteractor;
pub use page_manager::PageManager;
pub use snapshot_manager::SnapshotManager;
pub use tree_loader::TreeSession;

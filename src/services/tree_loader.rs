use crate::domain::{Tree, TreeNode};
use crate::error::Result;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

/// Which kind of tree a root id was loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Pages of a site.
    SitePages,
    /// Blocks of a page.
    PageBlocks,
}

/// Remembers which roots have been loaded for a caller. A root is loaded at
/// most once per session; later loads of it come back empty.
///
/// Handlers create one per request. The claim is an atomic check-and-set so
/// concurrent loads of the same root can't both run.
#[derive(Debug, Default)]
pub struct TreeSession {
    loaded: Mutex<HashSet<(TreeKind, String)>>,
}

impl TreeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, kind: TreeKind, root_id: &str) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(kind, root_id.to_string()))
    }

    fn claim(&self, kind: TreeKind, root_id: &str) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((kind, root_id.to_string()))
    }

    fn release(&self, kind: TreeKind, root_id: &str) {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(kind, root_id.to_string()));
    }
}

/// Fetches every record owned by `root_id` and assembles them into a tree,
/// unless this session already loaded that root.
///
/// A failed fetch gives the claim back so the load can be retried.
pub async fn load_tree<T, F, Fut>(
    session: &TreeSession,
    kind: TreeKind,
    root_id: &str,
    fetch: F,
) -> Result<Tree<T>>
where
    T: TreeNode,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if !session.claim(kind, root_id) {
        tracing::debug!(?kind, root_id, "tree already loaded in this session");
        return Ok(Tree::empty());
    }

    match fetch().await {
        Ok(records) => {
            let tree = Tree::assemble(records);
            tracing::debug!(?kind, root_id, records = tree.len(), "tree loaded");
            Ok(tree)
        }
        Err(e) => {
            session.release(kind, root_id);
            Err(e)
        }
    }
}

use std::collections::{HashMap, HashSet};

/// How much of an entity's subtree is present in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Fetched on its own; its `children` list says nothing about the store.
    #[default]
    Unloaded,
    /// A tree load is attaching children to it right now.
    Loading,
    /// Every child that exists in the store is attached.
    Materialized,
}

/// Records that can be assembled into a parent/children tree.
///
/// Children are held as ids, never as owned values, so a tree can't form a
/// reference cycle and a node can be looked up or mutated on its own.
pub trait TreeNode {
    fn id(&self) -> &str;
    fn parent_id(&self) -> Option<&str>;
    fn children(&self) -> &[String];
    fn children_mut(&mut self) -> &mut Vec<String>;
    fn set_load_status(&mut self, status: LoadStatus);
}

/// A flat index of records plus the parent -> children links between them.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    // ids in the order the store returned them
    order: Vec<String>,
    nodes: HashMap<String, T>,
    roots: Vec<String>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl<T: TreeNode> Tree<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes `records` by id and attaches each one to its parent's children,
    /// in fetch order.
    ///
    /// A record without a parent becomes a root. A record whose parent is not
    /// part of `records` stays in the index but is attached nowhere. A
    /// repeated id keeps its first occurrence.
    pub fn assemble(records: Vec<T>) -> Self {
        let mut tree = Self::default();

        for mut record in records {
            if tree.nodes.contains_key(record.id()) {
                continue;
            }
            record.children_mut().clear();
            record.set_load_status(LoadStatus::Loading);
            let id = record.id().to_string();
            tree.order.push(id.clone());
            tree.nodes.insert(id, record);
        }

        for id in &tree.order {
            let parent_id = match tree.nodes.get(id).and_then(|n| n.parent_id()) {
                Some(parent_id) => parent_id.to_string(),
                None => {
                    tree.roots.push(id.clone());
                    continue;
                }
            };

            match tree.nodes.get_mut(&parent_id) {
                Some(parent) => parent.children_mut().push(id.clone()),
                None => {
                    tracing::warn!(id = %id, parent_id = %parent_id, "parent not in loaded set, leaving record unattached");
                }
            }
        }

        for node in tree.nodes.values_mut() {
            node.set_load_status(LoadStatus::Materialized);
        }

        tree
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.nodes.get_mut(id)
    }

    /// Records without a parent reference, in fetch order.
    pub fn roots(&self) -> impl Iterator<Item = &T> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &T> {
        self.nodes
            .get(id)
            .map(|n| n.children())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.nodes.get(child))
    }

    /// All records in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// `id` followed by every record below it, parents before children.
    /// Each record appears once even if the stored parent links form a loop.
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id.to_string()];

        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if !seen.insert(current.clone()) {
                continue;
            }
            stack.extend(node.children().iter().rev().cloned());
            ids.push(current);
        }

        ids
    }
}

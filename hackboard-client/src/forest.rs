use std::collections::{hash_map, HashMap, HashSet};

use crate::{
    api::{CommentId, CommentRecord},
    Comment, CommentNode, NodeIdx,
};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("Comment id {0:?} appears more than once")]
    DuplicateId(CommentId),

    #[error("Parent {parent:?} of comment {id:?} is not in the forest")]
    UnknownParent { id: CommentId, parent: CommentId },
}

/// All the comments of one thread, as an arena of nodes linked by index
///
/// Only comments reachable from a root are stored. A forest is built once from a fetch and
/// replaced wholesale by the next one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Forest {
    pub(crate) nodes: Vec<Comment>,
    roots: Vec<NodeIdx>,
    by_id: HashMap<CommentId, NodeIdx>,

    /// Records that could not be attached under a root, in input order
    dropped: Vec<CommentId>,

    /// Repeated ids that were ignored, in input order
    duplicates: Vec<CommentId>,
}

/// Builds a forest out of flat records, in any order
///
/// Replies may come before their parent. Records whose parent is missing are dropped
/// along with their own replies. For a repeated id, only the first record is kept.
pub fn build_forest(records: impl IntoIterator<Item = CommentRecord>) -> Forest {
    let mut forest = Forest::default();

    // Collect the records, keyed by id
    let mut records_by_id = HashMap::new();
    let mut records_in_order = Vec::new();
    for r in records {
        match records_by_id.entry(r.id) {
            hash_map::Entry::Occupied(_) => {
                tracing::warn!(id = ?r.id, "duplicate comment id, keeping the first one");
                forest.duplicates.push(r.id);
            }
            hash_map::Entry::Vacant(e) => {
                e.insert(records_in_order.len());
                records_in_order.push(Some(r));
            }
        }
    }

    // Link each record to its parent
    let mut roots = Vec::new();
    let mut children = vec![Vec::new(); records_in_order.len()];
    for (i, r) in records_in_order.iter().flatten().enumerate() {
        match r.parent_id {
            None => roots.push(i),
            Some(parent) => match records_by_id.get(&parent) {
                Some(&p) => children[p].push(i),
                None => tracing::debug!(id = ?r.id, ?parent, "dropping reply to unknown comment"),
            },
        }
    }

    // Move everything reachable from a root into the arena
    let mut todo = roots.into_iter().rev().map(|i| (i, None)).collect::<Vec<_>>();
    while let Some((i, parent)) = todo.pop() {
        let record = match records_in_order[i].take() {
            Some(r) => r,
            None => continue,
        };
        let idx = forest.push(record);
        match parent {
            None => forest.roots.push(idx),
            Some(parent) => forest.add_reply(parent, idx),
        }
        todo.extend(children[i].iter().rev().map(|&c| (c, Some(idx))));
    }

    // Whatever was not moved is not reachable
    forest.dropped = records_in_order
        .into_iter()
        .flatten()
        .map(|r| r.id)
        .collect();
    if !forest.dropped.is_empty() {
        tracing::debug!(
            num_dropped = forest.dropped.len(),
            "some comments are not reachable from a top-level comment"
        );
    }

    forest
}

/// Same as `build_forest`, but refuses input with repeated ids
pub fn try_build_forest(records: Vec<CommentRecord>) -> Result<Forest, BuildError> {
    let mut seen = HashSet::with_capacity(records.len());
    if let Some(r) = records.iter().find(|r| !seen.insert(r.id)) {
        return Err(BuildError::DuplicateId(r.id));
    }
    Ok(build_forest(records))
}

impl Forest {
    fn push(&mut self, record: CommentRecord) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len());
        self.by_id.insert(record.id, idx);
        self.nodes.push(Comment::new(record));
        idx
    }

    fn node(&self, idx: NodeIdx) -> CommentNode<'_> {
        CommentNode { forest: self, idx }
    }

    /// Appends `child` to the replies of `parent`, and records `parent` as its parent
    ///
    /// `child` must be a freshly pushed node whose record names `parent`. Outside of this
    /// crate, `graft` is the way to extend a forest.
    pub(crate) fn add_reply(&mut self, parent: NodeIdx, child: NodeIdx) {
        debug_assert!(parent != child && self.nodes[child.0].parent.is_none());
        debug_assert_eq!(
            self.nodes[child.0].record.parent_id,
            Some(self.nodes[parent.0].record.id)
        );
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Adds one record to an already-built forest
    ///
    /// The record becomes the last root, or the last reply of its parent. The update loop
    /// never does this and always rebuilds from a fresh fetch instead.
    pub fn graft(&mut self, record: CommentRecord) -> Result<NodeIdx, BuildError> {
        if self.by_id.contains_key(&record.id) {
            return Err(BuildError::DuplicateId(record.id));
        }
        let parent = match record.parent_id {
            None => None,
            Some(parent) => match self.by_id.get(&parent) {
                Some(&p) => Some(p),
                None => {
                    return Err(BuildError::UnknownParent {
                        id: record.id,
                        parent,
                    })
                }
            },
        };
        let idx = self.push(record);
        match parent {
            None => self.roots.push(idx),
            Some(parent) => self.add_reply(parent, idx),
        }
        Ok(idx)
    }

    pub fn roots(&self) -> impl DoubleEndedIterator<Item = CommentNode<'_>> + ExactSizeIterator {
        self.roots.iter().map(move |&idx| self.node(idx))
    }

    pub fn get(&self, id: CommentId) -> Option<CommentNode<'_>> {
        self.by_id.get(&id).map(|&idx| self.node(idx))
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Number of comments in the forest, replies included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dropped(&self) -> &[CommentId] {
        &self.dropped
    }

    pub fn duplicates(&self) -> &[CommentId] {
        &self.duplicates
    }
}

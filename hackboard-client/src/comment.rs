use crate::{
    api::{Author, CommentId, CommentRecord},
    Forest,
};

/// Index of a comment in its forest's arena
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeIdx(pub(crate) usize);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub record: CommentRecord,

    /// Back-reference to the parent, None for roots
    pub(crate) parent: Option<NodeIdx>,

    /// Replies, in the order they were encountered
    pub(crate) children: Vec<NodeIdx>,
}

impl Comment {
    pub(crate) fn new(record: CommentRecord) -> Comment {
        Comment {
            record,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Borrowed view of one comment of a forest
///
/// Leaves and branches are the same type: a comment without replies just has an empty
/// reply list.
#[derive(Clone, Copy, Debug)]
pub struct CommentNode<'a> {
    pub(crate) forest: &'a Forest,
    pub(crate) idx: NodeIdx,
}

impl<'a> CommentNode<'a> {
    fn comment(&self) -> &'a Comment {
        &self.forest.nodes[self.idx.0]
    }

    pub fn id(&self) -> CommentId {
        self.comment().record.id
    }

    pub fn record(&self) -> &'a CommentRecord {
        &self.comment().record
    }

    pub fn content(&self) -> &'a str {
        &self.comment().record.content
    }

    pub fn author(&self) -> &'a Author {
        &self.comment().record.author
    }

    pub fn parent(&self) -> Option<CommentNode<'a>> {
        self.comment().parent.map(|idx| CommentNode {
            forest: self.forest,
            idx,
        })
    }

    pub fn replies(
        &self,
    ) -> impl DoubleEndedIterator<Item = CommentNode<'a>> + ExactSizeIterator + 'a {
        let forest = self.forest;
        self.comment()
            .children
            .iter()
            .map(move |&idx| CommentNode { forest, idx })
    }

    pub fn reply_ids(&self) -> Vec<CommentId> {
        self.replies().map(|r| r.id()).collect()
    }

    pub fn reply_count(&self) -> usize {
        self.comment().children.len()
    }

    pub fn has_replies(&self) -> bool {
        !self.comment().children.is_empty()
    }
}

impl PartialEq for CommentNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.forest, other.forest) && self.idx == other.idx
    }
}

impl Eq for CommentNode<'_> {}

use crate::{CommentNode, Forest};

/// Total number of comments in the forest, counting replies at every depth
pub fn count_all(forest: &Forest) -> usize {
    // Explicit stack, as threads can be arbitrarily deep
    let mut todo = forest.roots().collect::<Vec<_>>();
    let mut res = 0;
    while let Some(n) = todo.pop() {
        res += 1;
        todo.extend(n.replies());
    }
    res
}

/// Depth-first, pre-order traversal of a forest, yielding each comment with its depth
///
/// Roots are at depth 0.
pub struct Walk<'a> {
    todo: Vec<(usize, CommentNode<'a>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, CommentNode<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, n) = self.todo.pop()?;
        self.todo.extend(n.replies().rev().map(|c| (depth + 1, c)));
        Some((depth, n))
    }
}

impl Forest {
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            todo: self.roots().rev().map(|n| (0, n)).collect(),
        }
    }

    /// Number of levels in the forest: 0 when empty, 1 when there are no replies
    pub fn max_depth(&self) -> usize {
        self.walk().map(|(d, _)| d + 1).max().unwrap_or(0)
    }
}

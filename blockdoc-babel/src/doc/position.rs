//! Resolved positions: where a position falls in the tree.

use super::{find_index, Node};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
struct Step<'a> {
    node: &'a Node,
    index: usize,
    /// Absolute position of the child at `index`.
    offset: usize,
}

/// A position with the chain of nodes that contain it.
///
/// Depth 0 is the root the position was resolved in; [`ResolvedPos::depth`]
/// is the innermost non-text node whose content holds the position.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<Step<'a>>,
    parent_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    pub(crate) fn resolve(root: &'a Node, pos: usize) -> Result<Self> {
        let mut path = Vec::new();
        let mut node = root;
        let mut start = 0;
        let mut parent_offset = pos;

        loop {
            let (index, offset) = find_index(&node.children, parent_offset)?;
            let remaining = parent_offset - offset;
            path.push(Step {
                node,
                index,
                offset: start + offset,
            });
            if remaining == 0 {
                break;
            }
            let Some(child) = node.children.get(index) else {
                break;
            };
            if child.is_leaf() {
                break;
            }
            node = child;
            parent_offset = remaining - 1;
            start += offset + 1;
        }

        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth].node
    }

    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    /// Offset of the position within its parent's content.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Index into the node at `depth` of the child the position is in front of (or inside).
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Start of the content of the node at `depth`.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    /// End of the content of the node at `depth`.
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position right before the node at `depth` (depth must be at least 1).
    pub fn before(&self, depth: usize) -> usize {
        self.path[depth - 1].offset
    }

    /// Position right after the node at `depth` (depth must be at least 1).
    pub fn after(&self, depth: usize) -> usize {
        self.before(depth) + self.node(depth).node_size()
    }

    /// Deepest depth whose node contains both this position and `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&depth| self.start(depth) <= pos && self.end(depth) >= pos)
            .unwrap_or(0)
    }

    /// Innermost ancestor (including the parent) matching `pred`, with its depth.
    pub fn ancestor<P>(&self, pred: P) -> Option<(usize, &'a Node)>
    where
        P: Fn(&Node) -> bool,
    {
        (0..=self.depth())
            .rev()
            .map(|depth| (depth, self.node(depth)))
            .find(|(_, node)| pred(node))
    }
}

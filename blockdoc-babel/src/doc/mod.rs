//! Rich-document tree: the shape the editing surface works on.
//!
//! Every block is a `blockContainer` holding one content node (typed by the
//! block type) and, when it has children, a trailing `blockGroup` of child
//! containers. The document itself is `doc > blockGroup`. Tables nest
//! `tableRow > tableCell > inline` inside their content node.
//!
//! Positions count tokens the way the editing surface does: entering or
//! leaving a non-leaf node is one token, a text node is one token per char
//! and a hard break is one token. The wrapping convention stays in this
//! module and [`mapper`]; the rest of the crate works on [`crate::model`].

pub mod mapper;
pub mod position;

pub use mapper::{
    block_to_node, blocks_to_doc, content_node_to_inline_content, content_node_to_table_content,
    find_block_pos, inline_content_to_nodes, node_to_block, table_content_to_nodes,
};
pub use position::ResolvedPos;

use crate::error::{ConversionError, Result};
use crate::model::PropValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Doc,
    BlockGroup,
    BlockContainer,
    /// Content node of a block, named after the block type.
    Content(String),
    TableRow,
    TableCell,
    Text(String),
    HardBreak,
}

impl NodeKind {
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::BlockGroup => "blockGroup",
            NodeKind::BlockContainer => "blockContainer",
            NodeKind::Content(block_type) => block_type,
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::Text(_) => "text",
            NodeKind::HardBreak => "hardBreak",
        }
    }
}

/// An inline mark: a style (with its value for value styles) or `link`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mark {
    pub name: String,
    pub value: Option<String>,
}

impl Mark {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }

    pub fn with_value(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    pub fn link(href: &str) -> Self {
        Self::with_value("link", href)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub attrs: BTreeMap<String, PropValue>,
    pub marks: Vec<Mark>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
            marks: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(NodeKind::Text(text.to_string()))
    }

    pub fn content(block_type: &str) -> Self {
        Self::new(NodeKind::Content(block_type.to_string()))
    }

    /// A container with the given id and child nodes.
    pub fn container(id: &str, children: Vec<Node>) -> Self {
        Self::new(NodeKind::BlockContainer)
            .with_attr("id", id)
            .with_children(children)
    }

    pub fn group(children: Vec<Node>) -> Self {
        Self::new(NodeKind::BlockGroup).with_children(children)
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Text and hard breaks; every other node has (possibly empty) content.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_) | NodeKind::HardBreak)
    }

    pub fn is_content(&self) -> bool {
        matches!(self.kind, NodeKind::Content(_))
    }

    /// Container, group or content node.
    pub fn is_block_structure(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::BlockContainer | NodeKind::BlockGroup | NodeKind::Content(_)
        )
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn node_size(&self) -> usize {
        match &self.kind {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::HardBreak => 1,
            _ => self.content_size() + 2,
        }
    }

    pub fn content_size(&self) -> usize {
        self.children.iter().map(Node::node_size).sum()
    }

    /// Copy of this node keeping only content between `from` and `to`
    /// (relative to the start of its content, or of its text).
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.kind {
            NodeKind::Text(text) => {
                let cut: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
                Node {
                    kind: NodeKind::Text(cut),
                    attrs: self.attrs.clone(),
                    marks: self.marks.clone(),
                    children: Vec::new(),
                }
            }
            NodeKind::HardBreak => self.clone(),
            _ => Node {
                kind: self.kind.clone(),
                attrs: self.attrs.clone(),
                marks: self.marks.clone(),
                children: cut_children(&self.children, from, to).0,
            },
        }
    }

    /// Content between two positions.
    ///
    /// With `include_parents` the result is cut from the top of the tree, so
    /// it keeps every ancestor of the range (partially). Without it, only
    /// the content of the deepest node spanning both positions is returned.
    pub fn slice(&self, from: usize, to: usize, include_parents: bool) -> Result<Fragment> {
        if from > to {
            return Err(ConversionError::InvalidPosition {
                pos: from,
                reason: format!("range start is after its end {to}"),
            });
        }
        if from == to {
            self.resolve(from)?;
            return Ok(Fragment::empty());
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        let depth = if include_parents {
            0
        } else {
            start.shared_depth(end.pos())
        };
        let offset = start.start(depth);
        let node = start.node(depth);
        Ok(Fragment::new(node.children.clone()).cut(from - offset, to - offset))
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>> {
        ResolvedPos::resolve(self, pos)
    }

    /// Node starting right after `pos`.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, offset) = find_index(&node.children, pos).ok()?;
            let child = node.children.get(index)?;
            if offset == pos || child.is_text() {
                return Some(child);
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// Pre-order walk over all descendants with their positions. The callback
    /// returns whether to visit the node's own descendants.
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        walk(&self.children, 0, f);
    }
}

/// An ordered run of sibling nodes, as produced by slicing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment(pub Vec<Node>);

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn size(&self) -> usize {
        self.0.iter().map(Node::node_size).sum()
    }

    /// Sub-fragment between two offsets, cutting partially covered nodes.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to >= self.size() {
            return self.clone();
        }
        Fragment(cut_children(&self.0, from, to).0)
    }

    /// Same walk as [`Node::descendants`], with positions relative to the
    /// fragment start.
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        walk(&self.0, 0, f);
    }

    /// Whether any node in the fragment (at any depth) satisfies `pred`.
    pub fn any<P>(&self, mut pred: P) -> bool
    where
        P: FnMut(&Node) -> bool,
    {
        let mut found = false;
        self.descendants(&mut |node, _| {
            if !found && pred(node) {
                found = true;
            }
            !found
        });
        found
    }
}

fn cut_children(children: &[Node], from: usize, to: usize) -> (Vec<Node>, usize) {
    let mut result = Vec::new();
    let mut pos = 0;
    for child in children {
        if pos >= to {
            break;
        }
        let end = pos + child.node_size();
        if end > from {
            let cut = if child.is_leaf() {
                child.cut(from.saturating_sub(pos), (to - pos).min(child.node_size()))
            } else {
                child.cut(
                    from.saturating_sub(pos + 1),
                    child.content_size().min(to.saturating_sub(pos + 1)),
                )
            };
            result.push(cut);
        }
        pos = end;
    }
    (result, pos)
}

/// Index of the child containing `pos`, and the offset where it starts.
///
/// A position between two children resolves to the later one; the end of
/// the content resolves to `children.len()`.
pub(crate) fn find_index(children: &[Node], pos: usize) -> Result<(usize, usize)> {
    if pos == 0 {
        return Ok((0, 0));
    }
    let mut offset = 0;
    for (i, child) in children.iter().enumerate() {
        let end = offset + child.node_size();
        if end >= pos {
            return Ok(if end == pos { (i + 1, end) } else { (i, offset) });
        }
        offset = end;
    }
    Err(ConversionError::InvalidPosition {
        pos,
        reason: format!("outside of content of size {offset}"),
    })
}

fn walk<F>(children: &[Node], start: usize, f: &mut F)
where
    F: FnMut(&Node, usize) -> bool,
{
    let mut pos = start;
    for child in children {
        if f(child, pos) && !child.children.is_empty() {
            walk(&child.children, pos + 1, f);
        }
        pos += child.node_size();
    }
}

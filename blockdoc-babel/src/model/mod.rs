//! Block Tree Model: the canonical in-memory document representation.
//!
//! A document is an ordered list of [`Block`]s. Each block has a type tag, a
//! prop map, content whose shape is decided by the type's schema entry, and
//! ordered children. The container/content/group wrapping used by the editing
//! surface never appears here; it is confined to [`crate::doc`].
//!
//! Trees are plain values: every conversion takes a tree by reference and
//! returns a fresh one.

pub mod ids;
pub mod inline;

pub use ids::{BlockId, IdGenerator, IdStrategy, SequentialIds, UuidIds};
pub use inline::{
    merge_adjacent, merge_runs, plain_text, InlineContent, Link, StyleValue, StyledText, Styles,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of a block prop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(i64),
    String(String),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Parses an attribute string into a value of the same kind as `like`.
    pub fn parse_like(like: &PropValue, raw: &str) -> Option<PropValue> {
        match like {
            PropValue::Bool(_) => match raw {
                "true" | "" | "checked" => Some(PropValue::Bool(true)),
                "false" => Some(PropValue::Bool(false)),
                _ => None,
            },
            PropValue::Number(_) => raw.trim().parse().ok().map(PropValue::Number),
            PropValue::String(_) => Some(PropValue::String(raw.to_string())),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Number(n) => write!(f, "{n}"),
            PropValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Number(value)
    }
}

pub type Props = BTreeMap<String, PropValue>;

/// A row of a table: one inline run sequence per cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Vec<InlineContent>>,
}

/// Rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "tableContent")]
pub struct TableContent {
    pub rows: Vec<TableRow>,
}

impl TableContent {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    /// Builds a table of unstyled text cells.
    pub fn from_text(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| TableRow {
                    cells: row
                        .iter()
                        .map(|cell| {
                            if cell.is_empty() {
                                vec![]
                            } else {
                                vec![InlineContent::text(*cell)]
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Widest row's cell count.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|r| r.cells.len() == width)
    }

    /// Pads short rows with empty cells so the grid is rectangular.
    pub fn pad(mut self) -> Self {
        let width = self.width();
        for row in &mut self.rows {
            row.cells.resize_with(width, Vec::new);
        }
        self
    }
}

/// Content of a block; which variant is allowed is decided by the schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Inline(Vec<InlineContent>),
    Table(TableContent),
    #[default]
    None,
}

impl BlockContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            BlockContent::Inline(_) => "inline content",
            BlockContent::Table(_) => "table content",
            BlockContent::None => "no content",
        }
    }
}

/// Node of the canonical document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub content: BlockContent,
    #[serde(default)]
    pub children: Vec<Block>,
}

/// Whether a block nests other blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockShape<'a> {
    Leaf,
    WithChildren(&'a [Block]),
}

impl Block {
    /// A block of the given type with no props, content or children.
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            id: BlockId::default(),
            block_type: block_type.into(),
            props: Props::new(),
            content: BlockContent::None,
            children: Vec::new(),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::new("paragraph").with_inline(vec![InlineContent::text(text)])
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Self::new("heading")
            .with_prop("level", level.to_string())
            .with_inline(vec![InlineContent::text(text)])
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn with_inline(mut self, content: Vec<InlineContent>) -> Self {
        self.content = BlockContent::Inline(content);
        self
    }

    pub fn with_table(mut self, table: TableContent) -> Self {
        self.content = BlockContent::Table(table);
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    pub fn shape(&self) -> BlockShape<'_> {
        if self.children.is_empty() {
            BlockShape::Leaf
        } else {
            BlockShape::WithChildren(&self.children)
        }
    }

    pub fn inline_content(&self) -> Option<&[InlineContent]> {
        match &self.content {
            BlockContent::Inline(content) => Some(content),
            _ => None,
        }
    }

    /// Copy of the block tree with every id cleared, for comparisons up to ids.
    pub fn without_ids(&self) -> Block {
        Block {
            id: BlockId::default(),
            block_type: self.block_type.clone(),
            props: self.props.clone(),
            content: self.content.clone(),
            children: strip_ids(&self.children),
        }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        BlockId(id)
    }
}

/// Clears ids across a block list.
pub fn strip_ids(blocks: &[Block]) -> Vec<Block> {
    blocks.iter().map(Block::without_ids).collect()
}

/// Assigns fresh ids to every block that has none.
pub fn assign_missing_ids(blocks: &mut [Block], ids: &mut dyn IdGenerator) {
    for block in blocks {
        if block.id.is_empty() {
            block.id = ids.next_id();
        }
        assign_missing_ids(&mut block.children, ids);
    }
}

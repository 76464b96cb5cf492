//! Selection Export Pipeline: a live selection → clipboard payloads.
//!
//! The exporter picks the most specific form of the selection first:
//!
//! 1. a cell selection exports table content (a captured whole table is
//!    unwrapped to its rows);
//! 2. a selection whose content holds no block structure exports inline
//!    content, with no block around it;
//! 3. anything else exports the blocks it touches, partially cut at both
//!    ends.
//!
//! Each export yields the internal rendering, the external HTML and the
//! Markdown derived from that external HTML, in that order. The document is
//! only read. On cut, deleting the range afterwards is up to the caller.

use crate::deps::FormattingDeps;
use crate::doc::{
    content_node_to_inline_content, content_node_to_table_content, node_to_block, Fragment, Node,
    NodeKind,
};
use crate::error::{ConversionError, Result};
use crate::formats::html::{ExportOptions, HtmlExporter};
use crate::formats::markdown::{html_to_markdown, MarkdownOptions};
use crate::model::Block;
use crate::schema::Schema;
use log::{debug, trace};
use std::sync::Arc;

/// Clipboard slot for the editor's own HTML.
pub const INTERNAL_HTML_MIME: &str = "internal-html";
pub const HTML_MIME: &str = "text/html";
pub const TEXT_MIME: &str = "text/plain";

/// A rectangle of cells in the table whose content node starts at
/// `table_pos`. `bottom` and `right` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub table_pos: usize,
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Text { anchor: usize, head: usize },
    /// The node starting at `pos`.
    Node { pos: usize },
    Cell(CellRange),
}

impl Selection {
    /// Selection covering `from..to`, whatever direction it was made in.
    pub fn text(anchor: usize, head: usize) -> Self {
        Selection::Text { anchor, head }
    }

    pub fn node(pos: usize) -> Self {
        Selection::Node { pos }
    }

    /// Document range covered by the selection.
    pub fn range(&self, doc: &Node) -> Result<(usize, usize)> {
        match *self {
            Selection::Text { anchor, head } => Ok((anchor.min(head), anchor.max(head))),
            Selection::Node { pos } => {
                let node = doc.node_at(pos).ok_or_else(|| ConversionError::InvalidPosition {
                    pos,
                    reason: "no node starts here".to_string(),
                })?;
                Ok((pos, pos + node.node_size()))
            }
            Selection::Cell(range) => {
                let table = table_at(doc, range.table_pos)?;
                Ok((range.table_pos, range.table_pos + table.node_size()))
            }
        }
    }

    /// Selected content, with its ancestors cut down around it.
    ///
    /// Cell selections return the selected rows holding only the selected
    /// cells, or the table node itself when every cell is selected.
    pub fn content(&self, doc: &Node) -> Result<Fragment> {
        let Selection::Cell(range) = *self else {
            let (from, to) = self.range(doc)?;
            return doc.slice(from, to, true);
        };

        let table = table_at(doc, range.table_pos)?;
        let height = table.children.len();
        let width = table.children.iter().map(|r| r.children.len()).max().unwrap_or(0);
        if range.top >= range.bottom
            || range.left >= range.right
            || range.bottom > height
            || range.right > width
        {
            return Err(ConversionError::InvalidPosition {
                pos: range.table_pos,
                reason: format!(
                    "cells {}..{} x {}..{} outside a {height}x{width} table",
                    range.top, range.bottom, range.left, range.right
                ),
            });
        }
        if range.top == 0 && range.left == 0 && range.bottom == height && range.right == width {
            return Ok(Fragment::new(vec![table.clone()]));
        }

        let rows = table.children[range.top..range.bottom]
            .iter()
            .map(|row| {
                let end = range.right.min(row.children.len());
                let start = range.left.min(end);
                row.clone().with_children(row.children[start..end].to_vec())
            })
            .collect();
        Ok(Fragment::new(rows))
    }

    /// A node selection of a content node becomes a selection of its
    /// container, so block props and children come along.
    pub fn expand_content_node(self, doc: &Node) -> Self {
        match self {
            Selection::Node { pos } if pos > 0 => match doc.node_at(pos) {
                Some(node) if node.is_content() => Selection::Node { pos: pos - 1 },
                _ => self,
            },
            _ => self,
        }
    }
}

fn table_at(doc: &Node, pos: usize) -> Result<&Node> {
    match doc.node_at(pos) {
        Some(node) if node.is_content() && node.children.iter().all(|r| r.kind == NodeKind::TableRow) => {
            Ok(node)
        }
        Some(node) => Err(ConversionError::InvalidPosition {
            pos,
            reason: format!("expected a table, found {}", node.kind.name()),
        }),
        None => Err(ConversionError::InvalidPosition {
            pos,
            reason: "no node starts here".to_string(),
        }),
    }
}

/// Which form a selection is exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportGranularity {
    Table,
    Inline,
    Blocks,
}

/// Decides how a selection is exported, most specific form first.
pub fn classify(doc: &Node, selection: &Selection) -> Result<ExportGranularity> {
    if let Selection::Cell(_) = selection {
        return Ok(ExportGranularity::Table);
    }
    let (from, to) = selection.range(doc)?;
    let inner = doc.slice(from, to, false)?;
    let structured = inner.any(|node| {
        node.is_block_structure() || matches!(node.kind, NodeKind::TableRow | NodeKind::TableCell)
    });
    Ok(if structured {
        ExportGranularity::Blocks
    } else {
        ExportGranularity::Inline
    })
}

/// The three clipboard representations of one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub internal_html: String,
    pub external_html: String,
    pub markdown: String,
}

impl ClipboardPayload {
    /// Payloads keyed by clipboard slot, in write order.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (INTERNAL_HTML_MIME, &self.internal_html),
            (HTML_MIME, &self.external_html),
            (TEXT_MIME, &self.markdown),
        ]
    }
}

/// Exports selections of a live document to clipboard payloads.
#[derive(Debug, Clone)]
pub struct ClipboardExporter {
    schema: Arc<Schema>,
    html: HtmlExporter,
    deps: Arc<FormattingDeps>,
    markdown: MarkdownOptions,
}

impl ClipboardExporter {
    pub fn new(schema: Arc<Schema>, deps: Arc<FormattingDeps>, markdown: MarkdownOptions) -> Self {
        Self {
            html: HtmlExporter::new(Arc::clone(&schema)),
            schema,
            deps,
            markdown,
        }
    }

    pub fn export_selection(&self, doc: &Node, selection: &Selection) -> Result<ClipboardPayload> {
        let selection = selection.expand_content_node(doc);
        let granularity = classify(doc, &selection)?;
        debug!("exporting {selection:?} as {granularity:?}");

        let (internal_html, external_html) = match granularity {
            ExportGranularity::Table => {
                let fragment = selection.content(doc)?;
                let rows = match fragment.nodes() {
                    [table] if table.is_content() => table.children.as_slice(),
                    rows => rows,
                };
                let table = content_node_to_table_content(rows, &self.schema)?;
                let html = self
                    .html
                    .export_table_content(&table, &ExportOptions::external())?;
                (
                    self.html.export_table_content(&table, &ExportOptions::internal())?,
                    html,
                )
            }
            ExportGranularity::Inline => {
                let (from, to) = selection.range(doc)?;
                let fragment = doc.slice(from, to, false)?;
                let content = content_node_to_inline_content(fragment.nodes(), &self.schema)?;
                (
                    self.html
                        .export_inline_content(&content, &ExportOptions::internal())?,
                    self.html
                        .export_inline_content(&content, &ExportOptions::external())?,
                )
            }
            ExportGranularity::Blocks => {
                let blocks = self.fragment_to_blocks(&selection.content(doc)?)?;
                (
                    self.html.export_blocks(&blocks, &ExportOptions::internal())?,
                    self.html.export_blocks(&blocks, &ExportOptions::external())?,
                )
            }
        };

        let markdown = html_to_markdown(&external_html, &self.deps, &self.markdown)?;
        Ok(ClipboardPayload {
            internal_html,
            external_html,
            markdown,
        })
    }

    /// Blocks touched by a sliced fragment.
    ///
    /// Containers cut down to just their group are walked through; every
    /// other container maps to one block, children included.
    pub fn fragment_to_blocks(&self, fragment: &Fragment) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut failure = None;
        fragment.descendants(&mut |node, _| {
            if failure.is_some() {
                return false;
            }
            if node.kind != NodeKind::BlockContainer {
                return true;
            }
            match node.first_child() {
                None => {
                    trace!("skipping emptied container");
                    false
                }
                Some(first) if first.kind == NodeKind::BlockGroup => true,
                Some(_) => {
                    match node_to_block(node, &self.schema) {
                        Ok(block) => blocks.push(block),
                        Err(err) => failure = Some(err),
                    }
                    false
                }
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(blocks),
        }
    }
}

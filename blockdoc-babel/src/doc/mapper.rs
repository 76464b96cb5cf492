//! Document-Tree Mapper: rich-document nodes ⇄ blocks.
//!
//! Node → block:
//!
//!     blockContainer(id)                      Block { id, type, props,
//!       ├── <type>(props)  ── inline/table ──>        content,
//!       └── blockGroup                                children }
//!             └── blockContainer …
//!
//! A container whose first child is a group is only a nesting wrapper and is
//! rejected by [`node_to_block`]; callers walk into its group instead. Nothing
//! is silently dropped: every shape that does not fit the convention is a
//! [`ConversionError::MalformedNesting`].

use super::{Mark, Node, NodeKind};
use crate::error::{ConversionError, Result};
use crate::model::{
    merge_adjacent, Block, BlockContent, BlockId, InlineContent, Link, PropValue, StyleValue,
    StyledText, Styles, TableContent, TableRow,
};
use crate::schema::{ContentKind, Schema, StyleKind};
use log::trace;

const LINK_MARK: &str = "link";

/// Converts one `blockContainer` node (and its nested group) into a block.
pub fn node_to_block(node: &Node, schema: &Schema) -> Result<Block> {
    if node.kind != NodeKind::BlockContainer {
        return Err(ConversionError::MalformedNesting(format!(
            "expected blockContainer, found {}",
            node.kind.name()
        )));
    }
    let content = match node.children.first() {
        Some(first) if first.is_content() => first,
        Some(first) => {
            return Err(ConversionError::MalformedNesting(format!(
                "blockContainer starts with {} instead of a content node",
                first.kind.name()
            )))
        }
        None => {
            return Err(ConversionError::MalformedNesting(
                "blockContainer without content".to_string(),
            ))
        }
    };

    let block_type = content.kind.name();
    let spec = schema.block(block_type)?;
    trace!("mapping {block_type} container");

    let mut block = Block::new(block_type);
    block.id = match node.attrs.get("id") {
        Some(PropValue::String(id)) => BlockId::from(id.as_str()),
        Some(other) => BlockId(other.to_string()),
        None => BlockId::default(),
    };
    block.props = content.attrs.clone();
    schema.validate_props(&block)?;
    schema.normalize_props(&mut block);

    block.content = match spec.content {
        ContentKind::Inline => {
            BlockContent::Inline(content_node_to_inline_content(&content.children, schema)?)
        }
        ContentKind::Table => {
            BlockContent::Table(content_node_to_table_content(&content.children, schema)?)
        }
        ContentKind::None if content.children.is_empty() => BlockContent::None,
        ContentKind::None => {
            return Err(ConversionError::mismatch(
                block_type,
                "content node has children but the type declares no content",
            ))
        }
    };

    match &node.children[1..] {
        [] => {}
        [group] if group.kind == NodeKind::BlockGroup => {
            block.children = group
                .children
                .iter()
                .map(|child| node_to_block(child, schema))
                .collect::<Result<_>>()?;
        }
        [other] => {
            return Err(ConversionError::MalformedNesting(format!(
                "{} after the content of {block_type}, expected blockGroup",
                other.kind.name()
            )))
        }
        _ => {
            return Err(ConversionError::MalformedNesting(format!(
                "{} children in a blockContainer, expected at most 2",
                node.children.len()
            )))
        }
    }

    Ok(block)
}

/// Inline nodes of a content node (or a slice of one) → inline content.
///
/// Marks become styles, runs marked with the same `link` are grouped into one
/// [`Link`], hard breaks become `"\n"`. Run order is kept and adjacent runs
/// with equal styles are merged.
pub fn content_node_to_inline_content(nodes: &[Node], schema: &Schema) -> Result<Vec<InlineContent>> {
    let mut content = Vec::with_capacity(nodes.len());
    for node in nodes {
        let text = match &node.kind {
            NodeKind::Text(text) => text.as_str(),
            NodeKind::HardBreak => "\n",
            other => {
                return Err(ConversionError::MalformedNesting(format!(
                    "{} inside inline content",
                    other.name()
                )))
            }
        };
        let (styles, href) = marks_to_styles(&node.marks, schema)?;
        let run = StyledText::new(text, styles);
        content.push(match href {
            Some(href) => InlineContent::Link(Link {
                href,
                content: vec![run],
            }),
            None => InlineContent::Text(run),
        });
    }
    Ok(merge_adjacent(content))
}

fn marks_to_styles(marks: &[Mark], schema: &Schema) -> Result<(Styles, Option<String>)> {
    let mut styles = Styles::new();
    let mut href = None;
    for mark in marks {
        if mark.name == LINK_MARK {
            href = Some(mark.value.clone().unwrap_or_default());
            continue;
        }
        let spec = schema
            .styles
            .get(&mark.name)
            .ok_or_else(|| ConversionError::InvalidStyle {
                style: mark.name.clone(),
                reason: "not registered in the style schema".to_string(),
            })?;
        let value = match (spec.kind, &mark.value) {
            (StyleKind::Boolean, _) => StyleValue::Toggle,
            (StyleKind::String, Some(value)) => StyleValue::Value(value.clone()),
            (StyleKind::String, None) => {
                return Err(ConversionError::InvalidStyle {
                    style: mark.name.clone(),
                    reason: "mark carries no value".to_string(),
                })
            }
        };
        styles.insert(&mark.name, value);
    }
    Ok((styles, href))
}

/// Row nodes of a table content node → table content.
///
/// Takes the rows, not the table node; callers holding a whole table pass
/// its children. Short rows are padded.
pub fn content_node_to_table_content(rows: &[Node], schema: &Schema) -> Result<TableContent> {
    let mut table = Vec::with_capacity(rows.len());
    for row in rows {
        if row.kind != NodeKind::TableRow {
            return Err(ConversionError::MalformedNesting(format!(
                "expected tableRow, found {}",
                row.kind.name()
            )));
        }
        let mut cells = Vec::with_capacity(row.children.len());
        for cell in &row.children {
            if cell.kind != NodeKind::TableCell {
                return Err(ConversionError::MalformedNesting(format!(
                    "expected tableCell, found {}",
                    cell.kind.name()
                )));
            }
            cells.push(content_node_to_inline_content(&cell.children, schema)?);
        }
        table.push(TableRow { cells });
    }
    Ok(TableContent::new(table).pad())
}

/// Inline content → text and hard-break nodes with marks in canonical order.
pub fn inline_content_to_nodes(content: &[InlineContent], schema: &Schema) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    for item in content {
        match item {
            InlineContent::Text(run) => push_run(&mut nodes, run, None, schema)?,
            InlineContent::Link(link) => {
                for run in &link.content {
                    push_run(&mut nodes, run, Some(&link.href), schema)?;
                }
            }
        }
    }
    Ok(nodes)
}

fn push_run(nodes: &mut Vec<Node>, run: &StyledText, href: Option<&str>, schema: &Schema) -> Result<()> {
    schema.styles.validate(&run.styles)?;
    let mut marks: Vec<Mark> = schema
        .styles
        .iter()
        .filter_map(|spec| match run.styles.get(&spec.name)? {
            StyleValue::Toggle => Some(Mark::new(&spec.name)),
            StyleValue::Value(value) => Some(Mark::with_value(&spec.name, value)),
        })
        .collect();
    if let Some(href) = href {
        marks.push(Mark::link(href));
    }

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::new(NodeKind::HardBreak).with_marks(marks.clone()));
        }
        if !line.is_empty() {
            nodes.push(Node::text(line).with_marks(marks.clone()));
        }
    }
    Ok(())
}

pub fn table_content_to_nodes(table: &TableContent, schema: &Schema) -> Result<Vec<Node>> {
    table
        .rows
        .iter()
        .map(|row| {
            let cells = row
                .cells
                .iter()
                .map(|cell| {
                    Ok(Node::new(NodeKind::TableCell)
                        .with_children(inline_content_to_nodes(cell, schema)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Node::new(NodeKind::TableRow).with_children(cells))
        })
        .collect()
}

/// Block → `blockContainer` node (content node plus a group for children).
pub fn block_to_node(block: &Block, schema: &Schema) -> Result<Node> {
    schema.validate(block)?;
    container(block, schema)
}

fn container(block: &Block, schema: &Schema) -> Result<Node> {
    let mut content = Node::content(&block.block_type);
    content.attrs = block.props.clone();
    content.children = match &block.content {
        BlockContent::Inline(inline) => inline_content_to_nodes(inline, schema)?,
        BlockContent::Table(table) => table_content_to_nodes(table, schema)?,
        BlockContent::None => Vec::new(),
    };

    let mut children = vec![content];
    if !block.children.is_empty() {
        let nested = block
            .children
            .iter()
            .map(|child| container(child, schema))
            .collect::<Result<Vec<_>>>()?;
        children.push(Node::group(nested));
    }
    Ok(Node::container(block.id.as_str(), children))
}

/// Blocks → `doc > blockGroup > blockContainer…`.
pub fn blocks_to_doc(blocks: &[Block], schema: &Schema) -> Result<Node> {
    schema.validate_blocks(blocks)?;
    let containers = blocks
        .iter()
        .map(|block| container(block, schema))
        .collect::<Result<Vec<_>>>()?;
    Ok(Node::new(NodeKind::Doc).with_children(vec![Node::group(containers)]))
}

/// Position right before the container of the block with `id`.
pub fn find_block_pos(doc: &Node, id: &str) -> Option<usize> {
    let mut found = None;
    doc.descendants(&mut |node, pos| {
        if found.is_some() {
            return false;
        }
        if node.kind == NodeKind::BlockContainer
            && node.attrs.get("id").and_then(PropValue::as_str) == Some(id)
        {
            found = Some(pos);
            return false;
        }
        true
    });
    found
}

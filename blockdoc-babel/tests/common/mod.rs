//! Shared fixtures for the integration tests.

use blockdoc_babel::formats::html::{ExportOptions, HtmlExporter, HtmlImporter};
use blockdoc_babel::formats::markdown::{MarkdownExporter, MarkdownImporter, MarkdownOptions};
use blockdoc_babel::model::{strip_ids, Block, InlineContent, SequentialIds};
use blockdoc_babel::{FormattingDeps, Schema};
use std::sync::Arc;

pub fn schema() -> Arc<Schema> {
    Arc::new(Schema::default())
}

pub fn external_html(blocks: &[Block]) -> String {
    HtmlExporter::new(schema())
        .export_blocks(blocks, &ExportOptions::external())
        .unwrap()
}

pub fn internal_html(blocks: &[Block]) -> String {
    HtmlExporter::new(schema())
        .export_blocks(blocks, &ExportOptions::internal())
        .unwrap()
}

pub fn markdown(blocks: &[Block]) -> String {
    MarkdownExporter::new(schema(), Arc::new(FormattingDeps::new()), MarkdownOptions::default())
        .export_blocks(blocks)
        .unwrap()
}

pub fn parse_html(html: &str) -> Vec<Block> {
    HtmlImporter::new(schema(), Box::new(SequentialIds::default()))
        .parse_html(html)
        .unwrap()
}

/// Imported blocks with ids cleared.
pub fn import_html(html: &str) -> Vec<Block> {
    strip_ids(&parse_html(html))
}

pub fn import_markdown(markdown: &str) -> Vec<Block> {
    let blocks = MarkdownImporter::new(schema(), Box::new(SequentialIds::default()))
        .parse_markdown(markdown)
        .unwrap();
    strip_ids(&blocks)
}

/// A level-1 heading as importers produce it (default level omitted).
pub fn h1(text: &str) -> Block {
    Block::new("heading").with_inline(vec![InlineContent::text(text)])
}

pub fn item(block_type: &str, text: &str) -> Block {
    Block::new(block_type).with_inline(vec![InlineContent::text(text)])
}

/// heading / paragraph / bullet / numbered, as used by several scenarios.
pub fn basic_document() -> Vec<Block> {
    vec![
        Block::heading(1, "Heading").with_id("1"),
        Block::paragraph("Paragraph").with_id("2"),
        item("bulletListItem", "Item").with_id("3"),
        item("numberedListItem", "Item2").with_id("4"),
    ]
}

//! A block type registered from outside the crate takes part in every path.

use blockdoc_babel::formats::html::{dom, ExportOptions, HtmlExporter, HtmlImporter, ParseContext, RenderContext};
use blockdoc_babel::formats::markdown::{MarkdownExporter, MarkdownOptions};
use blockdoc_babel::model::{strip_ids, Block, InlineContent, SequentialIds};
use blockdoc_babel::schema::blocks::builtin_blocks;
use blockdoc_babel::schema::{BlockSpec, BlockTemplate, ContentKind, ParsedBlock, PropSchema, StyleSchema};
use blockdoc_babel::{ConversionError, FormattingDeps, Schema};
use markup5ever_rcdom::Handle;
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct QuoteTemplate;

impl BlockTemplate for QuoteTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<(), ConversionError> {
        let content = block.inline_content().unwrap_or(&[]);
        dom::append(parent, ctx.inline_element("blockquote", content)?);
        Ok(())
    }

    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        (dom::element_name(element)? == "blockquote").then(|| ParsedBlock::inline(ctx.parse_inline(element)))
    }
}

fn schema() -> Arc<Schema> {
    let mut blocks = builtin_blocks();
    blocks.register(BlockSpec::new(
        "quote",
        ContentKind::Inline,
        PropSchema::defaults_with(vec![]),
        QuoteTemplate,
    ));
    Arc::new(Schema::new(blocks, StyleSchema::with_defaults()))
}

fn quote(text: &str) -> Block {
    Block::new("quote").with_inline(vec![InlineContent::text(text)])
}

#[test]
fn test_custom_block_exports_and_imports() {
    let blocks = vec![quote("Wise words")];
    let html = HtmlExporter::new(schema())
        .export_blocks(&blocks, &ExportOptions::external())
        .unwrap();
    assert_eq!(html, "<blockquote>Wise words</blockquote>");

    let imported = HtmlImporter::new(schema(), Box::new(SequentialIds::default()))
        .parse_html(&html)
        .unwrap();
    assert_eq!(strip_ids(&imported), blocks);
}

#[test]
fn test_custom_block_round_trips_internally() {
    let blocks = vec![quote("Inside").with_id("q").with_prop("textColor", "red")];
    let html = HtmlExporter::new(schema())
        .export_blocks(&blocks, &ExportOptions::internal())
        .unwrap();
    assert!(html.contains(r#"data-content-type="quote""#));
    let imported = HtmlImporter::new(schema(), Box::new(SequentialIds::default()))
        .parse_html(&html)
        .unwrap();
    assert_eq!(imported, blocks);
}

#[test]
fn test_custom_block_reaches_markdown() {
    let exporter = MarkdownExporter::new(schema(), Arc::new(FormattingDeps::new()), MarkdownOptions::default());
    assert_eq!(exporter.export_blocks(&[quote("Wise words")]).unwrap(), "> Wise words\n");
}

#[test]
fn test_default_schema_rejects_the_custom_type() {
    let result = HtmlExporter::new(Arc::new(Schema::default()))
        .export_blocks(&[quote("x")], &ExportOptions::external());
    assert_eq!(result.unwrap_err(), ConversionError::UnknownBlockType("quote".to_string()));
}

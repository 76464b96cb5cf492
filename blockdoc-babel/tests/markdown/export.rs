//! Export tests for Markdown (blocks → Markdown)

use crate::common::{basic_document, item, markdown};
use blockdoc_babel::formats::markdown::{MarkdownExporter, MarkdownOptions};
use blockdoc_babel::model::{Block, InlineContent, Styles, TableContent};
use blockdoc_babel::{FormattingDeps, Schema};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

#[test]
fn test_basic_document() {
    assert_eq!(
        markdown(&basic_document()),
        "# Heading\n\nParagraph\n\n*   Item\n\n1.  Item2\n"
    );
}

#[test]
fn test_bold_and_italic() {
    let block = Block::new("paragraph").with_inline(vec![
        InlineContent::styled("Bold", Styles::new().with("bold")),
        InlineContent::text(" "),
        InlineContent::styled("Italic", Styles::new().with("italic")),
    ]);
    assert_eq!(markdown(&[block]), "**Bold** *Italic*\n");
}

#[test]
fn test_unsupported_styles_keep_their_text() {
    let block = Block::new("paragraph").with_inline(vec![
        InlineContent::styled("under", Styles::new().with("underline")),
        InlineContent::text(" and "),
        InlineContent::styled("red", Styles::new().with_value("textColor", "red")),
    ]);
    assert_eq!(markdown(&[block]), "under and red\n");
}

#[test]
fn test_nested_list() {
    let parent = item("bulletListItem", "Parent").with_children(vec![item("bulletListItem", "Child")]);
    assert_eq!(markdown(&[parent]), "*   Parent\n\n    *   Child\n");
}

#[test]
fn test_numbering_continues_across_a_run() {
    let blocks = vec![
        item("numberedListItem", "One"),
        item("numberedListItem", "Two"),
        item("numberedListItem", "Three"),
    ];
    assert_eq!(markdown(&blocks), "1.  One\n\n2.  Two\n\n3.  Three\n");
}

#[test]
fn test_check_list() {
    let blocks = vec![
        item("checkListItem", "Done").with_prop("checked", true),
        item("checkListItem", "Todo"),
    ];
    assert_eq!(markdown(&blocks), "*   [x] Done\n\n*   [ ] Todo\n");
}

#[test]
fn test_table() {
    let table = Block::new("table").with_table(TableContent::from_text(&[&["a", "b"], &["c", ""]]));
    assert_eq!(markdown(&[table]), "| a   | b   |\n| --- | --- |\n| c   |     |\n");
}

#[rstest]
#[case(Block::new("image").with_prop("url", "a.png"), "![](a.png)\n")]
#[case(
    Block::new("image").with_prop("url", "a.png").with_prop("caption", "Cap"),
    "![Cap](a.png)\n"
)]
fn test_image(#[case] block: Block, #[case] expected: &str) {
    assert_eq!(markdown(&[block]), expected);
}

#[test]
fn test_links_and_hard_breaks() {
    let block = Block::new("paragraph").with_inline(vec![
        InlineContent::link("https://example.com", "site"),
        InlineContent::text("\nnext"),
    ]);
    assert_eq!(markdown(&[block]), "[site](https://example.com)\\\nnext\n");
}

#[test]
fn test_empty_document() {
    assert_eq!(markdown(&[]), "");
}

#[test]
fn test_markdown_options() {
    let options = MarkdownOptions {
        bullet_marker: '-',
        list_indent: 2,
        emphasis_marker: '_',
    };
    let exporter = MarkdownExporter::new(Arc::new(Schema::default()), Arc::new(FormattingDeps::new()), options);
    let parent = item("bulletListItem", "Parent").with_children(vec![item("bulletListItem", "Child")]);
    let styled = Block::new("paragraph")
        .with_inline(vec![InlineContent::styled("em", Styles::new().with("italic"))]);
    assert_eq!(
        exporter.export_blocks(&[parent, styled]).unwrap(),
        "- Parent\n\n  - Child\n\n_em_\n"
    );
}

//! Export tests for HTML (blocks → HTML)

use crate::common::{basic_document, external_html, internal_html, item};
use blockdoc_babel::formats::html::{ExportOptions, HtmlExporter};
use blockdoc_babel::model::{merge_adjacent, Block, InlineContent, Link, StyledText, Styles, TableContent};
use blockdoc_babel::{ConversionError, Schema};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

#[test]
fn test_basic_document_external() {
    assert_eq!(
        external_html(&basic_document()),
        "<h1>Heading</h1><p>Paragraph</p><ul><li><p>Item</p></li></ul><ol><li><p>Item2</p></li></ol>"
    );
}

#[test]
fn test_styles_nest_in_canonical_order() {
    let block = Block::paragraph("").with_inline(vec![
        InlineContent::styled("Bold", Styles::new().with("bold")),
        InlineContent::styled("Italic", Styles::new().with("italic")),
        InlineContent::styled("Multi", Styles::new().with("bold").with("italic")),
    ]);
    assert_eq!(
        external_html(&[block]),
        "<p><strong>Bold</strong><em>Italic</em><strong><em>Multi</em></strong></p>"
    );
}

#[test]
fn test_style_application_order_is_irrelevant() {
    let italic_first = Styles::new().with("italic").with("underline").with("bold");
    let bold_first = Styles::new().with("bold").with("underline").with("italic");
    let a = external_html(&[Block::paragraph("").with_inline(vec![InlineContent::styled("x", italic_first)])]);
    let b = external_html(&[Block::paragraph("").with_inline(vec![InlineContent::styled("x", bold_first)])]);
    assert_eq!(a, b);
    assert_eq!(a, "<p><strong><em><u>x</u></em></strong></p>");
}

#[test]
fn test_split_runs_export_like_merged_runs() {
    let bold = Styles::new().with("bold");
    let split = vec![
        InlineContent::styled("Hel", bold.clone()),
        InlineContent::styled("lo", bold.clone()),
        InlineContent::text(" world"),
    ];
    let merged = merge_adjacent(split.clone());
    assert_eq!(merge_adjacent(merged.clone()), merged);
    assert_eq!(
        external_html(&[Block::paragraph("").with_inline(split)]),
        external_html(&[Block::paragraph("").with_inline(merged)])
    );
}

#[test]
fn test_value_styles_render_as_spans() {
    let block = Block::paragraph("").with_inline(vec![InlineContent::styled(
        "red",
        Styles::new().with("bold").with_value("textColor", "red"),
    )]);
    assert_snapshot!(
        external_html(&[block]),
        @r#"<p><strong><span data-text-color="red">red</span></strong></p>"#
    );
}

#[test]
fn test_links_and_breaks() {
    let block = Block::paragraph("").with_inline(vec![
        InlineContent::text("line\nnext "),
        InlineContent::Link(Link {
            href: "https://example.com".to_string(),
            content: vec![StyledText::new("site", Styles::new().with("italic"))],
        }),
    ]);
    assert_eq!(
        external_html(&[block]),
        r#"<p>line<br>next <a href="https://example.com"><em>site</em></a></p>"#
    );
}

#[test]
fn test_nested_list_items_render_inside_parent() {
    let blocks = vec![item("bulletListItem", "Parent").with_children(vec![
        item("bulletListItem", "Child"),
        item("numberedListItem", "Numbered"),
    ])];
    assert_eq!(
        external_html(&blocks),
        "<ul><li><p>Parent</p><ul><li><p>Child</p></li></ul><ol><li><p>Numbered</p></li></ol></li></ul>"
    );
}

#[test]
fn test_children_of_plain_blocks_use_a_block_group() {
    let blocks = vec![Block::paragraph("Parent").with_children(vec![Block::paragraph("Child")])];
    assert_eq!(
        external_html(&blocks),
        r#"<p>Parent</p><div data-node-type="blockGroup"><p>Child</p></div>"#
    );
}

#[test]
fn test_check_list_items() {
    let blocks = vec![
        item("checkListItem", "Done").with_prop("checked", true),
        item("checkListItem", "Todo"),
        item("bulletListItem", "Plain"),
    ];
    assert_eq!(
        external_html(&blocks),
        concat!(
            r#"<ul><li><input type="checkbox" checked=""><p>Done</p></li>"#,
            r#"<li><input type="checkbox"><p>Todo</p></li>"#,
            "<li><p>Plain</p></li></ul>"
        )
    );
}

#[rstest]
#[case(Block::new("image").with_prop("url", "a.png"), r#"<img src="a.png" width="512">"#)]
#[case(
    Block::new("image").with_prop("url", "a.png").with_prop("caption", "Cap").with_prop("previewWidth", 300_i64),
    r#"<img src="a.png" alt="Cap" width="300">"#
)]
#[case(
    Block::new("image").with_prop("url", "a.png").with_prop("textAlignment", "center"),
    r#"<img src="a.png" width="512" data-text-alignment="center">"#
)]
fn test_image_export(#[case] block: Block, #[case] expected: &str) {
    assert_eq!(external_html(&[block]), expected);
}

#[test]
fn test_table_export() {
    let table = Block::new("table").with_table(TableContent::from_text(&[&["a", "b"], &["c", ""]]));
    assert_eq!(
        external_html(&[table]),
        "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td></td></tr></tbody></table>"
    );
}

#[test]
fn test_internal_nesting() {
    let blocks = vec![item("bulletListItem", "A")
        .with_id("a")
        .with_children(vec![Block::paragraph("B").with_id("b")])];
    assert_snapshot!(internal_html(&blocks), @r#"<div class="bn-block-group" data-node-type="blockGroup"><div class="bn-block" data-node-type="blockContainer" data-id="a"><div class="bn-block-content" data-content-type="bulletListItem"><p class="bn-inline-content">A</p></div><div class="bn-block-group" data-node-type="blockGroup"><div class="bn-block" data-node-type="blockContainer" data-id="b"><div class="bn-block-content" data-content-type="paragraph"><p class="bn-inline-content">B</p></div></div></div></div></div>"#);
}

#[rstest]
#[case::unknown_type(Block::new("video"))]
#[case::missing_content(Block::new("paragraph"))]
#[case::bad_level(Block::heading(7, "x"))]
#[case::undeclared_prop(Block::paragraph("x").with_prop("url", "a"))]
#[case::table_in_paragraph(Block::new("paragraph").with_table(TableContent::from_text(&[&["a"]])))]
#[case::inline_in_image(Block::new("image").with_inline(vec![InlineContent::text("x")]))]
#[case::ragged_table(Block::new("table").with_table(TableContent::from_text(&[&["a", "b"], &["c"]])))]
#[case::unknown_style(Block::new("paragraph").with_inline(vec![InlineContent::styled("x", Styles::new().with("blink"))]))]
fn test_structural_errors_fail_fast(#[case] block: Block) {
    let exporter = HtmlExporter::new(Arc::new(Schema::default()));
    let err = exporter
        .export_blocks(&[Block::paragraph("ok"), block], &ExportOptions::external())
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::UnknownBlockType(_)
            | ConversionError::InvalidProp { .. }
            | ConversionError::InvalidStyle { .. }
            | ConversionError::StructuralMismatch { .. }
    ));
}

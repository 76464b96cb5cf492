//! Selection export tests (live document → clipboard payloads)

use crate::common::{item, schema};
use blockdoc_babel::clipboard::{classify, CellRange, ClipboardExporter, ExportGranularity, Selection};
use blockdoc_babel::deps::MarkdownRuntime;
use blockdoc_babel::doc::{blocks_to_doc, find_block_pos, Node};
use blockdoc_babel::formats::html::{ExportOptions, HtmlExporter};
use blockdoc_babel::formats::markdown::MarkdownOptions;
use blockdoc_babel::model::{Block, InlineContent, Styles, TableContent};
use blockdoc_babel::{ConversionError, FormattingDeps};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn exporter() -> ClipboardExporter {
    ClipboardExporter::new(schema(), Arc::new(FormattingDeps::new()), MarkdownOptions::default())
}

fn doc(blocks: &[Block]) -> Node {
    blocks_to_doc(blocks, &schema()).unwrap()
}

fn two_paragraphs() -> Node {
    doc(&[
        Block::paragraph("Hello").with_id("a"),
        Block::paragraph("World").with_id("b"),
    ])
}

fn table(rows: &[&[&str]]) -> Node {
    doc(&[Block::new("table").with_id("t").with_table(TableContent::from_text(rows))])
}

fn cells(doc: &Node, top: usize, left: usize, bottom: usize, right: usize) -> Selection {
    Selection::Cell(CellRange {
        table_pos: find_block_pos(doc, "t").unwrap() + 1,
        top,
        left,
        bottom,
        right,
    })
}

#[test]
fn test_selection_inside_one_block_exports_inline_content() {
    let doc = doc(&[Block::new("paragraph").with_id("p").with_inline(vec![
        InlineContent::text("Hello "),
        InlineContent::styled("World", Styles::new().with("bold")),
    ])]);
    let payload = exporter().export_selection(&doc, &Selection::text(6, 11)).unwrap();
    assert_eq!(payload.external_html, "lo <strong>Wo</strong>");
    assert_eq!(payload.internal_html, "lo <strong>Wo</strong>");
    assert_eq!(payload.markdown, "lo **Wo**\n");
}

#[test]
fn test_backwards_selection_matches_forwards() {
    let doc = two_paragraphs();
    assert_eq!(
        exporter().export_selection(&doc, &Selection::text(7, 4)).unwrap(),
        exporter().export_selection(&doc, &Selection::text(4, 7)).unwrap()
    );
}

#[test]
fn test_empty_selection_exports_nothing() {
    let payload = exporter().export_selection(&two_paragraphs(), &Selection::text(5, 5)).unwrap();
    assert_eq!(payload.external_html, "");
    assert_eq!(payload.markdown, "");
}

#[test]
fn test_node_selection_exports_the_block() {
    let doc = two_paragraphs();
    let pos = find_block_pos(&doc, "b").unwrap();
    let payload = exporter().export_selection(&doc, &Selection::node(pos)).unwrap();
    assert_eq!(payload.external_html, "<p>World</p>");
    assert_eq!(payload.markdown, "World\n");
    assert!(payload.internal_html.contains(r#"data-id="b""#));
    assert!(payload.internal_html.starts_with(r#"<div class="bn-block-group""#));
}

#[test]
fn test_cross_block_selection_cuts_both_ends() {
    let doc = two_paragraphs();
    assert_eq!(
        classify(&doc, &Selection::text(5, 14)).unwrap(),
        ExportGranularity::Blocks
    );
    let payload = exporter().export_selection(&doc, &Selection::text(5, 14)).unwrap();
    assert_eq!(payload.external_html, "<p>llo</p><p>Wo</p>");
    assert_eq!(payload.markdown, "llo\n\nWo\n");
    assert!(payload.internal_html.contains(r#"data-id="a""#));
    assert!(payload.internal_html.contains(r#"data-id="b""#));
}

#[test]
fn test_selection_from_nested_child_to_next_block() {
    let doc = doc(&[
        item("bulletListItem", "Parent")
            .with_id("p")
            .with_children(vec![item("bulletListItem", "Child").with_id("c")]),
        Block::paragraph("After").with_id("a"),
    ]);
    let payload = exporter().export_selection(&doc, &Selection::text(15, 26)).unwrap();
    // The parent's own content lies outside the range, so only the child is exported.
    assert_eq!(payload.external_html, "<ul><li><p>ild</p></li></ul><p>Af</p>");
    assert_eq!(payload.markdown, "*   ild\n\nAf\n");
    assert!(!payload.internal_html.contains(r#"data-id="p""#));
}

#[test]
fn test_cell_selection_exports_table_content() {
    let doc = table(&[&["a", "b"], &["c", "d"]]);
    let selection = cells(&doc, 0, 0, 1, 2);
    assert_eq!(classify(&doc, &selection).unwrap(), ExportGranularity::Table);

    let payload = exporter().export_selection(&doc, &selection).unwrap();
    assert_eq!(
        payload.external_html,
        "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>"
    );
    assert_eq!(payload.markdown, "| a   | b   |\n| --- | --- |\n");
}

#[test]
fn test_cell_selection_keeps_only_selected_columns() {
    let doc = table(&[&["a", "b"], &["c", "d"]]);
    let payload = exporter().export_selection(&doc, &cells(&doc, 0, 1, 2, 2)).unwrap();
    assert_eq!(
        payload.external_html,
        "<table><tbody><tr><td>b</td></tr><tr><td>d</td></tr></tbody></table>"
    );
}

#[test]
fn test_whole_table_selection_is_unwrapped() {
    let rows: &[&[&str]] = &[&["a", "b"], &["c", "d"]];
    let doc = table(rows);
    let payload = exporter().export_selection(&doc, &cells(&doc, 0, 0, 2, 2)).unwrap();
    let expected = HtmlExporter::new(schema())
        .export_table_content(&TableContent::from_text(rows), &ExportOptions::external())
        .unwrap();
    assert_eq!(payload.external_html, expected);
}

#[test]
fn test_selected_content_node_exports_its_block() {
    let doc = doc(&[Block::new("image").with_id("i").with_prop("url", "a.png")]);
    let pos = find_block_pos(&doc, "i").unwrap();
    let payload = exporter().export_selection(&doc, &Selection::node(pos + 1)).unwrap();
    assert_eq!(payload.external_html, r#"<img src="a.png" width="512">"#);
    assert_eq!(payload.markdown, "![](a.png)\n");
}

#[test]
fn test_positions_outside_the_document_are_rejected() {
    let doc = two_paragraphs();
    assert!(matches!(
        exporter().export_selection(&doc, &Selection::text(3, 99)),
        Err(ConversionError::InvalidPosition { .. })
    ));
    assert!(matches!(
        exporter().export_selection(&doc, &Selection::node(99)),
        Err(ConversionError::InvalidPosition { .. })
    ));
}

#[test]
fn test_failed_initialization_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let deps = Arc::new(FormattingDeps::with_initializer(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ConversionError::Initialization("not yet".to_string()))
        } else {
            MarkdownRuntime::load()
        }
    }));
    let exporter = ClipboardExporter::new(schema(), Arc::clone(&deps), MarkdownOptions::default());
    let doc = two_paragraphs();

    assert_eq!(
        exporter.export_selection(&doc, &Selection::text(3, 8)),
        Err(ConversionError::Initialization("not yet".to_string()))
    );
    assert!(!deps.is_initialized());

    let payload = exporter.export_selection(&doc, &Selection::text(3, 8)).unwrap();
    assert_eq!(payload.markdown, "Hello\n");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_payload_entries_follow_clipboard_order() {
    let payload = exporter().export_selection(&two_paragraphs(), &Selection::text(3, 8)).unwrap();
    assert_eq!(
        payload.entries(),
        [
            ("internal-html", "Hello"),
            ("text/html", "Hello"),
            ("text/plain", "Hello\n"),
        ]
    );
}

//! Import tests for Markdown (Markdown → blocks)

use crate::common::{basic_document, h1, import_markdown, item, markdown};
use blockdoc_babel::model::{strip_ids, Block, InlineContent, Link, Styles, TableContent};
use blockdoc_babel::FormatRegistry;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_basic_document() {
    let blocks = import_markdown("# Heading\n\nParagraph\n\n*   Item\n\n1.  Item2\n");
    assert_eq!(
        blocks,
        vec![
            h1("Heading"),
            item("paragraph", "Paragraph"),
            item("bulletListItem", "Item"),
            item("numberedListItem", "Item2"),
        ]
    );
}

#[test]
fn test_exported_markdown_reads_back() {
    let expected = strip_ids(&basic_document());
    let reimported = import_markdown(&markdown(&basic_document()));
    // Importers drop the default heading level.
    assert_eq!(reimported[1..], expected[1..]);
    assert_eq!(reimported[0], h1("Heading"));
}

#[test]
fn test_styles() {
    let blocks = import_markdown("**Bold** *Italic* `code` ~~gone~~\n");
    assert_eq!(
        blocks,
        vec![Block::new("paragraph").with_inline(vec![
            InlineContent::styled("Bold", Styles::new().with("bold")),
            InlineContent::text(" "),
            InlineContent::styled("Italic", Styles::new().with("italic")),
            InlineContent::text(" "),
            InlineContent::styled("code", Styles::new().with("code")),
            InlineContent::text(" "),
            InlineContent::styled("gone", Styles::new().with("strike")),
        ])]
    );
}

#[test]
fn test_links() {
    let blocks = import_markdown("[site](https://example.com)\n");
    assert_eq!(
        blocks[0].inline_content().unwrap(),
        &[InlineContent::Link(Link {
            href: "https://example.com".to_string(),
            content: vec![blockdoc_babel::model::StyledText::plain("site")],
        })]
    );
}

#[test]
fn test_nested_list() {
    let blocks = import_markdown("*   Parent\n\n    *   Child\n");
    assert_eq!(
        blocks,
        vec![item("bulletListItem", "Parent").with_children(vec![item("bulletListItem", "Child")])]
    );
}

#[test]
fn test_task_list() {
    let blocks = import_markdown("- [x] Done\n- [ ] Todo\n");
    assert_eq!(
        blocks,
        vec![
            item("checkListItem", "Done").with_prop("checked", true),
            item("checkListItem", "Todo"),
        ]
    );
}

#[test]
fn test_table() {
    let blocks = import_markdown("| a | b |\n| --- | --- |\n| c |   |\n");
    assert_eq!(
        blocks,
        vec![Block::new("table").with_table(TableContent::from_text(&[&["a", "b"], &["c", ""]]))]
    );
}

#[test]
fn test_headings_keep_their_level() {
    let blocks = import_markdown("### Third\n");
    assert_eq!(blocks, vec![item("heading", "Third").with_prop("level", "3")]);
}

#[test]
fn test_empty_input() {
    assert!(import_markdown("").is_empty());
    assert!(import_markdown("\n\n").is_empty());
}

#[test]
fn test_registry_dispatch_by_extension() {
    let registry = FormatRegistry::default();
    let format = registry.detect_format_from_filename("notes.md").unwrap();
    assert_eq!(format, "markdown");

    let blocks = registry.parse("Hello *there*\n", &format).unwrap();
    let html = registry.serialize(&blocks, "html").unwrap();
    assert_eq!(html, "<p>Hello <em>there</em></p>");
}

#[rstest]
#[case::heading_marker("# Not a heading")]
#[case::ordered_marker("1. not a list")]
#[case::paren_marker("3) nor this")]
#[case::bullet_marker("- nor this")]
#[case::plus_marker("+ or this")]
#[case::quote_marker("> not a quote")]
#[case::rule("***")]
#[case::raw_html("a <b>c</b> &amp; d")]
#[case::emphasis_characters("2*3 [x] ~~y~~ _z_")]
fn test_syntax_in_text_reads_back_as_text(#[case] text: &str) {
    let block = Block::paragraph(text);
    assert_eq!(import_markdown(&markdown(&[block])), vec![item("paragraph", text)]);
}

#[test]
fn test_text_after_a_break_is_not_a_heading() {
    let block = Block::new("paragraph").with_inline(vec![InlineContent::text("one\n# two")]);
    let reimported = import_markdown(&markdown(&[block.clone()]));
    assert_eq!(reimported, vec![block]);
}

#[test]
fn test_link_destinations_with_parentheses_read_back() {
    let block = Block::new("paragraph")
        .with_inline(vec![InlineContent::link("https://e.com/a_(b", "t")]);
    assert_eq!(import_markdown(&markdown(&[block.clone()])), vec![block]);
}

#[test]
fn test_link_destinations_with_spaces_stay_links() {
    let block = Block::new("paragraph")
        .with_inline(vec![InlineContent::link("https://e.com/a_(b) c", "t")]);
    let reimported = import_markdown(&markdown(&[block]));
    let Some([InlineContent::Link(link)]) = reimported[0].inline_content() else {
        panic!("expected a single link, got {:?}", reimported[0].content);
    };
    assert!(link.href.starts_with("https://e.com/a_(b)"));
    assert_eq!(link.content[0].text, "t");
}

//! Import tests for HTML (HTML → blocks)

use crate::common::{basic_document, external_html, h1, import_html, item, parse_html};
use blockdoc_babel::model::{strip_ids, Block, InlineContent, Link, StyledText, Styles, TableContent};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_basic_document_import() {
    let html = "<h1>Heading</h1><p>Paragraph</p><ul><li><p>Item</p></li></ul><ol><li><p>Item2</p></li></ol>";
    assert_eq!(
        import_html(html),
        vec![
            h1("Heading"),
            Block::paragraph("Paragraph"),
            item("bulletListItem", "Item"),
            item("numberedListItem", "Item2"),
        ]
    );
}

#[test]
fn test_external_export_reimports_up_to_ids() {
    let blocks = basic_document();
    let mut expected = strip_ids(&blocks);
    expected[0] = h1("Heading");
    assert_eq!(import_html(&external_html(&blocks)), expected);
}

#[test]
fn test_style_tags_and_aliases() {
    let html = r#"<p><b>B</b><i>I</i><ins>U</ins><del>S</del><code>C</code><span data-background-color="blue">bg</span></p>"#;
    assert_eq!(
        import_html(html),
        vec![Block::new("paragraph").with_inline(vec![
            InlineContent::styled("B", Styles::new().with("bold")),
            InlineContent::styled("I", Styles::new().with("italic")),
            InlineContent::styled("U", Styles::new().with("underline")),
            InlineContent::styled("S", Styles::new().with("strike")),
            InlineContent::styled("C", Styles::new().with("code")),
            InlineContent::styled("bg", Styles::new().with_value("backgroundColor", "blue")),
        ])]
    );
}

#[test]
fn test_links_keep_their_runs() {
    let html = r#"<p>see <a href="https://example.com">the <strong>docs</strong></a></p>"#;
    assert_eq!(
        import_html(html),
        vec![Block::new("paragraph").with_inline(vec![
            InlineContent::text("see "),
            InlineContent::Link(Link {
                href: "https://example.com".to_string(),
                content: vec![
                    StyledText::plain("the "),
                    StyledText::new("docs", Styles::new().with("bold")),
                ],
            }),
        ])]
    );
}

#[test]
fn test_nested_bullet_lists() {
    let html = "<ul><li><p>Parent</p><ul><li><p>Child</p><ol><li><p>Grandchild</p></li></ol></li></ul></li><li><p>Sibling</p></li></ul>";
    assert_eq!(
        import_html(html),
        vec![
            item("bulletListItem", "Parent").with_children(vec![item("bulletListItem", "Child")
                .with_children(vec![item("numberedListItem", "Grandchild")])]),
            item("bulletListItem", "Sibling"),
        ]
    );
}

#[test]
fn test_nested_lists_without_paragraphs() {
    let html = "<ol><li>One<ul><li>Inner</li></ul></li><li>Two</li></ol>";
    assert_eq!(
        import_html(html),
        vec![
            item("numberedListItem", "One").with_children(vec![item("bulletListItem", "Inner")]),
            item("numberedListItem", "Two"),
        ]
    );
}

#[test]
fn test_nested_export_round_trips_externally() {
    let blocks = vec![
        item("bulletListItem", "Parent").with_children(vec![
            item("numberedListItem", "First"),
            item("checkListItem", "Task").with_prop("checked", true),
        ]),
        Block::paragraph("Text").with_children(vec![Block::paragraph("Indented")]),
    ];
    assert_eq!(import_html(&external_html(&blocks)), blocks);
}

#[test]
fn test_check_list_items() {
    let html = r#"<ul><li><input type="checkbox" checked><p>Done</p></li><li><p><input type="checkbox"> Todo</p></li></ul>"#;
    assert_eq!(
        import_html(html),
        vec![
            item("checkListItem", "Done").with_prop("checked", true),
            item("checkListItem", "Todo"),
        ]
    );
}

#[rstest]
#[case::bare(r#"<img src="a.png" alt="Alt">"#, Block::new("image").with_prop("url", "a.png").with_prop("caption", "Alt"))]
#[case::in_paragraph(r#"<p><img src="a.png" width="300"></p>"#, Block::new("image").with_prop("url", "a.png").with_prop("previewWidth", 300_i64))]
#[case::figure(
    r#"<figure><img src="a.png" alt="Alt"><figcaption>Caption</figcaption></figure>"#,
    Block::new("image").with_prop("url", "a.png").with_prop("caption", "Caption")
)]
fn test_images(#[case] html: &str, #[case] expected: Block) {
    assert_eq!(import_html(html), vec![expected]);
}

#[test]
fn test_tables_are_padded() {
    let html = "<table><thead><tr><th>h1</th><th>h2</th></tr></thead><tbody><tr><td>a</td></tr></tbody></table>";
    assert_eq!(
        import_html(html),
        vec![Block::new("table").with_table(TableContent::from_text(&[&["h1", "h2"], &["a", ""]]))]
    );
}

#[rstest]
#[case::blockquote("<blockquote>Quoted</blockquote>", "Quoted")]
#[case::unknown_tag("<custom-thing>Inside</custom-thing>", "Inside")]
#[case::pre("<pre>code here</pre>", "code here")]
#[case::stray_text("Just text", "Just text")]
fn test_unrecognized_markup_degrades_to_paragraphs(#[case] html: &str, #[case] text: &str) {
    assert_eq!(import_html(html), vec![Block::paragraph(text)]);
}

#[test]
fn test_data_attributes_restore_props() {
    let html = r#"<h2 data-text-color="red" data-background-color="blue">T</h2>"#;
    assert_eq!(
        import_html(html),
        vec![Block::heading(2, "T")
            .with_prop("textColor", "red")
            .with_prop("backgroundColor", "blue")]
    );
}

#[test]
fn test_scripts_and_styles_are_ignored() {
    let html = "<style>p { color: red }</style><script>alert(1)</script><p>Kept</p>";
    assert_eq!(import_html(html), vec![Block::paragraph("Kept")]);
}

#[test]
fn test_import_never_fails_on_garbage() {
    let blocks = parse_html("<<p>>unclosed <b>bold <ul><li>item");
    assert!(!blocks.is_empty());
}

#[test]
fn test_empty_input() {
    assert!(parse_html("").is_empty());
    assert!(parse_html("   \n ").is_empty());
}

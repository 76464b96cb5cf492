//! Internal HTML round trip: parse(export(blocks, internal)) == blocks, ids included.

use crate::common::{internal_html, item, parse_html, schema};
use blockdoc_babel::formats::html::{ExportOptions, HtmlExporter};
use blockdoc_babel::model::{
    merge_adjacent, Block, BlockId, InlineContent, Link, StyledText, Styles, TableContent, TableRow,
};
use blockdoc_babel::ConversionError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const BLOCK_TYPES: &[&str] = &["paragraph", "heading", "bulletListItem", "numberedListItem", "checkListItem"];
const TOGGLES: &[&str] = &["bold", "italic", "underline", "strike", "code"];

fn styled_text() -> impl Strategy<Value = StyledText> {
    (
        r#"[a-zA-Z0-9<>&"'.,!?*_#é]{1,6}( [a-z<&]{1,6})?"#,
        prop::collection::btree_set(prop::sample::select(TOGGLES), 0..3),
        prop::option::of(prop::sample::select(&["red", "blue"][..])),
    )
        .prop_map(|(text, toggles, color)| {
            let mut styles = Styles::new();
            for toggle in toggles {
                styles = styles.with(toggle);
            }
            if let Some(color) = color {
                styles = styles.with_value("textColor", color);
            }
            StyledText::new(text, styles)
        })
}

fn inline() -> impl Strategy<Value = InlineContent> {
    prop_oneof![
        3 => styled_text().prop_map(InlineContent::Text),
        1 => (
            "https://e\\.com/[a-z_()]{0,5}",
            prop::collection::vec(styled_text(), 1..3),
        )
            .prop_map(|(href, content)| InlineContent::Link(Link { href, content })),
    ]
}

fn table() -> impl Strategy<Value = Block> {
    (1usize..4, 1usize..4)
        .prop_flat_map(|(height, width)| {
            prop::collection::vec(
                prop::collection::vec(prop::collection::vec(inline(), 0..2), width),
                height,
            )
        })
        .prop_map(|rows| {
            let rows = rows
                .into_iter()
                .map(|cells| TableRow {
                    cells: cells.into_iter().map(merge_adjacent).collect(),
                })
                .collect();
            Block::new("table").with_table(TableContent::new(rows))
        })
}

fn leaf() -> impl Strategy<Value = Block> {
    (
        prop::sample::select(BLOCK_TYPES),
        prop::collection::vec(inline(), 0..4),
        2u8..=6,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(block_type, runs, level, flag, colored)| {
            let mut block = Block::new(block_type).with_inline(merge_adjacent(runs));
            match block_type {
                "heading" if flag => block = block.with_prop("level", level.to_string()),
                "checkListItem" if flag => block = block.with_prop("checked", true),
                _ => {}
            }
            if colored {
                block = block.with_prop("backgroundColor", "yellow");
            }
            block
        })
}

fn tree() -> impl Strategy<Value = Vec<Block>> {
    let block = leaf().prop_recursive(3, 24, 3, |inner| {
        (leaf(), prop::collection::vec(inner, 0..3))
            .prop_map(|(block, children)| block.with_children(children))
    });
    let top = prop_oneof![4 => block, 1 => table()];
    prop::collection::vec(top, 1..5).prop_map(|mut blocks| {
        let mut next = 0;
        number(&mut blocks, &mut next);
        blocks
    })
}

fn number(blocks: &mut [Block], next: &mut usize) {
    for block in blocks {
        *next += 1;
        block.id = BlockId(format!("id-{next}"));
        number(&mut block.children, next);
    }
}

proptest! {
    #[test]
    fn internal_html_round_trips(blocks in tree()) {
        let html = internal_html(&blocks);
        prop_assert_eq!(parse_html(&html), blocks);
    }
}

#[test]
fn test_whitespace_survives_internal_html() {
    let blocks = vec![Block::paragraph("  spaced   out  ").with_id("p")];
    assert_eq!(parse_html(&internal_html(&blocks)), blocks);
}

#[test]
fn test_images_and_tables_round_trip() {
    let blocks = vec![
        Block::new("image")
            .with_id("img")
            .with_prop("url", "https://example.com/a.png")
            .with_prop("caption", "A caption")
            .with_prop("previewWidth", 200_i64)
            .with_prop("textAlignment", "right"),
        Block::new("table")
            .with_id("tbl")
            .with_prop("textColor", "red")
            .with_table(TableContent::from_text(&[&["a", "b"], &["", "d"]])),
    ];
    assert_eq!(parse_html(&internal_html(&blocks)), blocks);
}

#[test]
fn test_hard_breaks_round_trip() {
    let blocks = vec![item("paragraph", "one\ntwo").with_id("p")];
    assert_eq!(parse_html(&internal_html(&blocks)), blocks);
}

#[test]
fn test_blocks_must_carry_their_declared_content() {
    let err = HtmlExporter::new(schema())
        .export_blocks(&[Block::new("paragraph").with_id("p")], &ExportOptions::internal())
        .unwrap_err();
    assert!(matches!(err, ConversionError::StructuralMismatch { .. }));

    let blocks = vec![Block::new("paragraph").with_id("p").with_inline(vec![])];
    assert_eq!(parse_html(&internal_html(&blocks)), blocks);
}

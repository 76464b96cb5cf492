//! Built-in block types and their HTML templates.

use super::{
    BlockSchema, BlockSpec, BlockTemplate, ContentKind, ListContainer, ParsedBlock, PropSchema,
    PropSpec,
};
use crate::error::{ConversionError, Result};
use crate::formats::html::dom;
use crate::formats::html::{ParseContext, RenderContext};
use crate::model::{Block, BlockContent, InlineContent, TableContent};
use markup5ever_rcdom::Handle;

pub const HEADING_LEVELS: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

/// Registers paragraph, heading, the three list item kinds, image and table.
pub fn builtin_blocks() -> BlockSchema {
    let mut schema = BlockSchema::new();
    schema.register(BlockSpec::new(
        "heading",
        ContentKind::Inline,
        PropSchema::defaults_with(vec![PropSpec::new("level", "1").one_of(&HEADING_LEVELS)]),
        HeadingTemplate,
    ));
    schema.register(BlockSpec::new(
        "bulletListItem",
        ContentKind::Inline,
        PropSchema::defaults_with(vec![]),
        ListItemTemplate(ListContainer::Unordered),
    ));
    schema.register(BlockSpec::new(
        "numberedListItem",
        ContentKind::Inline,
        PropSchema::defaults_with(vec![]),
        ListItemTemplate(ListContainer::Ordered),
    ));
    schema.register(BlockSpec::new(
        "checkListItem",
        ContentKind::Inline,
        PropSchema::defaults_with(vec![PropSpec::new("checked", false)]),
        CheckListItemTemplate,
    ));
    // Images come before paragraphs so that `<p><img></p>` is an image.
    schema.register(BlockSpec::new(
        "image",
        ContentKind::None,
        PropSchema::new(vec![
            PropSpec::new("textAlignment", "left").one_of(&["left", "center", "right", "justify"]),
            PropSpec::new("backgroundColor", "default"),
            PropSpec::new("url", ""),
            PropSpec::new("caption", ""),
            PropSpec::new("previewWidth", 512_i64),
        ]),
        ImageTemplate,
    ));
    schema.register(BlockSpec::new(
        "table",
        ContentKind::Table,
        PropSchema::new(vec![
            PropSpec::new("backgroundColor", "default"),
            PropSpec::new("textColor", "default"),
        ]),
        TableTemplate,
    ));
    schema.register(BlockSpec::new(
        "paragraph",
        ContentKind::Inline,
        PropSchema::defaults_with(vec![]),
        ParagraphTemplate,
    ));
    schema
}

fn inline_of(block: &Block) -> &[InlineContent] {
    block.inline_content().unwrap_or(&[])
}

/// `<p>`
pub struct ParagraphTemplate;

impl BlockTemplate for ParagraphTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()> {
        dom::append(parent, ctx.inline_element("p", inline_of(block))?);
        Ok(())
    }

    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        (dom::element_name(element)? == "p").then(|| ParsedBlock::inline(ctx.parse_inline(element)))
    }
}

/// `<h1>` … `<h6>`
pub struct HeadingTemplate;

impl BlockTemplate for HeadingTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()> {
        let level = ctx
            .schema()
            .prop(block, "level")
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|l| HEADING_LEVELS.contains(&l.as_str()))
            .ok_or_else(|| ConversionError::InvalidProp {
                block_type: block.block_type.clone(),
                prop: "level".to_string(),
                reason: "expected \"1\" to \"6\"".to_string(),
            })?;
        dom::append(
            parent,
            ctx.inline_element(&format!("h{level}"), inline_of(block))?,
        );
        Ok(())
    }

    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        let name = dom::element_name(element)?;
        let level = name.strip_prefix('h')?;
        if !HEADING_LEVELS.contains(&level) {
            return None;
        }
        Some(ParsedBlock::inline(ctx.parse_inline(element)).with_prop("level", level))
    }

    fn implied_props(&self) -> &[&'static str] {
        &["level"]
    }
}

/// `<li><p>…</p></li>` inside `<ul>` or `<ol>`.
pub struct ListItemTemplate(pub ListContainer);

impl BlockTemplate for ListItemTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()> {
        dom::append(parent, ctx.inline_element("p", inline_of(block))?);
        Ok(())
    }

    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        if dom::element_name(element)? != "li" || ctx.list() != Some(self.0) {
            return None;
        }
        if ctx.checkbox_state(element).is_some() {
            return None;
        }
        Some(ParsedBlock::inline(ctx.list_item_inline(element)))
    }

    fn list_container(&self) -> Option<ListContainer> {
        Some(self.0)
    }
}

/// `<li><input type="checkbox"><p>…</p></li>` inside `<ul>`.
pub struct CheckListItemTemplate;

impl BlockTemplate for CheckListItemTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()> {
        let checked = ctx
            .schema()
            .prop(block, "checked")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let mut attrs = vec![("type", "checkbox")];
        if checked {
            attrs.push(("checked", ""));
        }
        dom::append(parent, dom::create_element("input", attrs));
        dom::append(parent, ctx.inline_element("p", inline_of(block))?);
        Ok(())
    }

    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        if dom::element_name(element)? != "li" {
            return None;
        }
        let checked = ctx.checkbox_state(element)?;
        Some(ParsedBlock::inline(ctx.list_item_inline(element)).with_prop("checked", checked))
    }

    fn list_container(&self) -> Option<ListContainer> {
        Some(ListContainer::Unordered)
    }

    fn implied_props(&self) -> &[&'static str] {
        &["checked"]
    }
}

/// `<img src alt width>`; also recognized wrapped in `<figure>` or a lone `<p>`.
pub struct ImageTemplate;

impl ImageTemplate {
    fn from_img(img: &Handle, caption: Option<String>) -> ParsedBlock {
        let mut parsed = ParsedBlock {
            props: Default::default(),
            content: BlockContent::None,
        };
        if let Some(src) = dom::attr(img, "src") {
            parsed = parsed.with_prop("url", src);
        }
        if let Some(caption) = caption.or_else(|| dom::attr(img, "alt")) {
            parsed = parsed.with_prop("caption", caption);
        }
        if let Some(width) = dom::attr(img, "width").and_then(|w| w.trim().parse::<i64>().ok()) {
            parsed = parsed.with_prop("previewWidth", width);
        }
        parsed
    }
}

impl BlockTemplate for ImageTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()> {
        let url = prop_text(ctx, block, "url");
        let caption = prop_text(ctx, block, "caption");
        let width = prop_text(ctx, block, "previewWidth");

        let mut attrs = vec![("src", url.as_str())];
        if !caption.is_empty() {
            attrs.push(("alt", caption.as_str()));
        }
        attrs.push(("width", width.as_str()));
        dom::append(parent, dom::create_element("img", attrs));
        Ok(())
    }

    fn parse(&self, element: &Handle, _ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        match dom::element_name(element)?.as_str() {
            "img" => Some(Self::from_img(element, None)),
            "figure" => {
                let img = dom::find_descendant(element, "img")?;
                let caption = dom::find_descendant(element, "figcaption")
                    .map(|c| dom::text_content(&c).trim().to_string())
                    .filter(|c| !c.is_empty());
                Some(Self::from_img(&img, caption))
            }
            "p" => {
                let children = dom::significant_children(element);
                match children.as_slice() {
                    [only] if dom::element_name(only).as_deref() == Some("img") => {
                        Some(Self::from_img(only, None))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn implied_props(&self) -> &[&'static str] {
        &["url", "caption", "previewWidth"]
    }
}

fn prop_text(ctx: &RenderContext<'_>, block: &Block, name: &str) -> String {
    ctx.schema()
        .prop(block, name)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// `<table>`
pub struct TableTemplate;

impl BlockTemplate for TableTemplate {
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()> {
        let empty = TableContent::default();
        let table = match &block.content {
            BlockContent::Table(table) => table,
            _ => &empty,
        };
        dom::append(parent, ctx.table_element(table)?);
        Ok(())
    }

    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock> {
        (dom::element_name(element)? == "table").then(|| ParsedBlock {
            props: Default::default(),
            content: BlockContent::Table(ctx.parse_table(element)),
        })
    }
}

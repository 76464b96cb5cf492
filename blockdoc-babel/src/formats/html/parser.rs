//! HTML parsing (HTML → blocks import)
//!
//! Import is total: markup no template recognizes degrades to paragraphs and
//! never fails. Internal markup (the editor's own wrapper divs) is rebuilt
//! exactly; anything else goes through the block templates in registration
//! order.

use super::context::{split_list_item, ParseContext};
use super::dom;
use crate::error::Result;
use crate::model::{Block, BlockContent, BlockId, IdGenerator, PropValue, Props};
use crate::schema::{BlockSpec, ContentKind, ListContainer, ParsedBlock, Schema};
use log::{debug, trace, warn};
use markup5ever_rcdom::{Handle, NodeData};
use std::sync::Arc;

/// Generic containers that never become blocks of their own.
const TRANSPARENT_TAGS: &[&str] = &[
    "address", "article", "aside", "body", "details", "div", "fieldset", "footer", "form",
    "header", "html", "main", "nav", "section", "tbody", "thead", "tfoot",
];

pub struct HtmlImporter {
    schema: Arc<Schema>,
    ids: Box<dyn IdGenerator>,
}

impl HtmlImporter {
    pub fn new(schema: Arc<Schema>, ids: Box<dyn IdGenerator>) -> Self {
        Self { schema, ids }
    }

    pub fn parse_html(&mut self, html: &str) -> Result<Vec<Block>> {
        let body = dom::parse_body(html);
        let mut walker = Walker {
            schema: &self.schema,
            ids: self.ids.as_mut(),
        };
        let ctx = ParseContext::new(walker.schema, true);
        let blocks = walker.parse_blocks(&dom::children(&body), ctx);
        debug!("imported {} top-level block(s) from HTML", blocks.len());
        Ok(blocks)
    }
}

struct Walker<'a> {
    schema: &'a Schema,
    ids: &'a mut dyn IdGenerator,
}

impl<'a> Walker<'a> {
    fn parse_blocks(&mut self, nodes: &[Handle], ctx: ParseContext<'a>) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut pending: Vec<Handle> = Vec::new();

        for node in nodes {
            match &node.data {
                NodeData::Text { .. } => pending.push(node.clone()),
                NodeData::Element { .. } if dom::is_skipped_element(node) => {}
                NodeData::Element { .. } if !dom::is_block_element(node) => {
                    pending.push(node.clone())
                }
                NodeData::Element { .. } => {
                    self.flush_inline(&mut pending, &mut blocks, ctx);
                    self.parse_element(node, ctx, &mut blocks);
                }
                _ => {}
            }
        }
        self.flush_inline(&mut pending, &mut blocks, ctx);
        blocks
    }

    /// Stray inline content at block level becomes a paragraph.
    fn flush_inline(&mut self, pending: &mut Vec<Handle>, blocks: &mut Vec<Block>, ctx: ParseContext<'a>) {
        if pending.is_empty() {
            return;
        }
        let nodes = std::mem::take(pending);
        let whitespace_only = nodes
            .iter()
            .all(|n| dom::text(n).is_some_and(|t| t.trim().is_empty()));
        if whitespace_only {
            return;
        }
        let content = ctx.parse_inline_nodes(&nodes);
        if !content.is_empty() {
            blocks.push(self.paragraph(content));
        }
    }

    fn parse_element(&mut self, element: &Handle, ctx: ParseContext<'a>, blocks: &mut Vec<Block>) {
        let Some(tag) = dom::element_name(element) else {
            return;
        };
        let node_type = dom::attr(element, "data-node-type");

        match node_type.as_deref() {
            Some("blockContainer") => {
                blocks.extend(self.parse_internal_container(element));
                return;
            }
            Some("blockGroup") => {
                let children = dom::element_children(element);
                let internal = children
                    .iter()
                    .any(|c| dom::attr(c, "data-node-type").as_deref() == Some("blockContainer"));
                let parsed = self.parse_blocks(&dom::children(element), ctx.outside_list());
                match blocks.last_mut() {
                    Some(previous) if !internal => previous.children.extend(parsed),
                    _ => blocks.extend(parsed),
                }
                return;
            }
            _ => {}
        }

        if let Some(list) = ListContainer::from_tag(&tag) {
            let list_ctx = ctx.in_list(list);
            for child in dom::children(element) {
                if dom::is_element(&child, "li") {
                    blocks.push(self.parse_list_item(&child, list_ctx));
                } else {
                    blocks.extend(self.parse_blocks(&[child], ctx.outside_list()));
                }
            }
            return;
        }
        if tag == "li" {
            let list = ctx.list().unwrap_or(ListContainer::Unordered);
            blocks.push(self.parse_list_item(element, ctx.in_list(list)));
            return;
        }

        let schema = self.schema;
        let block_ctx = ctx.outside_list();
        for spec in schema.blocks.iter() {
            if let Some(parsed) = spec.template.parse(element, &block_ctx) {
                trace!("<{tag}> parsed as {}", spec.type_name);
                blocks.push(self.build_block(spec, parsed, element));
                return;
            }
        }

        let has_blocks = dom::children(element).iter().any(dom::is_block_element);
        if TRANSPARENT_TAGS.contains(&tag.as_str()) || has_blocks {
            blocks.extend(self.parse_blocks(&dom::children(element), block_ctx));
            return;
        }

        let content = block_ctx.parse_inline(element);
        if content.is_empty() {
            debug!("dropping empty <{tag}>");
            return;
        }
        warn!("no block type matches <{tag}>, importing it as a paragraph");
        blocks.push(self.paragraph(content));
    }

    fn parse_list_item(&mut self, item: &Handle, ctx: ParseContext<'a>) -> Block {
        let schema = self.schema;
        let recognized = schema
            .blocks
            .iter()
            .find_map(|spec| spec.template.parse(item, &ctx).map(|parsed| (spec, parsed)));

        let mut block = match recognized {
            Some((spec, parsed)) => self.build_block(spec, parsed, item),
            None => {
                warn!("no list item type matches this <li>, importing it as a paragraph");
                self.paragraph(ctx.list_item_inline(item))
            }
        };

        let (_, rest) = split_list_item(item);
        block.children = self.parse_blocks(&rest, ctx.outside_list());
        block
    }

    fn build_block(&mut self, spec: &BlockSpec, parsed: ParsedBlock, element: &Handle) -> Block {
        let mut props = Props::new();
        for (name, value) in parsed.props {
            self.insert_checked_prop(spec, &mut props, &name, value);
        }
        self.read_data_props(spec, element, &mut props);

        let mut block = Block::new(spec.type_name.as_str());
        block.id = self.ids.next_id();
        block.props = props;
        block.content = match spec.content {
            ContentKind::None => BlockContent::None,
            _ => parsed.content,
        };
        self.schema.normalize_props(&mut block);
        block
    }

    /// Props carried as `data-*` attributes, for those not already set.
    fn read_data_props(&self, spec: &BlockSpec, element: &Handle, props: &mut Props) {
        for prop in spec.props.iter() {
            if props.contains_key(&prop.name) {
                continue;
            }
            let Some(raw) = dom::attr(element, &prop.attribute_name()) else {
                continue;
            };
            match PropValue::parse_like(&prop.default, &raw) {
                Some(value) => self.insert_checked_prop(spec, props, &prop.name, value),
                None => warn!(
                    "ignoring {}={raw:?} on {}: not a valid value",
                    prop.attribute_name(),
                    spec.type_name
                ),
            }
        }
    }

    fn insert_checked_prop(&self, spec: &BlockSpec, props: &mut Props, name: &str, value: PropValue) {
        let Some(prop) = spec.props.get(name) else {
            warn!("ignoring undeclared prop {name} on {}", spec.type_name);
            return;
        };
        match prop.check(&value) {
            Ok(()) => {
                props.insert(name.to_string(), value);
            }
            Err(reason) => warn!("ignoring prop {name} on {}: {reason}", spec.type_name),
        }
    }

    /// Rebuilds a block from the editor's own container markup.
    fn parse_internal_container(&mut self, container: &Handle) -> Vec<Block> {
        let children = dom::element_children(container);
        let content = children.iter().find(|c| dom::has_attr(c, "data-content-type"));
        let group = children
            .iter()
            .find(|c| dom::attr(c, "data-node-type").as_deref() == Some("blockGroup"));

        let ctx = ParseContext::new(self.schema, true);
        let nested = match group {
            Some(group) => self.parse_blocks(&dom::children(group), ctx),
            None => Vec::new(),
        };

        let Some(content) = content else {
            warn!("block container without content, keeping its children only");
            return nested;
        };

        let id = dom::attr(container, "data-id")
            .filter(|id| !id.is_empty())
            .map(BlockId::from)
            .unwrap_or_else(|| self.ids.next_id());
        let block_type = dom::attr(content, "data-content-type").unwrap_or_default();

        let schema = self.schema;
        let Some(spec) = schema.blocks.find(&block_type) else {
            warn!("unknown block type {block_type:?}, importing it as a paragraph");
            let mut block = self.paragraph(ctx.parse_inline(content));
            block.id = id;
            block.children = nested;
            return vec![block];
        };

        let verbatim = ParseContext::new(self.schema, false);
        let block_content = match spec.content {
            ContentKind::Inline => BlockContent::Inline(
                dom::element_children(content)
                    .into_iter()
                    .find(|c| !dom::is_element(c, "input"))
                    .map(|inline| verbatim.parse_inline(&inline))
                    .unwrap_or_default(),
            ),
            ContentKind::Table => BlockContent::Table(
                dom::find_descendant(content, "table")
                    .map(|table| verbatim.parse_table(&table))
                    .unwrap_or_default(),
            ),
            ContentKind::None => BlockContent::None,
        };

        let mut props = Props::new();
        self.read_data_props(spec, content, &mut props);

        let mut block = Block::new(spec.type_name.as_str());
        block.id = id;
        block.props = props;
        block.content = block_content;
        block.children = nested;
        self.schema.normalize_props(&mut block);
        vec![block]
    }

    fn paragraph(&mut self, content: Vec<crate::model::InlineContent>) -> Block {
        Block::new("paragraph")
            .with_id(self.ids.next_id())
            .with_inline(content)
    }
}

//! HTML serialization (blocks → HTML export)
//!
//! Pipeline: validate against the schema → build an rcdom tree through the
//! block templates → serialize with html5ever.

use super::context::RenderContext;
use super::dom;
use crate::error::Result;
use crate::model::{Block, InlineContent, TableContent};
use crate::schema::Schema;
use log::debug;
use markup5ever_rcdom::Handle;
use std::sync::Arc;

/// Options for HTML serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Emit semantic tags only, without the editor's wrapper markup.
    pub simplify_blocks: bool,
}

impl ExportOptions {
    pub fn external() -> Self {
        Self {
            simplify_blocks: true,
        }
    }

    pub fn internal() -> Self {
        Self {
            simplify_blocks: false,
        }
    }
}

/// Renders blocks, inline content and tables to HTML.
#[derive(Debug, Clone)]
pub struct HtmlExporter {
    schema: Arc<Schema>,
}

impl HtmlExporter {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn export_blocks(&self, blocks: &[Block], options: &ExportOptions) -> Result<String> {
        self.schema.validate_blocks(blocks)?;
        debug!(
            "exporting {} block(s), simplify_blocks={}",
            blocks.len(),
            options.simplify_blocks
        );

        let root = dom::create_element("div", vec![]);
        if options.simplify_blocks {
            let ctx = RenderContext::new(&self.schema, false);
            self.render_sequence(&root, blocks, &ctx)?;
        } else {
            let ctx = RenderContext::new(&self.schema, true);
            if !blocks.is_empty() {
                self.render_group(&root, blocks, &ctx)?;
            }
        }
        dom::serialize_children(&root)
    }

    /// Inline content alone, without any block element around it.
    pub fn export_inline_content(
        &self,
        content: &[InlineContent],
        _options: &ExportOptions,
    ) -> Result<String> {
        let root = dom::create_element("div", vec![]);
        RenderContext::new(&self.schema, false).render_inline(&root, content)?;
        dom::serialize_children(&root)
    }

    /// A bare `<table>` for the given rows.
    pub fn export_table_content(
        &self,
        table: &TableContent,
        _options: &ExportOptions,
    ) -> Result<String> {
        let root = dom::create_element("div", vec![]);
        let ctx = RenderContext::new(&self.schema, false);
        dom::append(&root, ctx.table_element(table)?);
        dom::serialize_children(&root)
    }

    /// External rendering of siblings: list items are grouped into lists.
    fn render_sequence(&self, parent: &Handle, blocks: &[Block], ctx: &RenderContext<'_>) -> Result<()> {
        let mut i = 0;
        while i < blocks.len() {
            let spec = self.schema.block(&blocks[i].block_type)?;
            let Some(container) = spec.template.list_container() else {
                self.render_external_block(parent, &blocks[i], ctx)?;
                i += 1;
                continue;
            };

            let list = dom::create_element(container.tag(), vec![]);
            while i < blocks.len() {
                let item = &blocks[i];
                let spec = self.schema.block(&item.block_type)?;
                if spec.template.list_container() != Some(container) {
                    break;
                }
                let li = dom::create_element("li", vec![]);
                self.set_data_attributes(&li, item, spec.template.implied_props());
                spec.template.render(item, &li, ctx)?;
                self.render_sequence(&li, &item.children, ctx)?;
                dom::append(&list, li);
                i += 1;
            }
            dom::append(parent, list);
        }
        Ok(())
    }

    fn render_external_block(&self, parent: &Handle, block: &Block, ctx: &RenderContext<'_>) -> Result<()> {
        let spec = self.schema.block(&block.block_type)?;
        let scratch = dom::create_element("div", vec![]);
        spec.template.render(block, &scratch, ctx)?;
        if let Some(first) = dom::element_children(&scratch).first() {
            self.set_data_attributes(first, block, spec.template.implied_props());
        }
        dom::move_children(&scratch, parent);

        if !block.children.is_empty() {
            let group = dom::create_element("div", vec![("data-node-type", "blockGroup")]);
            self.render_sequence(&group, &block.children, ctx)?;
            dom::append(parent, group);
        }
        Ok(())
    }

    fn set_data_attributes(&self, element: &Handle, block: &Block, implied: &[&str]) {
        for (spec, value) in self.schema.explicit_props(block) {
            if !implied.contains(&spec.name.as_str()) {
                dom::set_attr(element, &spec.attribute_name(), &value.to_string());
            }
        }
    }

    /// Internal rendering: group → container → content (+ nested group).
    fn render_group(&self, parent: &Handle, blocks: &[Block], ctx: &RenderContext<'_>) -> Result<()> {
        let group = dom::create_element(
            "div",
            vec![("class", "bn-block-group"), ("data-node-type", "blockGroup")],
        );
        for block in blocks {
            self.render_container(&group, block, ctx)?;
        }
        dom::append(parent, group);
        Ok(())
    }

    fn render_container(&self, parent: &Handle, block: &Block, ctx: &RenderContext<'_>) -> Result<()> {
        let spec = self.schema.block(&block.block_type)?;
        let mut attrs = vec![("class", "bn-block"), ("data-node-type", "blockContainer")];
        if !block.id.is_empty() {
            attrs.push(("data-id", block.id.as_str()));
        }
        let container = dom::create_element("div", attrs);

        let content = dom::create_element(
            "div",
            vec![
                ("class", "bn-block-content"),
                ("data-content-type", block.block_type.as_str()),
            ],
        );
        self.set_data_attributes(&content, block, &[]);
        spec.template.render(block, &content, ctx)?;
        dom::append(&container, content);

        if !block.children.is_empty() {
            self.render_group(&container, &block.children, ctx)?;
        }
        dom::append(parent, container);
        Ok(())
    }
}

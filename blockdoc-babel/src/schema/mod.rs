//! Block Schema Registry
//!
//! The schema is the single place that knows which block types and styles
//! exist. Exporters, importers and the mapper only ever go through it: adding
//! a block type means registering a [`BlockSpec`] with its [`BlockTemplate`],
//! nothing else.

pub mod blocks;
pub mod props;
pub mod styles;

pub use props::{default_props, kebab_case, PropSchema, PropSpec};
pub use styles::{StyleKind, StyleSchema, StyleSpec};

use crate::error::{ConversionError, Result};
use crate::formats::html::{ParseContext, RenderContext};
use crate::model::{Block, BlockContent, InlineContent, PropValue, Props, TableContent};
use markup5ever_rcdom::Handle;
use std::fmt;
use std::sync::Arc;

/// Shape of the content a block type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Inline,
    Table,
    None,
}

/// List element grouping sibling items of a list block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListContainer {
    Unordered,
    Ordered,
}

impl ListContainer {
    pub fn tag(&self) -> &'static str {
        match self {
            ListContainer::Unordered => "ul",
            ListContainer::Ordered => "ol",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ul" => Some(ListContainer::Unordered),
            "ol" => Some(ListContainer::Ordered),
            _ => None,
        }
    }
}

/// What a template recognized in an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub props: Props,
    pub content: BlockContent,
}

impl ParsedBlock {
    pub fn inline(content: Vec<InlineContent>) -> Self {
        Self {
            props: Props::new(),
            content: BlockContent::Inline(content),
        }
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }
}

/// HTML template of a block type: how its own content renders and parses.
///
/// Children are never a template's concern; the exporter and importer thread
/// them through generically.
pub trait BlockTemplate: Send + Sync {
    /// Appends the semantic markup for the block's content to `parent`.
    fn render(&self, block: &Block, parent: &Handle, ctx: &RenderContext<'_>) -> Result<()>;

    /// Recognizes `element` as this block type.
    fn parse(&self, element: &Handle, ctx: &ParseContext<'_>) -> Option<ParsedBlock>;

    /// List element that groups consecutive items of this type.
    fn list_container(&self) -> Option<ListContainer> {
        None
    }

    /// Props the semantic markup already encodes.
    fn implied_props(&self) -> &[&'static str] {
        &[]
    }
}

/// Schema entry of one block type.
#[derive(Clone)]
pub struct BlockSpec {
    pub type_name: String,
    pub content: ContentKind,
    pub props: PropSchema,
    pub template: Arc<dyn BlockTemplate>,
}

impl BlockSpec {
    pub fn new(
        type_name: &str,
        content: ContentKind,
        props: PropSchema,
        template: impl BlockTemplate + 'static,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            content,
            props,
            template: Arc::new(template),
        }
    }
}

impl fmt::Debug for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockSpec")
            .field("type_name", &self.type_name)
            .field("content", &self.content)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// Ordered registry of block types.
#[derive(Debug, Clone, Default)]
pub struct BlockSchema {
    specs: Vec<BlockSpec>,
}

impl BlockSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block type, replacing an entry with the same name in place.
    pub fn register(&mut self, spec: BlockSpec) {
        match self.specs.iter_mut().find(|s| s.type_name == spec.type_name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn get(&self, block_type: &str) -> Result<&BlockSpec> {
        self.find(block_type)
            .ok_or_else(|| ConversionError::UnknownBlockType(block_type.to_string()))
    }

    pub fn find(&self, block_type: &str) -> Option<&BlockSpec> {
        self.specs.iter().find(|s| s.type_name == block_type)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockSpec> {
        self.specs.iter()
    }
}

/// Block and style vocabulary of a document.
#[derive(Debug, Clone)]
pub struct Schema {
    pub blocks: BlockSchema,
    pub styles: StyleSchema,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(blocks::builtin_blocks(), StyleSchema::with_defaults())
    }
}

impl Schema {
    pub fn new(blocks: BlockSchema, styles: StyleSchema) -> Self {
        Self { blocks, styles }
    }

    /// Shorthand for `self.blocks.get`.
    pub fn block(&self, block_type: &str) -> Result<&BlockSpec> {
        self.blocks.get(block_type)
    }

    /// Stored value of a prop, or its declared default.
    pub fn prop(&self, block: &Block, name: &str) -> Option<PropValue> {
        if let Some(value) = block.props.get(name) {
            return Some(value.clone());
        }
        let spec = self.blocks.find(&block.block_type)?;
        spec.props.get(name).map(|p| p.default.clone())
    }

    /// Gives blocks that left out their content the empty content their type
    /// declares, children included. Unknown types are left for validation.
    pub fn fill_missing_content(&self, blocks: &mut [Block]) {
        for block in blocks {
            if block.content == BlockContent::None {
                match self.blocks.find(&block.block_type).map(|spec| spec.content) {
                    Some(ContentKind::Inline) => block.content = BlockContent::Inline(Vec::new()),
                    Some(ContentKind::Table) => {
                        block.content = BlockContent::Table(TableContent::default())
                    }
                    _ => {}
                }
            }
            self.fill_missing_content(&mut block.children);
        }
    }

    /// Drops props that equal their declared default.
    pub fn normalize_props(&self, block: &mut Block) {
        if let Some(spec) = self.blocks.find(&block.block_type) {
            block
                .props
                .retain(|name, value| spec.props.get(name).map_or(true, |p| &p.default != value));
        }
    }

    /// Non-default props of `block`, in schema declaration order.
    pub fn explicit_props<'b>(&self, block: &'b Block) -> Vec<(&PropSpec, &'b PropValue)> {
        let Some(spec) = self.blocks.find(&block.block_type) else {
            return Vec::new();
        };
        spec.props
            .iter()
            .filter_map(|p| {
                block
                    .props
                    .get(&p.name)
                    .filter(|v| **v != p.default)
                    .map(|v| (p, v))
            })
            .collect()
    }

    pub fn validate_blocks(&self, blocks: &[Block]) -> Result<()> {
        blocks.iter().try_for_each(|b| self.validate(b))
    }

    /// Checks a block subtree against the schema.
    pub fn validate(&self, block: &Block) -> Result<()> {
        let spec = self.validate_props(block)?;

        match (spec.content, &block.content) {
            (ContentKind::Inline, BlockContent::Inline(content)) => self.validate_inline(content)?,
            (ContentKind::Table, BlockContent::Table(table)) => {
                self.validate_table(table)
                    .map_err(|e| match e {
                        ConversionError::StructuralMismatch { reason, .. } => {
                            ConversionError::mismatch(&block.block_type, reason)
                        }
                        other => other,
                    })?
            }
            (ContentKind::None, BlockContent::None) => {}
            (expected, found) => {
                return Err(ConversionError::mismatch(
                    &block.block_type,
                    format!(
                        "declared {} content but found {}",
                        content_kind_name(expected),
                        found.kind_name()
                    ),
                ))
            }
        }

        self.validate_blocks(&block.children)
    }

    /// Checks the props of `block` alone, returning its schema entry.
    pub fn validate_props(&self, block: &Block) -> Result<&BlockSpec> {
        let spec = self.block(&block.block_type)?;
        for (name, value) in &block.props {
            let prop = spec
                .props
                .get(name)
                .ok_or_else(|| ConversionError::InvalidProp {
                    block_type: block.block_type.clone(),
                    prop: name.clone(),
                    reason: "not declared for this block type".to_string(),
                })?;
            prop.check(value)
                .map_err(|reason| ConversionError::InvalidProp {
                    block_type: block.block_type.clone(),
                    prop: name.clone(),
                    reason,
                })?;
        }
        Ok(spec)
    }

    pub fn validate_inline(&self, content: &[InlineContent]) -> Result<()> {
        for item in content {
            match item {
                InlineContent::Text(run) => self.styles.validate(&run.styles)?,
                InlineContent::Link(link) => {
                    for run in &link.content {
                        self.styles.validate(&run.styles)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn validate_table(&self, table: &TableContent) -> Result<()> {
        if !table.is_rectangular() {
            return Err(ConversionError::mismatch("table", "rows differ in cell count"));
        }
        for row in &table.rows {
            for cell in &row.cells {
                self.validate_inline(cell)?;
            }
        }
        Ok(())
    }
}

fn content_kind_name(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Inline => "inline",
        ContentKind::Table => "table",
        ContentKind::None => "no",
    }
}

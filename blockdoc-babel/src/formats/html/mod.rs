//! HTML format implementation
//!
//! Two HTML dialects share one exporter and one importer:
//!
//! - **Internal HTML** keeps the editor's wrapper markup (block groups,
//!   containers with ids, content wrappers with `data-*` props) and
//!   re-imports to an identical tree, ids included.
//! - **External HTML** is plain semantic markup for other applications. List
//!   items are grouped into `<ul>`/`<ol>`, props that differ from the default
//!   are kept as `data-*` attributes, ids are dropped.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` pair for both directions:
//! the same browser-grade parser reads pasted markup, and the same rcdom
//! tree is built and serialized on export.
//!
//! # Element Mapping Table
//!
//! | Block            | External HTML                               | Import Notes                                   |
//! |------------------|---------------------------------------------|------------------------------------------------|
//! | paragraph        | `<p>`                                       | Fallback for anything unrecognized             |
//! | heading          | `<h1>`..`<h6>`                              | Level from the tag                             |
//! | bulletListItem   | `<ul><li><p>..</p></li></ul>`               | `<li>` in `<ul>` without a checkbox            |
//! | numberedListItem | `<ol><li><p>..</p></li></ol>`               | `<li>` in `<ol>`                               |
//! | checkListItem    | `<ul><li><input type="checkbox"><p>`        | `<li>` holding a checkbox                      |
//! | image            | `<img src alt width>`                       | `<img>`, `<figure>`, lone image paragraphs     |
//! | table            | `<table><tbody><tr><td>`                    | `<th>` read as cells, ragged rows padded       |
//! | Children         | `<div data-node-type="blockGroup">`         | Nested lists become children of their item     |
//! | Inline styles:   |                                             |                                                |
//! |   bold           | `<strong>`                                  | `<strong>`, `<b>`                              |
//! |   italic         | `<em>`                                      | `<em>`, `<i>`                                  |
//! |   underline      | `<u>`                                       | `<u>`, `<ins>`                                 |
//! |   strike         | `<s>`                                       | `<s>`, `<del>`, `<strike>`                     |
//! |   code           | `<code>`                                    | Direct                                         |
//! |   textColor      | `<span data-text-color>`                    | Direct                                         |
//! |   backgroundColor| `<span data-background-color>`              | Direct                                         |
//! |   link           | `<a href>`                                  | Direct                                         |
//! |   line break     | `<br>`                                      | `\n` in the run text                           |
//!
//! Children of a list item nest inside its `<li>`. Children of any other
//! block follow it as a sibling `<div data-node-type="blockGroup">`, so a
//! paragraph with one child exports as
//! `<p>Parent</p><div data-node-type="blockGroup"><p>Child</p></div>`
//! rather than as two flat paragraphs. Consumers that do not know the
//! wrapper see an ordinary `<div>`; the importer reads it back as children.

mod context;
pub mod dom;
pub mod parser;
pub mod serializer;

pub use context::{ParseContext, RenderContext, INLINE_CONTENT_CLASS};
pub(crate) use context::{collect_rows, find_checkbox, split_list_item};
pub use parser::HtmlImporter;
pub use serializer::{ExportOptions, HtmlExporter};

use crate::error::ConversionError;
use crate::format::Format;
use crate::formats::FormatSettings;
use crate::model::{Block, IdStrategy};
use crate::schema::Schema;
use std::collections::HashMap;
use std::sync::Arc;

/// Reads the `simplify-blocks` serialization option.
fn simplify_option(options: &HashMap<String, String>, default: bool) -> Result<bool, ConversionError> {
    match options.get("simplify-blocks").map(String::as_str) {
        None => Ok(default),
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some("false") | Some("no") | Some("0") => Ok(false),
        Some(other) => Err(ConversionError::NotSupported(format!(
            "simplify-blocks expects true or false, got '{other}'"
        ))),
    }
}

fn reject_unknown(name: &str, options: &HashMap<String, String>) -> Result<(), ConversionError> {
    match options.keys().find(|k| k.as_str() != "simplify-blocks") {
        Some(key) => Err(ConversionError::NotSupported(format!(
            "Format '{name}' does not support option '{key}'"
        ))),
        None => Ok(()),
    }
}

/// External (semantic) HTML.
pub struct HtmlFormat {
    schema: Arc<Schema>,
    ids: IdStrategy,
    simplify_blocks: bool,
}

impl HtmlFormat {
    pub fn new(settings: &FormatSettings) -> Self {
        Self {
            schema: Arc::clone(&settings.schema),
            ids: settings.ids,
            simplify_blocks: settings.simplify_blocks,
        }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Semantic HTML for other applications"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Block>, ConversionError> {
        HtmlImporter::new(Arc::clone(&self.schema), self.ids.generator()).parse_html(source)
    }

    fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError> {
        self.serialize_with_options(blocks, &HashMap::new())
    }

    fn serialize_with_options(
        &self,
        blocks: &[Block],
        options: &HashMap<String, String>,
    ) -> Result<String, ConversionError> {
        reject_unknown(self.name(), options)?;
        let simplify_blocks = simplify_option(options, self.simplify_blocks)?;
        HtmlExporter::new(Arc::clone(&self.schema))
            .export_blocks(blocks, &ExportOptions { simplify_blocks })
    }
}

/// The editor's own HTML, wrapper markup and ids included.
pub struct BlocknoteHtmlFormat {
    schema: Arc<Schema>,
    ids: IdStrategy,
}

impl BlocknoteHtmlFormat {
    pub fn new(settings: &FormatSettings) -> Self {
        Self {
            schema: Arc::clone(&settings.schema),
            ids: settings.ids,
        }
    }
}

impl Format for BlocknoteHtmlFormat {
    fn name(&self) -> &str {
        "blocknote-html"
    }

    fn description(&self) -> &str {
        "Editor-internal HTML that round-trips block ids"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Block>, ConversionError> {
        HtmlImporter::new(Arc::clone(&self.schema), self.ids.generator()).parse_html(source)
    }

    fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError> {
        HtmlExporter::new(Arc::clone(&self.schema)).export_blocks(blocks, &ExportOptions::internal())
    }
}

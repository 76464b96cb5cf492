//! Markdown format implementation
//!
//! Markdown is never converted to or from blocks directly. Export goes
//! blocks → external HTML → Markdown; import goes Markdown → HTML (comrak)
//! → blocks. Both directions reuse the HTML layer, so the Markdown side only
//! deals with the projection between HTML and Markdown text.
//!
//! # Element Mapping Table
//!
//! | Block            | Markdown                     | Export Notes                         | Import Notes                          |
//! |------------------|------------------------------|--------------------------------------|---------------------------------------|
//! | paragraph        | Paragraph                    | Direct                               | Direct                                |
//! | heading          | `#`..`######`                | Level → number of `#`                | Direct                                |
//! | bulletListItem   | `*   item`                   | Content indented to column 4         | `-`, `+` and `*` all accepted          |
//! | numberedListItem | `1.  item`                   | Numbered from the list start         | Start number not kept                 |
//! | checkListItem    | `*   [x] item`               | Task box after the marker            | GFM task list extension               |
//! | image            | `![caption](url)`            | Caption (or alt) as alt text         | Lone image paragraph → image          |
//! | table            | GFM pipe table               | First row is the header              | GFM table extension                   |
//! | Children         | Nested list / following text | Indented under list items            | Nested lists become children          |
//! | Inline styles:   |                              |                                      |                                       |
//! |   bold           | `**bold**`                   |                                      | `**` and `__`                         |
//! |   italic         | `*italic*`                   |                                      | `*` and `_`                           |
//! |   strike         | `~~strike~~`                 |                                      | GFM strikethrough                     |
//! |   code           | `` `code` ``                 |                                      | Direct                                |
//! |   link           | `[text](href)`               |                                      | Autolinks too                         |
//! |   underline      | Plain text                   | Dropped                              | Only via raw `<u>`                    |
//! |   colors         | Plain text                   | Dropped                              | Only via raw HTML                     |
//!
//! # Lossy Conversions
//!
//! - Block props other than heading level, checked state and image url are dropped
//! - Underline and colors are dropped
//! - Ids are regenerated on import
//! - Children of non-list blocks are flattened to following siblings

pub mod parser;
pub mod serializer;

pub use parser::{comrak_options, MarkdownImporter};
pub use serializer::{html_to_markdown, MarkdownExporter, MarkdownOptions};

use crate::deps::FormattingDeps;
use crate::error::ConversionError;
use crate::format::Format;
use crate::formats::FormatSettings;
use crate::model::{Block, IdStrategy};
use crate::schema::Schema;
use std::sync::Arc;

/// Format implementation for Markdown
pub struct MarkdownFormat {
    schema: Arc<Schema>,
    ids: IdStrategy,
    exporter: MarkdownExporter,
}

impl MarkdownFormat {
    pub fn new(settings: &FormatSettings) -> Self {
        Self {
            schema: Arc::clone(&settings.schema),
            ids: settings.ids,
            exporter: MarkdownExporter::new(
                Arc::clone(&settings.schema),
                Arc::clone(&settings.deps),
                settings.markdown.clone(),
            ),
        }
    }

    pub fn deps(&self) -> &FormattingDeps {
        self.exporter.deps()
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GFM tables and task lists"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Block>, ConversionError> {
        MarkdownImporter::new(Arc::clone(&self.schema), self.ids.generator()).parse_markdown(source)
    }

    fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError> {
        self.exporter.export_blocks(blocks)
    }
}

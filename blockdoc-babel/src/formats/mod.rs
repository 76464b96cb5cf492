//! Format implementations
//!
//! Every format converts between a block list and a text representation.
//! They share one [`FormatSettings`], so a registry built from it uses the
//! same schema, id strategy and Markdown runtime throughout.

pub mod html;
pub mod json;
pub mod markdown;

pub use html::{BlocknoteHtmlFormat, HtmlFormat};
pub use json::JsonFormat;
pub use markdown::{MarkdownFormat, MarkdownOptions};

use crate::deps::FormattingDeps;
use crate::model::IdStrategy;
use crate::schema::Schema;
use std::sync::Arc;

/// Settings shared by the built-in formats.
#[derive(Debug, Clone)]
pub struct FormatSettings {
    pub schema: Arc<Schema>,
    pub ids: IdStrategy,
    pub markdown: MarkdownOptions,
    /// Default of the `html` format's `simplify-blocks` option.
    pub simplify_blocks: bool,
    pub deps: Arc<FormattingDeps>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            schema: Arc::new(Schema::default()),
            ids: IdStrategy::default(),
            markdown: MarkdownOptions::default(),
            simplify_blocks: true,
            deps: Arc::new(FormattingDeps::new()),
        }
    }
}

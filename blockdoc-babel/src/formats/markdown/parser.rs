//! Markdown parsing (Markdown → blocks import)
//!
//! comrak renders the source to HTML with the GFM extensions the editor
//! understands; the HTML importer then builds the blocks. Raw HTML inside the
//! Markdown passes through, so it imports like any other HTML would.

use crate::error::Result;
use crate::formats::html::HtmlImporter;
use crate::model::{Block, IdGenerator};
use crate::schema::Schema;
use comrak::{markdown_to_html, Options};
use log::debug;
use std::sync::Arc;

/// comrak options used for import: tables, strikethrough, autolinks and task
/// lists on, raw HTML kept.
pub fn comrak_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = true;
    options
}

pub struct MarkdownImporter {
    html: HtmlImporter,
}

impl MarkdownImporter {
    pub fn new(schema: Arc<Schema>, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            html: HtmlImporter::new(schema, ids),
        }
    }

    pub fn parse_markdown(&mut self, markdown: &str) -> Result<Vec<Block>> {
        let html = markdown_to_html(markdown, &comrak_options());
        debug!("markdown rendered to {} bytes of HTML", html.len());
        self.html.parse_html(&html)
    }
}

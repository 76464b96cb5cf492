//! Markdown serialization (blocks → external HTML → Markdown)
//!
//! Markdown is derived from the external HTML, never from blocks directly:
//! whatever the HTML exporter can say, this writer projects onto Markdown,
//! degrading what Markdown cannot express (underline, colors, alignment) to
//! plain text.

use crate::deps::{FormattingDeps, MarkdownRuntime};
use crate::error::Result;
use crate::formats::html::{
    collect_rows, dom, find_checkbox, split_list_item, ExportOptions, HtmlExporter,
};
use crate::model::Block;
use crate::schema::Schema;
use log::debug;
use markup5ever_rcdom::{Handle, NodeData};
use std::sync::Arc;

/// Layout choices for emitted Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    pub bullet_marker: char,
    /// Column where list item content starts.
    pub list_indent: usize,
    pub emphasis_marker: char,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            bullet_marker: '*',
            list_indent: 4,
            emphasis_marker: '*',
        }
    }
}

/// Blocks → Markdown, through the external HTML rendering.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    html: HtmlExporter,
    deps: Arc<FormattingDeps>,
    options: MarkdownOptions,
}

impl MarkdownExporter {
    pub fn new(schema: Arc<Schema>, deps: Arc<FormattingDeps>, options: MarkdownOptions) -> Self {
        Self {
            html: HtmlExporter::new(schema),
            deps,
            options,
        }
    }

    pub fn deps(&self) -> &FormattingDeps {
        &self.deps
    }

    pub fn export_blocks(&self, blocks: &[Block]) -> Result<String> {
        self.deps.get()?;
        let html = self.html.export_blocks(blocks, &ExportOptions::external())?;
        html_to_markdown(&html, &self.deps, &self.options)
    }
}

/// Rewrites external HTML as Markdown.
///
/// Blocks are separated by one blank line and the output ends with a single
/// newline; an empty document yields an empty string.
pub fn html_to_markdown(
    html: &str,
    deps: &FormattingDeps,
    options: &MarkdownOptions,
) -> Result<String> {
    let runtime = deps.get()?;
    let body = dom::parse_body(html);
    let writer = MarkdownWriter { runtime, options };
    let blocks: Vec<String> = writer
        .blocks(&dom::children(&body))
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect();
    debug!("wrote {} markdown block(s)", blocks.len());

    if blocks.is_empty() {
        Ok(String::new())
    } else {
        Ok(blocks.join("\n\n") + "\n")
    }
}

struct MarkdownWriter<'a> {
    runtime: &'a MarkdownRuntime,
    options: &'a MarkdownOptions,
}

impl MarkdownWriter<'_> {
    fn blocks(&self, nodes: &[Handle]) -> Vec<String> {
        let mut out = Vec::new();
        let mut pending: Vec<Handle> = Vec::new();

        for node in nodes {
            match &node.data {
                NodeData::Text { .. } => pending.push(node.clone()),
                NodeData::Element { .. } if dom::is_skipped_element(node) => {}
                NodeData::Element { .. } if !dom::is_block_element(node) => {
                    pending.push(node.clone())
                }
                NodeData::Element { .. } => {
                    self.flush(&mut pending, &mut out);
                    self.block(node, &mut out);
                }
                _ => {}
            }
        }
        self.flush(&mut pending, &mut out);
        out
    }

    fn flush(&self, pending: &mut Vec<Handle>, out: &mut Vec<String>) {
        if pending.is_empty() {
            return;
        }
        let text = self.inline_nodes(&std::mem::take(pending));
        if !text.is_empty() {
            out.push(text);
        }
    }

    fn block(&self, element: &Handle, out: &mut Vec<String>) {
        let Some(tag) = dom::element_name(element) else {
            return;
        };
        let children = dom::children(element);

        match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = self.inline_nodes(&children);
                out.push(format!("{} {text}", "#".repeat(level)).trim_end().to_string());
            }
            "p" => {
                let text = self.inline_nodes(&children);
                if !text.is_empty() {
                    out.push(text);
                }
            }
            "ul" => out.push(self.list(element, false)),
            "ol" => out.push(self.list(element, true)),
            "li" => out.push(self.item(&self.options.bullet_marker.to_string(), element)),
            "table" => out.push(self.table(element)),
            "img" => out.push(self.image(element, None)),
            "figure" => {
                if let Some(img) = dom::find_descendant(element, "img") {
                    let caption = dom::find_descendant(element, "figcaption")
                        .map(|c| dom::text_content(&c).trim().to_string());
                    out.push(self.image(&img, caption));
                }
            }
            "pre" => {
                let code = dom::text_content(element);
                out.push(format!("```\n{}\n```", code.trim_end_matches('\n')));
            }
            "blockquote" => {
                let inner = self.blocks(&children).join("\n\n");
                let quoted: Vec<String> = inner
                    .lines()
                    .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {l}") })
                    .collect();
                out.push(quoted.join("\n"));
            }
            "hr" => out.push("***".to_string()),
            // Block groups and generic containers flatten into the sequence.
            _ => out.extend(self.blocks(&children)),
        }
    }

    fn list(&self, list: &Handle, ordered: bool) -> String {
        let mut number = dom::attr(list, "start")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);
        let mut items = Vec::new();
        for item in dom::element_children(list) {
            if !dom::is_element(&item, "li") {
                items.extend(self.blocks(&[item]));
                continue;
            }
            let marker = if ordered {
                let marker = format!("{number}.");
                number += 1;
                marker
            } else {
                self.options.bullet_marker.to_string()
            };
            items.push(self.item(&marker, &item));
        }
        items.join("\n\n")
    }

    fn item(&self, marker: &str, item: &Handle) -> String {
        let (content, rest) = split_list_item(item);
        let mut first = String::new();
        if let Some(checked) = content.iter().find_map(find_checkbox) {
            first.push_str(if checked { "[x] " } else { "[ ] " });
        }
        first.push_str(&self.inline_nodes(&content));

        let mut parts = vec![first.trim_end().to_string()];
        parts.extend(self.blocks(&rest).into_iter().filter(|b| !b.is_empty()));
        self.indent_item(marker, &parts.join("\n\n"))
    }

    /// Marker padded to the list indent; continuation lines indented to match.
    fn indent_item(&self, marker: &str, body: &str) -> String {
        if body.is_empty() {
            return marker.to_string();
        }
        let width = self.options.list_indent.max(marker.chars().count() + 1);
        let padding = " ".repeat(width);
        let mut out = String::new();
        for (i, line) in body.lines().enumerate() {
            if i == 0 {
                out.push_str(&format!("{marker:<width$}{line}"));
                continue;
            }
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&padding);
                out.push_str(line);
            }
        }
        out
    }

    /// GFM pipe table; the first row is the header.
    fn table(&self, table: &Handle) -> String {
        let mut rows: Vec<Vec<String>> = Vec::new();
        collect_rows(table, &mut |tr: &Handle| {
            let cells = dom::element_children(tr)
                .iter()
                .filter(|c| dom::is_element(c, "td") || dom::is_element(c, "th"))
                .map(|cell| self.inline_nodes(&dom::children(cell)).replace('|', "\\|"))
                .collect();
            rows.push(cells);
        });
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return String::new();
        }
        for row in &mut rows {
            row.resize(columns, String::new());
        }

        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                rows.iter()
                    .map(|r| r[c].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(3)
            })
            .collect();
        let line = |cells: Vec<String>| format!("| {} |", cells.join(" | "));
        let render = |row: &[String]| {
            line(
                row.iter()
                    .zip(&widths)
                    .map(|(cell, width)| format!("{cell:<width$}"))
                    .collect(),
            )
        };

        let mut lines = vec![render(&rows[0])];
        lines.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
        lines.extend(rows[1..].iter().map(|row| render(row)));
        lines.join("\n")
    }

    fn image(&self, img: &Handle, caption: Option<String>) -> String {
        let alt = caption.or_else(|| dom::attr(img, "alt")).unwrap_or_default();
        let src = dom::attr(img, "src").unwrap_or_default();
        format!("![{}]({})", self.runtime.escape(&alt), link_destination(&src))
    }

    fn inline_nodes(&self, nodes: &[Handle]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.inline(node, &mut out);
        }
        while out.ends_with("\\\n") || out.ends_with(' ') {
            let cut = if out.ends_with(' ') { 1 } else { 2 };
            out.truncate(out.len() - cut);
        }
        let text = squeeze_spaces(out.trim_start());
        self.runtime.escape_line_starts(&text).into_owned()
    }

    fn inline(&self, node: &Handle, out: &mut String) {
        let tag = match &node.data {
            NodeData::Text { contents } => {
                out.push_str(&self.runtime.escape(&self.runtime.collapse(&contents.borrow())));
                return;
            }
            NodeData::Element { name, .. } => name.local.to_string(),
            _ => return,
        };
        if dom::is_skipped_element(node) {
            return;
        }

        let emphasis = self.options.emphasis_marker.to_string();
        match tag.as_str() {
            "strong" | "b" => out.push_str(&self.wrap(node, &emphasis.repeat(2))),
            "em" | "i" => out.push_str(&self.wrap(node, &emphasis)),
            "s" | "del" | "strike" => out.push_str(&self.wrap(node, "~~")),
            "code" => {
                let code = dom::text_content(node);
                if code.contains('`') {
                    out.push_str(&format!("`` {code} ``"));
                } else {
                    out.push_str(&format!("`{code}`"));
                }
            }
            "a" => {
                let text = self.inner(node);
                match dom::attr(node, "href") {
                    Some(href) => {
                        out.push_str(&format!("[{text}]({})", link_destination(&href)))
                    }
                    None => out.push_str(&text),
                }
            }
            "br" => out.push_str("\\\n"),
            "img" => out.push_str(&self.image(node, None)),
            "input" => {}
            // underline, color spans and unknown inline tags keep their text only
            _ => out.push_str(&self.inner(node)),
        }
    }

    fn inner(&self, node: &Handle) -> String {
        let mut out = String::new();
        for child in node.children.borrow().iter() {
            self.inline(child, &mut out);
        }
        out
    }

    /// Delimiters go inside surrounding whitespace, as emphasis cannot start
    /// or end with a space.
    fn wrap(&self, node: &Handle, delimiter: &str) -> String {
        let inner = self.inner(node);
        let core = inner.trim();
        if core.is_empty() {
            return inner;
        }
        let leading = &inner[..inner.len() - inner.trim_start().len()];
        let trailing = &inner[inner.trim_end().len()..];
        format!("{leading}{delimiter}{core}{delimiter}{trailing}")
    }
}

/// Destinations with spaces, parentheses, angle brackets or backslashes go
/// in angle brackets, where only `<`, `>` and `\` need escaping.
fn link_destination(href: &str) -> String {
    let bare = !href.is_empty()
        && !href
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>' | '\\'));
    if bare {
        return href.to_string();
    }
    let mut out = String::with_capacity(href.len() + 2);
    out.push('<');
    for c in href.chars() {
        if matches!(c, '<' | '>' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('>');
    out
}

fn squeeze_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !previous_space {
                out.push(ch);
            }
            previous_space = true;
        } else {
            out.push(ch);
            previous_space = false;
        }
    }
    out
}

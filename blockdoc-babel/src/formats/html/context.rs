//! Render and parse contexts handed to block templates.
//!
//! Templates only describe their own element; everything inline (style tags,
//! links, breaks, whitespace) and everything tabular goes through these
//! contexts so that every block type renders runs the same way.

use super::dom;
use crate::error::Result;
use crate::model::{
    merge_adjacent, InlineContent, Link, StyleValue, StyledText, Styles, TableContent, TableRow,
};
use crate::schema::{ListContainer, Schema};
use markup5ever_rcdom::{Handle, NodeData};

/// Class carried by inline content elements in internal HTML.
pub const INLINE_CONTENT_CLASS: &str = "bn-inline-content";

pub struct RenderContext<'a> {
    schema: &'a Schema,
    internal: bool,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(schema: &'a Schema, internal: bool) -> Self {
        Self { schema, internal }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Whether wrapper markup for exact round trips is being produced.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// `<tag>` holding the rendered runs.
    pub fn inline_element(&self, tag: &str, content: &[InlineContent]) -> Result<Handle> {
        let attrs = if self.internal {
            vec![("class", INLINE_CONTENT_CLASS)]
        } else {
            vec![]
        };
        let element = dom::create_element(tag, attrs);
        self.render_inline(&element, content)?;
        Ok(element)
    }

    /// Appends merged runs to `parent`, styles nested in canonical order.
    pub fn render_inline(&self, parent: &Handle, content: &[InlineContent]) -> Result<()> {
        self.schema.validate_inline(content)?;
        for item in merge_adjacent(content.to_vec()) {
            match item {
                InlineContent::Text(run) => self.render_run(parent, &run),
                InlineContent::Link(link) => {
                    let anchor = dom::create_element("a", vec![("href", link.href.as_str())]);
                    for run in &link.content {
                        self.render_run(&anchor, run);
                    }
                    dom::append(parent, anchor);
                }
            }
        }
        Ok(())
    }

    fn render_run(&self, parent: &Handle, run: &StyledText) {
        let mut current = parent.clone();
        for spec in self.schema.styles.iter() {
            let Some(value) = run.styles.get(&spec.name) else {
                continue;
            };
            let element = match (&spec.attribute, value) {
                (Some(attribute), StyleValue::Value(v)) => {
                    dom::create_element(&spec.tag, vec![(attribute.as_str(), v.as_str())])
                }
                _ => dom::create_element(&spec.tag, vec![]),
            };
            dom::append(&current, element.clone());
            current = element;
        }
        append_text(&current, &run.text);
    }

    /// `<table><tbody><tr><td>…`
    pub fn table_element(&self, table: &TableContent) -> Result<Handle> {
        self.schema.validate_table(table)?;
        let element = dom::create_element("table", vec![]);
        let body = dom::create_element("tbody", vec![]);
        for row in &table.rows {
            let tr = dom::create_element("tr", vec![]);
            for cell in &row.cells {
                let td = dom::create_element("td", vec![]);
                self.render_inline(&td, cell)?;
                dom::append(&tr, td);
            }
            dom::append(&body, tr);
        }
        dom::append(&element, body);
        Ok(element)
    }
}

/// Text with `"\n"` rendered as `<br>`.
fn append_text(parent: &Handle, text: &str) {
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            dom::append(parent, dom::create_element("br", vec![]));
        }
        if !part.is_empty() {
            dom::append(parent, dom::create_text(part));
        }
    }
}

#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    schema: &'a Schema,
    list: Option<ListContainer>,
    collapse_whitespace: bool,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(schema: &'a Schema, collapse_whitespace: bool) -> Self {
        Self {
            schema,
            list: None,
            collapse_whitespace,
        }
    }

    pub(crate) fn in_list(self, list: ListContainer) -> Self {
        Self {
            list: Some(list),
            ..self
        }
    }

    pub(crate) fn outside_list(self) -> Self {
        Self { list: None, ..self }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Container of the list item being parsed, if any.
    pub fn list(&self) -> Option<ListContainer> {
        self.list
    }

    /// Inline content of an element's children.
    pub fn parse_inline(&self, element: &Handle) -> Vec<InlineContent> {
        self.parse_inline_nodes(&dom::children(element))
    }

    pub fn parse_inline_nodes(&self, nodes: &[Handle]) -> Vec<InlineContent> {
        let mut builder = InlineBuilder::default();
        for node in nodes {
            self.walk_inline(node, &Styles::new(), None, &mut builder);
        }
        builder.finish(self.collapse_whitespace)
    }

    /// Inline content of a list item: its leading inline nodes or first `<p>`.
    pub fn list_item_inline(&self, item: &Handle) -> Vec<InlineContent> {
        let (content, _) = split_list_item(item);
        self.parse_inline_nodes(&content)
    }

    /// `Some(checked)` when the item's content starts with a checkbox.
    pub fn checkbox_state(&self, item: &Handle) -> Option<bool> {
        let (content, _) = split_list_item(item);
        content.iter().find_map(find_checkbox)
    }

    /// Rows of `tr` elements (through `thead`/`tbody`/`tfoot`), padded.
    pub fn parse_table(&self, table: &Handle) -> TableContent {
        let mut rows = Vec::new();
        collect_rows(table, &mut |tr: &Handle| {
            let cells = dom::element_children(tr)
                .iter()
                .filter(|c| dom::is_element(c, "td") || dom::is_element(c, "th"))
                .map(|cell| self.parse_inline(cell))
                .collect();
            rows.push(TableRow { cells });
        });
        TableContent::new(rows).pad()
    }

    fn walk_inline(
        &self,
        node: &Handle,
        styles: &Styles,
        href: Option<&str>,
        out: &mut InlineBuilder,
    ) {
        match &node.data {
            NodeData::Text { contents } => out.push_text(&contents.borrow(), styles, href),
            NodeData::Element { name, .. } => {
                let tag = &*name.local;
                if dom::is_skipped_element(node) || tag == "input" || tag == "img" {
                    return;
                }
                if tag == "br" {
                    out.push_break(styles, href);
                    return;
                }

                let mut styles = styles.clone();
                if let Some(spec) = self.schema.styles.by_tag(tag) {
                    styles.insert(&spec.name, StyleValue::Toggle);
                }
                for spec in self.schema.styles.iter() {
                    if let Some(attribute) = &spec.attribute {
                        if let Some(value) = dom::attr(node, attribute) {
                            styles.insert(&spec.name, StyleValue::Value(value));
                        }
                    }
                }

                let link = if tag == "a" { dom::attr(node, "href") } else { None };
                let href = link.as_deref().or(href);
                for child in node.children.borrow().iter() {
                    self.walk_inline(child, &styles, href, out);
                }
            }
            _ => {}
        }
    }
}

/// Splits a list item into its own content nodes and the nodes holding its
/// nested blocks.
pub(crate) fn split_list_item(item: &Handle) -> (Vec<Handle>, Vec<Handle>) {
    let children = dom::children(item);
    let mut content = Vec::new();
    let mut has_text = false;

    for (i, child) in children.iter().enumerate() {
        if dom::is_block_element(child) {
            if !has_text && dom::is_element(child, "p") {
                content.push(child.clone());
                return (content, children[i + 1..].to_vec());
            }
            return (content, children[i..].to_vec());
        }
        has_text |= match &child.data {
            NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
            NodeData::Element { .. } => !dom::is_element(child, "input"),
            _ => false,
        };
        content.push(child.clone());
    }
    (content, Vec::new())
}

pub(crate) fn find_checkbox(node: &Handle) -> Option<bool> {
    if dom::is_element(node, "input") {
        return (dom::attr(node, "type").as_deref() == Some("checkbox"))
            .then(|| dom::has_attr(node, "checked"));
    }
    // comrak puts the box directly in the item; other producers wrap it in `<p>`.
    if dom::is_element(node, "p") {
        return dom::significant_children(node).first().and_then(find_checkbox);
    }
    None
}

pub(crate) fn collect_rows(node: &Handle, f: &mut dyn FnMut(&Handle)) {
    for child in dom::element_children(node) {
        if dom::is_element(&child, "tr") {
            f(&child);
        } else if ["thead", "tbody", "tfoot"].iter().any(|t| dom::is_element(&child, t)) {
            collect_rows(&child, f);
        }
    }
}

struct Segment {
    text: String,
    styles: Styles,
    href: Option<String>,
    hard_break: bool,
}

/// Accumulates text segments during an inline walk.
#[derive(Default)]
struct InlineBuilder {
    segments: Vec<Segment>,
}

impl InlineBuilder {
    fn push_text(&mut self, text: &str, styles: &Styles, href: Option<&str>) {
        self.segments.push(Segment {
            text: text.to_string(),
            styles: styles.clone(),
            href: href.map(str::to_string),
            hard_break: false,
        });
    }

    fn push_break(&mut self, styles: &Styles, href: Option<&str>) {
        self.segments.push(Segment {
            text: "\n".to_string(),
            styles: styles.clone(),
            href: href.map(str::to_string),
            hard_break: true,
        });
    }

    fn finish(mut self, collapse: bool) -> Vec<InlineContent> {
        if collapse {
            self.collapse_whitespace();
        }

        let mut content: Vec<InlineContent> = Vec::new();
        for segment in self.segments {
            let run = StyledText::new(segment.text, segment.styles);
            match segment.href {
                Some(href) => match content.last_mut() {
                    Some(InlineContent::Link(link)) if link.href == href => link.content.push(run),
                    _ => content.push(InlineContent::Link(Link {
                        href,
                        content: vec![run],
                    })),
                },
                None => content.push(InlineContent::Text(run)),
            }
        }
        merge_adjacent(content)
    }

    /// Whitespace runs become one space; spaces at block edges and around
    /// hard breaks are dropped.
    fn collapse_whitespace(&mut self) {
        let mut previous_space = true;
        for i in 0..self.segments.len() {
            if self.segments[i].hard_break {
                trim_trailing_spaces(&mut self.segments[..i]);
                previous_space = true;
                continue;
            }
            let mut collapsed = String::with_capacity(self.segments[i].text.len());
            for ch in self.segments[i].text.chars() {
                if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0c') {
                    if !previous_space {
                        collapsed.push(' ');
                        previous_space = true;
                    }
                } else {
                    collapsed.push(ch);
                    previous_space = false;
                }
            }
            self.segments[i].text = collapsed;
        }
        trim_trailing_spaces(&mut self.segments);
    }
}

fn trim_trailing_spaces(segments: &mut [Segment]) {
    for segment in segments.iter_mut().rev() {
        if segment.hard_break {
            return;
        }
        let trimmed_len = segment.text.trim_end_matches(' ').len();
        let had_text = trimmed_len > 0;
        segment.text.truncate(trimmed_len);
        if had_text {
            return;
        }
    }
}

//! rcdom helpers shared by the exporter, the importer and the Markdown writer.

use crate::error::{ConversionError, Result};
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope,
    Attribute, LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;

/// Elements that start a new block when met in a block or list item context.
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "html",
    "img",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Elements whose content is never document text.
pub const SKIPPED_TAGS: &[&str] = &[
    "head", "meta", "link", "script", "style", "template", "title", "noscript",
];

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Adds (or overwrites) an attribute on an element built by [`create_element`].
pub fn set_attr(element: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &element.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| &*a.name.local == name) {
            Some(existing) => existing.value = value.to_string().into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: value.to_string().into(),
            }),
        }
    }
}

/// Moves every child of `from` to the end of `to`.
pub fn move_children(from: &Handle, to: &Handle) {
    let moved: Vec<Handle> = from.children.borrow_mut().drain(..).collect();
    to.children.borrow_mut().extend(moved);
}

/// Serializes the children of `container` (not the container itself).
pub fn serialize_children(container: &Handle) -> Result<String> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            ConversionError::Serialization(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| ConversionError::Serialization(format!("UTF-8 conversion failed: {e}")))
}

/// A parsed HTML document, borrowed as its `<body>` element.
///
/// Dropping an `RcDom` empties every node below its document, even nodes
/// still referenced elsewhere, so the body is only walkable while the
/// document it came from is alive.
pub struct ParsedHtml {
    body: Handle,
    _dom: RcDom,
}

impl ParsedHtml {
    pub fn body(&self) -> &Handle {
        &self.body
    }
}

impl Deref for ParsedHtml {
    type Target = Handle;

    fn deref(&self) -> &Handle {
        &self.body
    }
}

/// Parses an HTML string, keeping its `<body>` element at hand.
///
/// Parsing is total: html5ever recovers from any malformed input, so there
/// is always a body to return.
pub fn parse_body(html: &str) -> ParsedHtml {
    let dom: RcDom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .one(html.as_bytes());
    let body = find_descendant(&dom.document, "body").unwrap_or_else(|| dom.document.clone());
    ParsedHtml { body, _dom: dom }
}

pub fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if &*name.local == tag)
}

pub fn attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn has_attr(handle: &Handle, name: &str) -> bool {
    attr(handle, name).is_some()
}

pub fn text(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

pub fn is_text(handle: &Handle) -> bool {
    matches!(handle.data, NodeData::Text { .. })
}

pub fn children(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().clone()
}

pub fn element_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|c| matches!(c.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Children other than comments and whitespace-only text.
pub fn significant_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|c| match &c.data {
            NodeData::Element { .. } => true,
            NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
            _ => false,
        })
        .cloned()
        .collect()
}

/// First descendant element named `tag`, depth-first.
pub fn find_descendant(handle: &Handle, tag: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if is_element(child, tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if SKIPPED_TAGS.contains(&&*name.local) => {}
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

pub fn is_block_element(handle: &Handle) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if BLOCK_TAGS.contains(&&*name.local))
}

pub fn is_skipped_element(handle: &Handle) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if SKIPPED_TAGS.contains(&&*name.local))
}

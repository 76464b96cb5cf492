//! Inline content: styled text runs, links and style sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value carried by a single style application.
///
/// Boolean styles (bold, italic, …) are [`StyleValue::Toggle`]; styles with a
/// prop (text color, background color) carry its string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StyleValueRepr", into = "StyleValueRepr")]
pub enum StyleValue {
    Toggle,
    Value(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StyleValueRepr {
    Flag(bool),
    Value(String),
}

impl TryFrom<StyleValueRepr> for StyleValue {
    type Error = String;

    fn try_from(repr: StyleValueRepr) -> Result<Self, Self::Error> {
        match repr {
            StyleValueRepr::Flag(true) => Ok(StyleValue::Toggle),
            StyleValueRepr::Flag(false) => {
                Err("inactive styles are omitted, not set to false".to_string())
            }
            StyleValueRepr::Value(value) => Ok(StyleValue::Value(value)),
        }
    }
}

impl From<StyleValue> for StyleValueRepr {
    fn from(value: StyleValue) -> Self {
        match value {
            StyleValue::Toggle => StyleValueRepr::Flag(true),
            StyleValue::Value(value) => StyleValueRepr::Value(value),
        }
    }
}

/// A set of style applications keyed by style type.
///
/// Being a map, a run can carry each style at most once and the order in which
/// styles were applied never influences equality or export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Styles(BTreeMap<String, StyleValue>);

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style toggle
    pub fn with(mut self, style: &str) -> Self {
        self.insert(style, StyleValue::Toggle);
        self
    }

    /// Builder-style value style (e.g. `textColor = red`)
    pub fn with_value(mut self, style: &str, value: &str) -> Self {
        self.insert(style, StyleValue::Value(value.to_string()));
        self
    }

    pub fn insert(&mut self, style: &str, value: StyleValue) {
        self.0.insert(style.to_string(), value);
    }

    pub fn remove(&mut self, style: &str) -> Option<StyleValue> {
        self.0.remove(style)
    }

    pub fn get(&self, style: &str) -> Option<&StyleValue> {
        self.0.get(style)
    }

    pub fn contains(&self, style: &str) -> bool {
        self.0.contains_key(style)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> FromIterator<&'a str> for Styles {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut styles = Styles::new();
        for style in iter {
            styles.insert(style, StyleValue::Toggle);
        }
        styles
    }
}

/// A run of text sharing one style set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyledText {
    pub text: String,
    #[serde(default)]
    pub styles: Styles,
}

impl StyledText {
    pub fn new(text: impl Into<String>, styles: Styles) -> Self {
        Self {
            text: text.into(),
            styles,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Styles::new())
    }
}

/// An inline link wrapping styled runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub content: Vec<StyledText>,
}

/// One element of a block's inline content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineContent {
    Text(StyledText),
    Link(Link),
}

impl InlineContent {
    pub fn text(text: impl Into<String>) -> Self {
        InlineContent::Text(StyledText::plain(text))
    }

    pub fn styled(text: impl Into<String>, styles: Styles) -> Self {
        InlineContent::Text(StyledText::new(text, styles))
    }

    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        InlineContent::Link(Link {
            href: href.into(),
            content: vec![StyledText::plain(text)],
        })
    }

    /// Concatenated text, ignoring styles and links.
    pub fn plain_text(&self) -> String {
        match self {
            InlineContent::Text(run) => run.text.clone(),
            InlineContent::Link(link) => link.content.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

/// Concatenated plain text of a run sequence.
pub fn plain_text(content: &[InlineContent]) -> String {
    content.iter().map(InlineContent::plain_text).collect()
}

/// Merges adjacent text runs with identical style sets and drops empty runs.
///
/// Links with the same target that end up next to each other are merged too.
/// Exporters run this before rendering so that split and pre-merged runs
/// serialize identically.
pub fn merge_adjacent(content: Vec<InlineContent>) -> Vec<InlineContent> {
    let mut merged: Vec<InlineContent> = Vec::with_capacity(content.len());

    for item in content {
        match item {
            InlineContent::Text(run) => {
                if run.text.is_empty() {
                    continue;
                }
                if let Some(InlineContent::Text(last)) = merged.last_mut() {
                    if last.styles == run.styles {
                        last.text.push_str(&run.text);
                        continue;
                    }
                }
                merged.push(InlineContent::Text(run));
            }
            InlineContent::Link(link) => {
                let runs = merge_runs(link.content);
                if runs.is_empty() {
                    continue;
                }
                if let Some(InlineContent::Link(last)) = merged.last_mut() {
                    if last.href == link.href {
                        let mut joined = std::mem::take(&mut last.content);
                        joined.extend(runs);
                        last.content = merge_runs(joined);
                        continue;
                    }
                }
                merged.push(InlineContent::Link(Link {
                    href: link.href,
                    content: runs,
                }));
            }
        }
    }

    merged
}

/// Same as [`merge_adjacent`], for the runs inside a link.
pub fn merge_runs(runs: Vec<StyledText>) -> Vec<StyledText> {
    let mut merged: Vec<StyledText> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.styles == run.styles => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_sets_ignore_application_order() {
        let a: Styles = ["italic", "bold"].into_iter().collect();
        let b: Styles = ["bold", "italic"].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn merges_runs_with_equal_styles() {
        let bold = Styles::new().with("bold");
        let merged = merge_adjacent(vec![
            InlineContent::styled("Bo", bold.clone()),
            InlineContent::styled("ld", bold.clone()),
            InlineContent::text(""),
            InlineContent::text(" plain"),
        ]);
        assert_eq!(
            merged,
            vec![
                InlineContent::styled("Bold", bold),
                InlineContent::text(" plain"),
            ]
        );
    }

    #[test]
    fn keeps_runs_with_different_values_apart() {
        let red = Styles::new().with_value("textColor", "red");
        let blue = Styles::new().with_value("textColor", "blue");
        let merged = merge_adjacent(vec![
            InlineContent::styled("a", red),
            InlineContent::styled("b", blue),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merges_neighbouring_links_to_the_same_target() {
        let merged = merge_adjacent(vec![
            InlineContent::link("https://example.com", "ex"),
            InlineContent::link("https://example.com", "ample"),
            InlineContent::link("https://other.com", "other"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].plain_text(), "example");
    }

    #[test]
    fn styles_serialize_as_flags_and_values() {
        let styles = Styles::new().with("bold").with_value("textColor", "red");
        let json = serde_json::to_string(&styles).unwrap();
        assert_eq!(json, r#"{"bold":true,"textColor":"red"}"#);
        let back: Styles = serde_json::from_str(&json).unwrap();
        assert_eq!(back, styles);
    }

    #[test]
    fn false_style_flags_are_rejected() {
        assert!(serde_json::from_str::<Styles>(r#"{"bold":false}"#).is_err());
    }
}

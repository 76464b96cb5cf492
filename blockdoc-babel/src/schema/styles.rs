//! Style vocabulary: which inline styles exist and how they map to HTML.
//!
//! Registration order is the canonical nesting order used on export: the
//! first registered style wraps every later one. With the built-ins this
//! puts `<strong>` outside `<em>`, whatever order the styles were applied in.

use crate::error::{ConversionError, Result};
use crate::model::{StyleValue, Styles};

/// Whether a style is a plain toggle or carries a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Boolean,
    String,
}

/// Declaration of one inline style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    pub name: String,
    pub kind: StyleKind,
    /// Tag rendered on export (`span` for value styles)
    pub tag: String,
    /// Tags recognized on import (boolean styles)
    pub parse_tags: Vec<String>,
    /// Attribute carrying the value (value styles)
    pub attribute: Option<String>,
}

impl StyleSpec {
    /// A toggle style rendered as `tag` and also parsed from `aliases`.
    pub fn toggle(name: &str, tag: &str, aliases: &[&str]) -> Self {
        let mut parse_tags = vec![tag.to_string()];
        parse_tags.extend(aliases.iter().map(|a| a.to_string()));
        Self {
            name: name.to_string(),
            kind: StyleKind::Boolean,
            tag: tag.to_string(),
            parse_tags,
            attribute: None,
        }
    }

    /// A value style rendered as `<span attribute="value">`.
    pub fn valued(name: &str, attribute: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: StyleKind::String,
            tag: "span".to_string(),
            parse_tags: Vec::new(),
            attribute: Some(attribute.to_string()),
        }
    }

    /// Verifies that `value` has the kind this style declares.
    pub fn check(&self, value: &StyleValue) -> Result<()> {
        match (self.kind, value) {
            (StyleKind::Boolean, StyleValue::Toggle) => Ok(()),
            (StyleKind::String, StyleValue::Value(_)) => Ok(()),
            (StyleKind::Boolean, StyleValue::Value(v)) => Err(ConversionError::InvalidStyle {
                style: self.name.clone(),
                reason: format!("is a toggle but carries value '{v}'"),
            }),
            (StyleKind::String, StyleValue::Toggle) => Err(ConversionError::InvalidStyle {
                style: self.name.clone(),
                reason: "requires a value".to_string(),
            }),
        }
    }
}

/// Ordered registry of inline styles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSchema {
    specs: Vec<StyleSpec>,
}

impl StyleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a style. Re-registering a name keeps its canonical position.
    pub fn register(&mut self, spec: StyleSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn get(&self, name: &str) -> Option<&StyleSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Styles in canonical (outermost first) order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleSpec> {
        self.specs.iter()
    }

    /// Toggle style whose import tags include `tag`.
    pub fn by_tag(&self, tag: &str) -> Option<&StyleSpec> {
        self.specs
            .iter()
            .find(|s| s.kind == StyleKind::Boolean && s.parse_tags.iter().any(|t| t == tag))
    }

    /// Rejects unknown styles and kind mismatches.
    pub fn validate(&self, styles: &Styles) -> Result<()> {
        for (name, value) in styles.iter() {
            let spec = self.get(name).ok_or_else(|| ConversionError::InvalidStyle {
                style: name.to_string(),
                reason: "not registered in the style schema".to_string(),
            })?;
            spec.check(value)?;
        }
        Ok(())
    }

    /// Built-in vocabulary, in canonical order.
    pub fn with_defaults() -> Self {
        let mut schema = Self::new();
        schema.register(StyleSpec::toggle("bold", "strong", &["b"]));
        schema.register(StyleSpec::toggle("italic", "em", &["i"]));
        schema.register(StyleSpec::toggle("underline", "u", &["ins"]));
        schema.register(StyleSpec::toggle("strike", "s", &["del", "strike"]));
        schema.register(StyleSpec::toggle("code", "code", &[]));
        schema.register(StyleSpec::valued("textColor", "data-text-color"));
        schema.register(StyleSpec::valued("backgroundColor", "data-background-color"));
        schema
    }
}

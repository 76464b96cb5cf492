//! Prop declarations for block types.

use crate::model::PropValue;

/// Declaration of one prop: its name, default and (optionally) allowed values.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSpec {
    pub name: String,
    pub default: PropValue,
    pub values: Option<Vec<PropValue>>,
}

impl PropSpec {
    pub fn new(name: &str, default: impl Into<PropValue>) -> Self {
        Self {
            name: name.to_string(),
            default: default.into(),
            values: None,
        }
    }

    /// Restricts the prop to an enumerated set of string values.
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.values = Some(values.iter().map(|v| PropValue::from(*v)).collect());
        self
    }

    /// Checks kind and allowed values. Returns a reason on failure.
    pub fn check(&self, value: &PropValue) -> Result<(), String> {
        if std::mem::discriminant(value) != std::mem::discriminant(&self.default) {
            return Err(format!(
                "expected a value like '{}', got '{value}'",
                self.default
            ));
        }
        if let Some(values) = &self.values {
            if !values.contains(value) {
                let allowed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                return Err(format!(
                    "'{value}' is not one of [{}]",
                    allowed.join(", ")
                ));
            }
        }
        Ok(())
    }

    /// Name of the `data-*` attribute carrying this prop in HTML.
    pub fn attribute_name(&self) -> String {
        format!("data-{}", kebab_case(&self.name))
    }
}

/// Ordered prop declarations of a block type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropSchema {
    specs: Vec<PropSpec>,
}

impl PropSchema {
    pub fn new(specs: Vec<PropSpec>) -> Self {
        Self { specs }
    }

    /// Default props extended with type-specific ones.
    pub fn defaults_with(extra: Vec<PropSpec>) -> Self {
        let mut schema = default_props();
        for spec in extra {
            schema.insert(spec);
        }
        schema
    }

    /// Adds a declaration, replacing one with the same name.
    pub fn insert(&mut self, spec: PropSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropSpec> {
        self.specs.iter()
    }
}

/// Props shared by every text-bearing block kind.
pub fn default_props() -> PropSchema {
    PropSchema::new(vec![
        PropSpec::new("backgroundColor", "default"),
        PropSpec::new("textColor", "default"),
        PropSpec::new("textAlignment", "left").one_of(&["left", "center", "right", "justify"]),
    ])
}

/// `textColor` → `text-color`
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

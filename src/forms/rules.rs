//! Required-field and length rules per form kind.
//!
//! Lengths are counted in characters, not bytes, since codes and names are
//! routinely entered in Chinese.

use serde::{Deserialize, Serialize};

/// The forms whose fields are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Bom,
    ProcessRoute,
    CategoryRoute,
    Material,
}

/// Constraint on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub max_chars: Option<usize>,
}

impl FieldRule {
    const fn required(field: &'static str) -> Self {
        Self {
            field,
            required: true,
            max_chars: None,
        }
    }

    const fn bounded(field: &'static str, max_chars: usize) -> Self {
        Self {
            field,
            required: true,
            max_chars: Some(max_chars),
        }
    }

    fn check(&self, value: &str) -> Option<Violation> {
        if self.required && value.trim().is_empty() {
            return Some(Violation::new(self.field, format!("{} is required", self.field)));
        }
        match self.max_chars {
            Some(max) if value.chars().count() > max => Some(Violation::new(
                self.field,
                format!("{} must be at most {} characters", self.field, max),
            )),
            _ => None,
        }
    }
}

/// A failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

const BOM_RULES: &[FieldRule] = &[
    FieldRule::required("parent"),
    FieldRule::required("code"),
    FieldRule::required("version"),
];

const ROUTE_RULES: &[FieldRule] = &[
    FieldRule::bounded("code", 50),
    FieldRule::required("version"),
    FieldRule::required("parent"),
];

const MATERIAL_RULES: &[FieldRule] = &[
    FieldRule::bounded("name", 100),
    FieldRule::bounded("code", 100),
    FieldRule::required("category"),
];

pub fn rules_for(kind: FormKind) -> &'static [FieldRule] {
    match kind {
        FormKind::Bom => BOM_RULES,
        FormKind::ProcessRoute | FormKind::CategoryRoute => ROUTE_RULES,
        FormKind::Material => MATERIAL_RULES,
    }
}

/// Check `fields` (name, value) against the rules of `kind`.
///
/// A field missing from `fields` is treated as empty.
pub fn validate(kind: FormKind, fields: &[(&str, String)]) -> Vec<Violation> {
    rules_for(kind)
        .iter()
        .filter_map(|rule| {
            let value = fields
                .iter()
                .find(|(name, _)| *name == rule.field)
                .map(|(_, value)| value.as_str())
                .unwrap_or("");
            rule.check(value)
        })
        .collect()
}

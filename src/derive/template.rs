//! Pure code/description templates.
//!
//! Every derived value joins a stable identifying part of the parent, an
//! optional human label and the version (or parameter segments) with a
//! separator. Missing inputs yield an empty string, which callers read as
//! "not derivable yet".

use mes_common::{Category, ParamDefinition, Product};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default separator between template parts.
pub const DEFAULT_SEPARATOR: &str = "-";

/// A resolved parent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent<'a> {
    Category(&'a Category),
    Product(&'a Product),
}

impl<'a> Parent<'a> {
    pub fn code(&self) -> &'a str {
        match self {
            Parent::Category(category) => category.code.as_str(),
            Parent::Product(product) => product.code.as_str(),
        }
    }

    /// Human label: a category's display name or a product's name.
    pub fn label(&self) -> &'a str {
        match self {
            Parent::Category(category) => category.display_name.as_str(),
            Parent::Product(product) => product.name.as_str(),
        }
    }

    /// Template used when the entity kind does not pick one.
    pub fn default_template(&self) -> DescriptionTemplate {
        match self {
            Parent::Category(_) => DescriptionTemplate::CodeLabelVersion,
            Parent::Product(_) => DescriptionTemplate::LabelVersion,
        }
    }
}

/// Layout of a derived description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DescriptionTemplate {
    /// `code-label-version`, used for category and route style records.
    CodeLabelVersion,
    /// `label-version`, used for product style records.
    LabelVersion,
}

/// Which category field a material identifier starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialBase {
    Code,
    DisplayName,
}

/// Template renderer with a configurable separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    separator: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl Templates {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// `parent.code + sep + version`.
    pub fn code(&self, parent: Option<Parent<'_>>, version: &str) -> String {
        let version = version.trim();
        match parent {
            Some(parent) if !version.is_empty() && !parent.code().is_empty() => {
                self.join(&[parent.code(), version])
            }
            _ => String::new(),
        }
    }

    /// Description in the parent's default template.
    pub fn description(&self, parent: Option<Parent<'_>>, version: &str) -> String {
        match parent {
            Some(p) => self.description_with(Some(p), version, p.default_template()),
            None => String::new(),
        }
    }

    /// Description in an explicit template.
    pub fn description_with(
        &self,
        parent: Option<Parent<'_>>,
        version: &str,
        template: DescriptionTemplate,
    ) -> String {
        let version = version.trim();
        let Some(parent) = parent else {
            return String::new();
        };
        if version.is_empty() {
            return String::new();
        }
        match template {
            DescriptionTemplate::CodeLabelVersion => {
                self.join(&[parent.code(), parent.label(), version])
            }
            DescriptionTemplate::LabelVersion => self.join(&[parent.label(), version]),
        }
    }

    /// Material code or name: the category base followed by one
    /// `name + value` segment per filled parameter, in declaration order.
    ///
    /// Blank values are skipped entirely, leaving no empty segment behind.
    pub fn material(
        &self,
        category: Option<&Category>,
        params_in_order: &[&ParamDefinition],
        values: &BTreeMap<i64, String>,
        base: MaterialBase,
    ) -> String {
        let Some(category) = category else {
            return String::new();
        };
        let base = match base {
            MaterialBase::Code => category.code.as_str(),
            MaterialBase::DisplayName => category.display_name.as_str(),
        };

        let segments: Vec<String> = params_in_order
            .iter()
            .filter_map(|param| {
                let value = values.get(&param.id)?.trim();
                (!value.is_empty()).then(|| format!("{}{}", param.name, value))
            })
            .collect();

        let mut parts = Vec::with_capacity(segments.len() + 1);
        parts.push(base);
        parts.extend(segments.iter().map(String::as_str));
        self.join(&parts)
    }

    fn join(&self, parts: &[&str]) -> String {
        parts.join(self.separator.as_str())
    }
}

/// `parent.code-version` with the default separator.
pub fn derive_code(parent: Option<Parent<'_>>, version: &str) -> String {
    Templates::default().code(parent, version)
}

/// Description in the parent's default template with the default separator.
pub fn derive_description(parent: Option<Parent<'_>>, version: &str) -> String {
    Templates::default().description(parent, version)
}

/// Material code or name with the default separator.
pub fn derive_material_code_or_name(
    category: Option<&Category>,
    params_in_order: &[&ParamDefinition],
    values: &BTreeMap<i64, String>,
    base: MaterialBase,
) -> String {
    Templates::default().material(category, params_in_order, values, base)
}

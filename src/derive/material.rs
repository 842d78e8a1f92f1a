//! Material form: code and name built from a category and its parameters.

use mes_common::{ParamValue, lenient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::field::{DerivedField, FieldPolicies};
use super::session::DerivationState;
use super::snapshot::ReferenceSnapshot;
use super::template::{MaterialBase, Templates};
use crate::errors::FormError;
use crate::forms::{self, FormKind};

/// Form-shaped record of a material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::id_or_none")]
    pub category: Option<i64>,
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub param_values: Vec<ParamValue>,
}

impl MaterialRecord {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("code", self.code.clone()),
            (
                "category",
                self.category.map(|id| id.to_string()).unwrap_or_default(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MaterialEvent {
    SetCategory {
        #[serde(default)]
        category: Option<i64>,
    },
    SetParam {
        param: i64,
        #[serde(default)]
        value: String,
    },
    EditCode {
        value: String,
    },
    EditName {
        value: String,
    },
    Fill {
        record: MaterialRecord,
    },
    Reset,
}

/// Per-form state of a material being created or edited.
#[derive(Debug, Clone)]
pub struct MaterialSession {
    templates: Templates,
    id: Option<i64>,
    category: Option<i64>,
    values: BTreeMap<i64, String>,
    code: DerivedField,
    name: DerivedField,
    state: DerivationState,
}

impl MaterialSession {
    pub fn new(templates: Templates, policies: FieldPolicies) -> Self {
        Self {
            templates,
            id: None,
            category: None,
            values: BTreeMap::new(),
            code: DerivedField::new(policies.code),
            name: DerivedField::new(policies.label),
            state: DerivationState::Empty,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Templates::default(), FieldPolicies::default())
    }

    pub fn state(&self) -> DerivationState {
        self.state
    }

    pub fn category(&self) -> Option<i64> {
        self.category
    }

    pub fn code(&self) -> &str {
        self.code.value()
    }

    pub fn name(&self) -> &str {
        self.name.value()
    }

    pub fn name_is_manual(&self) -> bool {
        self.name.is_manual()
    }

    pub fn reset(&mut self) {
        self.id = None;
        self.category = None;
        self.values.clear();
        self.code.reset();
        self.name.reset();
        self.state = DerivationState::Empty;
    }

    /// Switch category. Values entered for the previous category's
    /// parameters are dropped.
    pub fn set_category(&mut self, category: Option<i64>, snapshot: &ReferenceSnapshot) -> DerivationState {
        if self.category == category {
            return self.state;
        }
        self.category = category;
        self.values.clear();
        self.refresh(snapshot)
    }

    pub fn set_param(&mut self, param: i64, value: &str, snapshot: &ReferenceSnapshot) -> DerivationState {
        if self.values.get(&param).map(String::as_str) == Some(value) {
            return self.state;
        }
        self.values.insert(param, value.to_string());
        self.refresh(snapshot)
    }

    pub fn edit_code(&mut self, value: impl Into<String>) {
        self.code.edit(value);
    }

    pub fn edit_name(&mut self, value: impl Into<String>) {
        self.name.edit(value);
    }

    /// Load a stored material, then reconcile it with derivation.
    pub fn fill(&mut self, record: &MaterialRecord, snapshot: &ReferenceSnapshot) -> DerivationState {
        self.reset();
        self.id = record.id;
        self.category = record.category;
        self.values = record
            .param_values
            .iter()
            .map(|pv| (pv.param, pv.value.clone()))
            .collect();

        let (code, name) = self.derived(snapshot);
        self.code.load(record.code.clone(), &code);
        self.name.load(record.name.clone(), &name);
        self.refresh(snapshot)
    }

    /// `(code, name)` for the current inputs.
    pub fn derived(&self, snapshot: &ReferenceSnapshot) -> (String, String) {
        let Some(category_id) = self.category else {
            return (String::new(), String::new());
        };
        let category = snapshot.category(category_id);
        let params = snapshot.params_for(category_id);
        (
            self.templates
                .material(category, &params, &self.values, MaterialBase::Code),
            self.templates
                .material(category, &params, &self.values, MaterialBase::DisplayName),
        )
    }

    pub fn apply(&mut self, event: MaterialEvent, snapshot: &ReferenceSnapshot) -> DerivationState {
        match event {
            MaterialEvent::SetCategory { category } => self.set_category(category, snapshot),
            MaterialEvent::SetParam { param, value } => self.set_param(param, &value, snapshot),
            MaterialEvent::EditCode { value } => {
                self.edit_code(value);
                self.state
            }
            MaterialEvent::EditName { value } => {
                self.edit_name(value);
                self.state
            }
            MaterialEvent::Fill { record } => self.fill(&record, snapshot),
            MaterialEvent::Reset => {
                self.reset();
                self.state
            }
        }
    }

    /// The form contents as a record. Parameter values are listed by id.
    pub fn record(&self) -> MaterialRecord {
        MaterialRecord {
            id: self.id,
            code: self.code.value().to_string(),
            name: self.name.value().to_string(),
            category: self.category,
            param_values: self
                .values
                .iter()
                .map(|(param, value)| ParamValue {
                    param: *param,
                    value: value.clone(),
                })
                .collect(),
        }
    }

    pub fn submit(&self) -> Result<MaterialRecord, FormError> {
        let record = self.record();
        let violations = forms::validate(FormKind::Material, &record.fields());
        if violations.is_empty() {
            Ok(record)
        } else {
            Err(FormError::Invalid { violations })
        }
    }

    fn refresh(&mut self, snapshot: &ReferenceSnapshot) -> DerivationState {
        let (code, name) = self.derived(snapshot);
        self.code.regenerate(&code);
        self.name.regenerate(&name);

        self.state = match self.category {
            None => DerivationState::Empty,
            Some(_) if code.is_empty() && name.is_empty() => DerivationState::Partial,
            Some(_) => DerivationState::Derived,
        };

        tracing::debug!(
            category = ?self.category,
            state = ?self.state,
            code = self.code.value(),
            name = self.name.value(),
            "Refreshed material fields"
        );
        self.state
    }
}

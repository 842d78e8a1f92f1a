//! Per-form derivation state for BOMs and process routes.
//!
//! One [`DerivationSession`] is owned by each open form. It keeps the form
//! fields together with the last values it generated, so a description the
//! user typed is never silently replaced while auto-generated ones keep
//! following the parent and version.

use mes_common::lenient;
use serde::{Deserialize, Serialize};

use super::field::{DerivedField, FieldPolicies};
use super::snapshot::{ParentKind, ReferenceSnapshot};
use super::template::{DescriptionTemplate, Templates};
use crate::errors::FormError;
use crate::forms::{self, FormKind};

/// Dependent record types whose code and description are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Bill of materials of a product: `code-version`, `name-version`.
    Bom,
    /// Process route of a product: `code-version`, `code-name-version`.
    ProcessRoute,
    /// Process route shared by a category: `code-version`, `code-display_name-version`.
    CategoryRoute,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Bom => "bom",
            EntityKind::ProcessRoute => "process-route",
            EntityKind::CategoryRoute => "category-route",
        }
    }

    pub fn parent_kind(&self) -> ParentKind {
        match self {
            EntityKind::Bom | EntityKind::ProcessRoute => ParentKind::Product,
            EntityKind::CategoryRoute => ParentKind::Category,
        }
    }

    pub fn description_template(&self) -> DescriptionTemplate {
        match self {
            EntityKind::Bom => DescriptionTemplate::LabelVersion,
            EntityKind::ProcessRoute | EntityKind::CategoryRoute => {
                DescriptionTemplate::CodeLabelVersion
            }
        }
    }

    pub fn form_kind(&self) -> FormKind {
        match self {
            EntityKind::Bom => FormKind::Bom,
            EntityKind::ProcessRoute => FormKind::ProcessRoute,
            EntityKind::CategoryRoute => FormKind::CategoryRoute,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "bom" => Ok(EntityKind::Bom),
            "process-route" | "process-code" => Ok(EntityKind::ProcessRoute),
            "category-route" | "category-process-code" => Ok(EntityKind::CategoryRoute),
            _ => anyhow::bail!(
                "Invalid entity kind '{}'. Valid values: bom, process-route, category-route",
                s
            ),
        }
    }
}

/// Progress of a form towards derivable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationState {
    /// Neither parent nor version chosen.
    Empty,
    /// One of them is missing, or the parent cannot be resolved.
    Partial,
    /// Fields were derived from the current inputs.
    Derived,
}

/// Form-shaped record of a derived entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivableEntity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub description: String,
    /// Product or category id, depending on the entity kind.
    #[serde(
        default,
        alias = "product",
        alias = "category",
        deserialize_with = "lenient::id_or_none"
    )]
    pub parent: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub version: String,
}

impl DerivableEntity {
    /// Field values as seen by the form rules.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("parent", self.parent.map(|id| id.to_string()).unwrap_or_default()),
            ("code", self.code.clone()),
            ("description", self.description.clone()),
            ("version", self.version.clone()),
        ]
    }
}

/// A change made in the form, as the UI shell reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormEvent {
    SetParent {
        #[serde(default)]
        parent: Option<i64>,
    },
    SetVersion {
        version: String,
    },
    EditCode {
        value: String,
    },
    EditDescription {
        value: String,
    },
    Fill {
        record: DerivableEntity,
    },
    Reset,
}

#[derive(Debug, Clone)]
pub struct DerivationSession {
    kind: EntityKind,
    templates: Templates,
    id: Option<i64>,
    parent: Option<i64>,
    version: String,
    code: DerivedField,
    description: DerivedField,
    state: DerivationState,
}

impl DerivationSession {
    pub fn new(kind: EntityKind, templates: Templates, policies: FieldPolicies) -> Self {
        Self {
            kind,
            templates,
            id: None,
            parent: None,
            version: String::new(),
            code: DerivedField::new(policies.code),
            description: DerivedField::new(policies.label),
            state: DerivationState::Empty,
        }
    }

    pub fn with_defaults(kind: EntityKind) -> Self {
        Self::new(kind, Templates::default(), FieldPolicies::default())
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn state(&self) -> DerivationState {
        self.state
    }

    pub fn parent(&self) -> Option<i64> {
        self.parent
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn code(&self) -> &str {
        self.code.value()
    }

    pub fn description(&self) -> &str {
        self.description.value()
    }

    /// True when the description holds a value the user typed.
    pub fn description_is_manual(&self) -> bool {
        self.description.is_manual()
    }

    /// Clear every field and the generation memory.
    pub fn reset(&mut self) {
        self.id = None;
        self.parent = None;
        self.version.clear();
        self.code.reset();
        self.description.reset();
        self.state = DerivationState::Empty;
    }

    /// Change the parent reference. Re-derives only when the value changes.
    pub fn set_parent(&mut self, parent: Option<i64>, snapshot: &ReferenceSnapshot) -> DerivationState {
        if self.parent == parent {
            return self.state;
        }
        self.parent = parent;
        self.refresh(snapshot)
    }

    /// Change the version token. Re-derives only when the value changes.
    pub fn set_version(&mut self, version: &str, snapshot: &ReferenceSnapshot) -> DerivationState {
        if self.version == version {
            return self.state;
        }
        self.version = version.to_string();
        self.refresh(snapshot)
    }

    pub fn edit_code(&mut self, value: impl Into<String>) {
        self.code.edit(value);
    }

    pub fn edit_description(&mut self, value: impl Into<String>) {
        self.description.edit(value);
    }

    /// Load an existing record for editing, then reconcile it with derivation.
    ///
    /// A stored description equal to what the stored inputs derive counts as
    /// generated and keeps following later changes; any other stored
    /// description is kept as a manual value.
    pub fn fill(&mut self, record: &DerivableEntity, snapshot: &ReferenceSnapshot) -> DerivationState {
        self.reset();
        self.id = record.id;
        self.parent = record.parent;
        self.version = record.version.clone();

        let (code, description) = self.derived(snapshot);
        self.code.load(record.code.clone(), &code);
        self.description.load(record.description.clone(), &description);
        self.refresh(snapshot)
    }

    /// What the current inputs derive to, without touching the form.
    pub fn derived(&self, snapshot: &ReferenceSnapshot) -> (String, String) {
        let parent = self
            .parent
            .and_then(|id| snapshot.parent(self.kind.parent_kind(), id));
        (
            self.templates.code(parent, &self.version),
            self.templates
                .description_with(parent, &self.version, self.kind.description_template()),
        )
    }

    /// Apply one form event.
    pub fn apply(&mut self, event: FormEvent, snapshot: &ReferenceSnapshot) -> DerivationState {
        match event {
            FormEvent::SetParent { parent } => self.set_parent(parent, snapshot),
            FormEvent::SetVersion { version } => self.set_version(&version, snapshot),
            FormEvent::EditCode { value } => {
                self.edit_code(value);
                self.state
            }
            FormEvent::EditDescription { value } => {
                self.edit_description(value);
                self.state
            }
            FormEvent::Fill { record } => self.fill(&record, snapshot),
            FormEvent::Reset => {
                self.reset();
                self.state
            }
        }
    }

    /// The form contents as a record.
    pub fn record(&self) -> DerivableEntity {
        DerivableEntity {
            id: self.id,
            code: self.code.value().to_string(),
            description: self.description.value().to_string(),
            parent: self.parent,
            version: self.version.clone(),
        }
    }

    /// Validate the form and hand back the record to persist.
    pub fn submit(&self) -> Result<DerivableEntity, FormError> {
        let record = self.record();
        let violations = forms::validate(self.kind.form_kind(), &record.fields());
        if violations.is_empty() {
            Ok(record)
        } else {
            Err(FormError::Invalid { violations })
        }
    }

    fn refresh(&mut self, snapshot: &ReferenceSnapshot) -> DerivationState {
        let (code, description) = self.derived(snapshot);
        self.code.regenerate(&code);
        self.description.regenerate(&description);

        self.state = if !code.is_empty() || !description.is_empty() {
            DerivationState::Derived
        } else if self.parent.is_none() && self.version.trim().is_empty() {
            DerivationState::Empty
        } else {
            DerivationState::Partial
        };

        tracing::debug!(
            kind = %self.kind,
            state = ?self.state,
            code = self.code.value(),
            description = self.description.value(),
            "Refreshed derived fields"
        );
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::FieldPolicy;
    use mes_common::ReferenceData;

    fn snapshot() -> ReferenceSnapshot {
        let data: ReferenceData = serde_json::from_str(
            r#"{
                "categories": [{"id": 1, "code": "CAT1", "display_name": "Widget"}],
                "products": [
                    {"id": 7, "code": "P-100", "name": "螺栓", "category": 1},
                    {"id": 8, "code": "P-200", "name": "螺母", "category": 1}
                ]
            }"#,
        )
        .unwrap();
        ReferenceSnapshot::new(data)
    }

    #[test]
    fn test_state_progression() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::CategoryRoute);
        assert_eq!(session.state(), DerivationState::Empty);
        assert_eq!(session.set_parent(Some(1), &snap), DerivationState::Partial);
        assert_eq!(session.set_version("A", &snap), DerivationState::Derived);
        assert_eq!(session.code(), "CAT1-A");
        assert_eq!(session.description(), "CAT1-Widget-A");
    }

    #[test]
    fn test_manual_description_survives_version_change() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::CategoryRoute);
        session.set_parent(Some(1), &snap);
        session.set_version("A", &snap);
        assert_eq!(session.description(), "CAT1-Widget-A");

        session.edit_description("custom text");
        session.set_version("B", &snap);

        assert_eq!(session.code(), "CAT1-B");
        assert_eq!(session.description(), "custom text");
        assert!(session.description_is_manual());
    }

    #[test]
    fn test_generated_description_follows_parent_change() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);
        assert_eq!(session.description(), "螺栓-A");

        session.set_parent(Some(8), &snap);
        assert_eq!(session.code(), "P-200-A");
        assert_eq!(session.description(), "螺母-A");
    }

    #[test]
    fn test_code_policy_always_overwrites_manual_code() {
        // Observed behaviour: the code follows every change even after an edit
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);
        session.edit_code("HAND-1");
        session.set_version("B", &snap);
        assert_eq!(session.code(), "P-100-B");
    }

    #[test]
    fn test_code_policy_preserve_manual_keeps_manual_code() {
        let snap = snapshot();
        let policies = FieldPolicies {
            code: FieldPolicy::PreserveManual,
            label: FieldPolicy::PreserveManual,
        };
        let mut session = DerivationSession::new(EntityKind::Bom, Templates::default(), policies);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);
        session.edit_code("HAND-1");
        session.set_version("B", &snap);
        assert_eq!(session.code(), "HAND-1");
        assert_eq!(session.description(), "螺栓-B");
    }

    #[test]
    fn test_unresolvable_parent_clears_generated_fields() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);

        assert_eq!(session.set_parent(Some(999), &snap), DerivationState::Partial);
        assert_eq!(session.code(), "");
        assert_eq!(session.description(), "");

        let err = session.submit().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["code"]);
    }

    #[test]
    fn test_cleared_version_clears_generated_fields() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);

        assert_eq!(session.set_version("", &snap), DerivationState::Partial);
        assert_eq!(session.code(), "");
        assert_eq!(session.description(), "");
        assert!(session.submit().is_err());
    }

    #[test]
    fn test_state_tracks_field_contents_after_regression() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::CategoryRoute);
        session.set_parent(Some(1), &snap);
        assert_eq!(session.set_version("A", &snap), DerivationState::Derived);

        assert_eq!(session.set_parent(None, &snap), DerivationState::Partial);
        assert_eq!(session.code(), "");
        assert_eq!(session.description(), "");

        assert_eq!(session.set_version("", &snap), DerivationState::Empty);
        assert_eq!(session.record(), DerivableEntity::default());

        session.set_parent(Some(1), &snap);
        assert_eq!(session.set_version("B", &snap), DerivationState::Derived);
        assert_eq!(session.code(), "CAT1-B");
        assert_eq!(session.description(), "CAT1-Widget-B");
    }

    #[test]
    fn test_manual_description_survives_unresolvable_parent() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);
        session.edit_description("custom text");

        session.set_parent(Some(999), &snap);
        assert_eq!(session.code(), "");
        assert_eq!(session.description(), "custom text");

        session.set_parent(Some(8), &snap);
        assert_eq!(session.code(), "P-200-A");
        assert_eq!(session.description(), "custom text");
    }

    #[test]
    fn test_setting_same_value_does_not_rederive() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);
        session.edit_code("HAND-1");
        session.set_version("A", &snap);
        assert_eq!(session.code(), "HAND-1");
    }

    #[test]
    fn test_reset_then_refill_reproduces_derivation() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::ProcessRoute);
        session.set_parent(Some(7), &snap);
        session.set_version("A", &snap);
        let original = session.record();
        assert_eq!(original.code, "P-100-A");
        assert_eq!(original.description, "P-100-螺栓-A");

        session.reset();
        assert_eq!(session.record(), DerivableEntity::default());

        session.fill(&original, &snap);
        assert_eq!(session.record(), original);
        assert_eq!(session.state(), DerivationState::Derived);
    }

    #[test]
    fn test_fill_keeps_stored_manual_description() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        let stored = DerivableEntity {
            id: Some(3),
            code: "P-100-A".to_string(),
            description: "螺栓的默认BOM".to_string(),
            parent: Some(7),
            version: "A".to_string(),
        };
        session.fill(&stored, &snap);
        assert!(session.description_is_manual());

        session.set_version("B", &snap);
        assert_eq!(session.code(), "P-100-B");
        assert_eq!(session.description(), "螺栓的默认BOM");
        assert_eq!(session.record().id, Some(3));
    }

    #[test]
    fn test_fill_regenerates_stale_code() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        let stored = DerivableEntity {
            code: "LEGACY".to_string(),
            parent: Some(7),
            version: "A".to_string(),
            ..DerivableEntity::default()
        };
        session.fill(&stored, &snap);
        assert_eq!(session.code(), "P-100-A");
        assert_eq!(session.description(), "螺栓-A");
    }

    #[test]
    fn test_sessions_do_not_share_memory() {
        let snap = snapshot();
        let mut first = DerivationSession::with_defaults(EntityKind::Bom);
        let mut second = DerivationSession::with_defaults(EntityKind::Bom);
        first.set_parent(Some(7), &snap);
        first.set_version("A", &snap);
        first.edit_description("mine");

        second.set_parent(Some(7), &snap);
        second.set_version("A", &snap);
        second.set_version("B", &snap);

        assert_eq!(first.description(), "mine");
        assert_eq!(second.description(), "螺栓-B");
    }

    #[test]
    fn test_apply_events() {
        let snap = snapshot();
        let events: Vec<FormEvent> = serde_json::from_str(
            r#"[
                {"op": "set_parent", "parent": 7},
                {"op": "set_version", "version": "A"},
                {"op": "edit_description", "value": "custom"},
                {"op": "set_version", "version": "B"}
            ]"#,
        )
        .unwrap();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        for event in events {
            session.apply(event, &snap);
        }
        assert_eq!(session.code(), "P-100-B");
        assert_eq!(session.description(), "custom");
    }

    #[test]
    fn test_submit_validates() {
        let snap = snapshot();
        let mut session = DerivationSession::with_defaults(EntityKind::Bom);
        session.set_parent(Some(7), &snap);
        let err = session.submit().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["code", "version"]);

        session.set_version("A", &snap);
        let record = session.submit().unwrap();
        assert_eq!(record.code, "P-100-A");
    }

    #[test]
    fn test_record_accepts_string_product_id() {
        let record: DerivableEntity =
            serde_json::from_str(r#"{"product": "7", "name": "x", "version": "A"}"#).unwrap();
        assert_eq!(record.parent, Some(7));
    }

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("bom".parse::<EntityKind>().unwrap(), EntityKind::Bom);
        assert_eq!(
            "process_route".parse::<EntityKind>().unwrap(),
            EntityKind::ProcessRoute
        );
        assert!("workorder".parse::<EntityKind>().is_err());
    }
}

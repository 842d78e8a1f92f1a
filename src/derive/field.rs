//! A single auto-generated form field and its manual-edit memory.

use serde::{Deserialize, Serialize};

/// When regeneration may overwrite the current value of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldPolicy {
    /// Overwrite on every regeneration, even after a manual edit.
    Always,
    /// Overwrite only while the value is empty or still the last generated one.
    PreserveManual,
}

impl std::fmt::Display for FieldPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPolicy::Always => write!(f, "always"),
            FieldPolicy::PreserveManual => write!(f, "preserve-manual"),
        }
    }
}

impl std::str::FromStr for FieldPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(FieldPolicy::Always),
            "preserve-manual" | "preserve_manual" => Ok(FieldPolicy::PreserveManual),
            _ => anyhow::bail!(
                "Invalid field policy '{}'. Valid values: always, preserve-manual",
                s
            ),
        }
    }
}

/// Policies for the identifier field and the label field of a form.
///
/// The identifier is the `code`; the label is the `description` (or the
/// material `name`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicies {
    pub code: FieldPolicy,
    pub label: FieldPolicy,
}

impl Default for FieldPolicies {
    fn default() -> Self {
        Self {
            code: FieldPolicy::Always,
            label: FieldPolicy::PreserveManual,
        }
    }
}

/// Current value of a derived field plus the value last generated for it.
///
/// The memory is per field instance, so two open forms never share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedField {
    value: String,
    last_generated: Option<String>,
    policy: FieldPolicy,
}

impl DerivedField {
    pub fn new(policy: FieldPolicy) -> Self {
        Self {
            value: String::new(),
            last_generated: None,
            policy,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    pub fn last_generated(&self) -> Option<&str> {
        self.last_generated.as_deref()
    }

    /// True when the value is non-empty and differs from the last generated one.
    pub fn is_manual(&self) -> bool {
        !self.value.is_empty() && self.last_generated.as_deref() != Some(self.value.as_str())
    }

    /// Record a value typed by the user.
    pub fn edit(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Load a stored value without generating anything.
    ///
    /// `baseline` is what derivation produces for the stored inputs; a stored
    /// value equal to it counts as generated rather than manual.
    pub fn load(&mut self, value: impl Into<String>, baseline: &str) {
        self.value = value.into();
        self.last_generated = (!baseline.is_empty()).then(|| baseline.to_string());
    }

    /// Offer a freshly derived value. Returns whether the field changed.
    ///
    /// An empty derivation means "not derivable yet": a generated value is
    /// cleared, a manual one survives under `PreserveManual`.
    pub fn regenerate(&mut self, derived: &str) -> bool {
        let writable = match self.policy {
            FieldPolicy::Always => true,
            FieldPolicy::PreserveManual => !self.is_manual(),
        };
        self.last_generated = (!derived.is_empty()).then(|| derived.to_string());
        if writable && self.value != derived {
            self.value = derived.to_string();
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.value.clear();
        self.last_generated = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regenerate_fills_empty_field() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        assert!(field.regenerate("CAT1-Widget-A"));
        assert_eq!(field.value(), "CAT1-Widget-A");
        assert!(!field.is_manual());
    }

    #[test]
    fn test_preserve_manual_keeps_user_edit() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        field.regenerate("CAT1-Widget-A");
        field.edit("custom text");
        assert!(field.is_manual());
        assert!(!field.regenerate("CAT1-Widget-B"));
        assert_eq!(field.value(), "custom text");
        assert_eq!(field.last_generated(), Some("CAT1-Widget-B"));
    }

    #[test]
    fn test_preserve_manual_resumes_after_clearing() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        field.regenerate("A-1");
        field.edit("mine");
        field.regenerate("A-2");
        field.edit("");
        assert!(field.regenerate("A-3"));
        assert_eq!(field.value(), "A-3");
    }

    #[test]
    fn test_always_overwrites_user_edit() {
        let mut field = DerivedField::new(FieldPolicy::Always);
        field.regenerate("CAT1-A");
        field.edit("HAND-MADE");
        assert!(field.regenerate("CAT1-B"));
        assert_eq!(field.value(), "CAT1-B");
    }

    #[test]
    fn test_empty_derivation_clears_generated_value() {
        let mut field = DerivedField::new(FieldPolicy::Always);
        field.regenerate("CAT1-A");
        assert!(field.regenerate(""));
        assert_eq!(field.value(), "");
        assert_eq!(field.last_generated(), None);
        assert!(!field.regenerate(""));
    }

    #[test]
    fn test_empty_derivation_clears_manual_value_under_always() {
        let mut field = DerivedField::new(FieldPolicy::Always);
        field.regenerate("CAT1-A");
        field.edit("HAND-MADE");
        assert!(field.regenerate(""));
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_empty_derivation_keeps_manual_value() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        field.regenerate("螺栓-A");
        field.edit("custom text");
        assert!(!field.regenerate(""));
        assert_eq!(field.value(), "custom text");
        assert_eq!(field.last_generated(), None);
        assert!(field.is_manual());

        // Still manual once the inputs resolve again
        assert!(!field.regenerate("螺栓-B"));
        assert_eq!(field.value(), "custom text");
    }

    #[test]
    fn test_load_matching_baseline_counts_as_generated() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        field.load("螺栓-A", "螺栓-A");
        assert!(!field.is_manual());
        assert!(field.regenerate("螺栓-B"));
    }

    #[test]
    fn test_load_differing_value_counts_as_manual() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        field.load("imported by hand", "螺栓-A");
        assert!(field.is_manual());
        assert!(!field.regenerate("螺栓-B"));
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut field = DerivedField::new(FieldPolicy::PreserveManual);
        field.regenerate("X-A");
        field.reset();
        assert_eq!(field.value(), "");
        assert_eq!(field.last_generated(), None);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("always".parse::<FieldPolicy>().unwrap(), FieldPolicy::Always);
        assert_eq!(
            "preserve-manual".parse::<FieldPolicy>().unwrap(),
            FieldPolicy::PreserveManual
        );
        assert!("sometimes".parse::<FieldPolicy>().is_err());
    }
}

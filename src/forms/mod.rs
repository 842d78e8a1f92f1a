//! Submit-time validation of derived forms.

pub mod rules;

pub use rules::{FieldRule, FormKind, Violation, rules_for, validate};

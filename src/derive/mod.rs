//! Derived-field generation for dependent records.
//!
//! BOMs, process routes and materials get their `code` and their description
//! (or name) generated from a parent entity plus a version or a set of
//! parameter values. The pieces:
//!
//! - `template`: pure string templates
//! - `field`: one generated field and the memory of what was generated
//! - `snapshot`: read-only reference data lookups
//! - `session`: per-form state for BOMs and process routes
//! - `material`: per-form state for materials

pub mod field;
pub mod material;
pub mod session;
pub mod snapshot;
pub mod template;

pub use field::{DerivedField, FieldPolicies, FieldPolicy};
pub use material::{MaterialEvent, MaterialRecord, MaterialSession};
pub use session::{DerivableEntity, DerivationSession, DerivationState, EntityKind, FormEvent};
pub use snapshot::{ParentKind, ReferenceSnapshot};
pub use template::{
    DEFAULT_SEPARATOR, DescriptionTemplate, MaterialBase, Parent, Templates, derive_code,
    derive_description, derive_material_code_or_name,
};

//! Shared domain types for the MES kernel.
//!
//! These are the wire shapes exchanged with the transport layer: menu trees
//! and flat menu records for access control, and the reference entities
//! (categories, products, parameter definitions) that derived fields are
//! computed from.

pub mod entity;
pub mod lenient;
pub mod menu;

pub use entity::{Category, ParamDefinition, ParamValue, Product, ReferenceData};
pub use menu::{MenuNode, MenuRecord, MenuResponse};

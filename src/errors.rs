//! Typed error hierarchy for the MES kernel.
//!
//! The access and derivation kernels never fail; these enums cover the
//! layers around them:
//! - `LoadError`: reading JSON inputs (menus, snapshots, event scripts)
//! - `FormError`: submitting a derived form that does not pass its rules

use thiserror::Error;

use crate::forms::Violation;

/// Errors from loading JSON input files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from submitting a form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Form has {} invalid field(s): {}", .violations.len(), summarize(.violations))]
    Invalid { violations: Vec<Violation> },
}

impl FormError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            FormError::Invalid { violations } => violations,
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_read_carries_path() {
        use std::path::PathBuf;
        let path = PathBuf::from("/data/menus.json");
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = LoadError::Read {
            path: path.clone(),
            source: io_err,
        };
        match &err {
            LoadError::Read { path: p, source: s } => {
                assert_eq!(p, &path);
                assert_eq!(s.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Read"),
        }
        assert!(err.to_string().contains("/data/menus.json"));
    }

    #[test]
    fn form_error_lists_every_violation() {
        let err = FormError::Invalid {
            violations: vec![
                Violation::new("version", "Version is required"),
                Violation::new("code", "Code must be at most 50 characters"),
            ],
        };
        let message = err.to_string();
        assert!(message.starts_with("Form has 2 invalid field(s)"));
        assert!(message.contains("version: Version is required"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let load_err = LoadError::Read {
            path: "x".into(),
            source: std::io::Error::other("x"),
        };
        assert_std_error(&load_err);
        let form_err = FormError::Invalid { violations: vec![] };
        assert_std_error(&form_err);
    }
}

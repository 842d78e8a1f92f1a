//! Permission menu shapes.
//!
//! The backend stores menus as flat [`MenuRecord`]s linked by parent id and
//! returns them to the client as a [`MenuResponse`] tree of [`MenuNode`]s.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// One entry of a permission menu tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Route path, absolute or relative. Grouping nodes carry none.
    #[serde(
        default,
        deserialize_with = "lenient::string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Create a leaf node for `path`.
    pub fn leaf(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Create a grouping node without a path.
    pub fn group(name: impl Into<String>, children: Vec<MenuNode>) -> Self {
        Self {
            name: Some(name.into()),
            children,
            ..Self::default()
        }
    }

    /// Attach children to this node.
    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }

    /// The node's path if it has a non-blank one.
    pub fn route(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

/// Body of the menu endpoint: `{ "menus": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuResponse {
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub menus: Vec<MenuNode>,
}

/// A menu row as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub path: String,
    #[serde(default)]
    pub parent: Option<i64>,
    /// Names of the user groups the menu is granted to.
    #[serde(default)]
    pub groups: Vec<String>,
}

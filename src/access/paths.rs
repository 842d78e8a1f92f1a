//! Path normalization and menu tree flattening.

use mes_common::MenuNode;
use std::collections::HashSet;

/// Path separator used by every route.
pub const SEPARATOR: char = '/';

/// Normalize a route path to exactly one leading separator.
///
/// Surrounding whitespace and trailing separators are dropped, so
/// `"workorders"`, `"//workorders"` and `"/workorders/"` all become
/// `"/workorders"`. A blank path normalizes to the root `"/"`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches(SEPARATOR);
    let mut normalized = String::with_capacity(trimmed.len() + 1);
    normalized.push(SEPARATOR);
    normalized.push_str(trimmed);
    normalized
}

/// Iterate the non-empty segments of a path.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// The set of normalized paths a user may visit.
///
/// Membership is order independent; insertion order is kept so the paths can
/// be listed in the depth-first order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedPathSet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl AllowedPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path, normalizing it first. Returns `false` for duplicates.
    pub fn insert(&mut self, path: &str) -> bool {
        let normalized = normalize_path(path);
        if self.members.insert(normalized.clone()) {
            self.ordered.push(normalized);
            true
        } else {
            false
        }
    }

    /// Check membership of an already normalized path.
    pub fn contains(&self, normalized: &str) -> bool {
        self.members.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Paths in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for AllowedPathSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path.as_ref());
        }
        set
    }
}

/// Flatten a single menu tree, the root included, depth first.
pub fn extract_paths(tree: &MenuNode) -> AllowedPathSet {
    let mut set = AllowedPathSet::new();
    collect(tree, &mut set);
    set
}

/// Flatten a list of root menus, depth first.
pub fn extract_forest(menus: &[MenuNode]) -> AllowedPathSet {
    let mut set = AllowedPathSet::new();
    for menu in menus {
        collect(menu, &mut set);
    }
    set
}

fn collect(node: &MenuNode, set: &mut AllowedPathSet) {
    // Grouping nodes have no route of their own
    if let Some(route) = node.route() {
        set.insert(route);
    }
    for child in &node.children {
        collect(child, set);
    }
}

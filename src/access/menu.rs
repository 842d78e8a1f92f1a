//! Menu tree construction from flat menu records.
//!
//! Members of the super-administrator group see every menu. Everyone else
//! sees the menus granted to at least one of their groups. A visible menu
//! whose parent is hidden (or missing) is promoted to a root so its route is
//! still reachable.

use mes_common::{MenuNode, MenuRecord};
use std::collections::{HashMap, HashSet};

/// Build the menu forest visible to a user belonging to `user_groups`.
///
/// Record order is preserved for roots and for siblings. Duplicate ids keep
/// the first record.
pub fn build_menu_tree(
    records: &[MenuRecord],
    user_groups: &[String],
    super_admin_group: &str,
) -> Vec<MenuNode> {
    let is_super_admin = user_groups.iter().any(|group| group == super_admin_group);

    let mut seen = HashSet::new();
    let visible: Vec<&MenuRecord> = records
        .iter()
        .filter(|record| seen.insert(record.id))
        .filter(|record| is_super_admin || granted(record, user_groups))
        .collect();

    let visible_ids: HashSet<i64> = visible.iter().map(|record| record.id).collect();
    let mut children: HashMap<i64, Vec<&MenuRecord>> = HashMap::new();
    let mut roots = Vec::new();

    for record in &visible {
        match record.parent {
            Some(parent) if parent != record.id && visible_ids.contains(&parent) => {
                children.entry(parent).or_default().push(*record);
            }
            _ => roots.push(*record),
        }
    }

    tracing::debug!(
        visible = visible.len(),
        roots = roots.len(),
        super_admin = is_super_admin,
        "Built menu tree"
    );

    roots
        .into_iter()
        .map(|record| to_node(record, &children))
        .collect()
}

fn granted(record: &MenuRecord, user_groups: &[String]) -> bool {
    record
        .groups
        .iter()
        .any(|group| user_groups.iter().any(|user_group| user_group == group))
}

fn to_node(record: &MenuRecord, children: &HashMap<i64, Vec<&MenuRecord>>) -> MenuNode {
    // Each record has a single parent, so recursion from the roots cannot revisit a node
    let nested = children
        .get(&record.id)
        .map(|kids| kids.iter().map(|kid| to_node(kid, children)).collect())
        .unwrap_or_default();

    MenuNode {
        id: Some(record.id),
        name: Some(record.name.clone()),
        path: Some(record.path.clone()),
        children: nested,
    }
}

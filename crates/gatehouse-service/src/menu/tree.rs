use std::collections::{HashMap, HashSet};

use gatehouse_core::constants::ROOT_PARENT_ID;
use gatehouse_db::model::menu::Menu;
use serde::Serialize;

/// A menu entry with its children, as rendered by the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Whether this node or any descendant satisfies `predicate`.
    pub fn any(&self, predicate: &impl Fn(&Menu) -> bool) -> bool {
        predicate(&self.menu) || self.children.iter().any(|child| child.any(predicate))
    }
}

/// ## Summary
/// Arranges a flat list of entries into a forest rooted at parent `"0"`.
///
/// Entries are stable-sorted by `sort` first, so siblings keep ascending sort
/// order and equal keys keep their input order. Entries whose parent is not in
/// the list are unreachable and left out. Each entry is placed at most once,
/// which keeps malformed parent chains from looping.
#[must_use]
pub fn build_tree(mut entries: Vec<Menu>) -> Vec<MenuNode> {
    entries.sort_by_key(|menu| menu.sort);

    let mut by_parent: HashMap<String, Vec<Menu>> = HashMap::new();
    for menu in entries {
        by_parent.entry(menu.parent_id.clone()).or_default().push(menu);
    }

    let mut placed = HashSet::new();
    attach_children(ROOT_PARENT_ID, &mut by_parent, &mut placed)
}

fn attach_children(
    parent_key: &str,
    by_parent: &mut HashMap<String, Vec<Menu>>,
    placed: &mut HashSet<i64>,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.remove(parent_key) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for menu in siblings {
        if !placed.insert(menu.id) {
            continue;
        }
        let children = attach_children(&menu.id.to_string(), by_parent, placed);
        nodes.push(MenuNode { menu, children });
    }
    nodes
}

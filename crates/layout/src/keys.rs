// Structural keys
//
// Depth-first walk, parent before children. The root is visited with an
// empty prefix; an identified node hands `prefix.id` to its children, an
// anonymous one hands its own prefix through unchanged.
//
//   main                 prefix ""
//   └─ detail            prefix ".main"
//      └─ leftRight      prefix ".main.detail"   → path ".main.detail.leftRight"

use crate::tree::{non_blank, LayoutNode};

/// Prefix handed to the children of a node with `id` seen under `prefix`
pub fn child_prefix(prefix: &str, id: Option<&str>) -> String {
    match non_blank(id) {
        Some(id) => format!("{prefix}.{id}"),
        None => prefix.to_string(),
    }
}

/// Full path of an identified node; anonymous nodes have none
pub fn node_path(prefix: &str, id: Option<&str>) -> Option<String> {
    non_blank(id).map(|id| format!("{prefix}.{id}"))
}

/// Visit every node reachable from `root` with its prefix.
///
/// Returns false if `visit` stopped the walk.
pub fn traverse<'a, F>(root: &'a dyn LayoutNode, mut visit: F) -> bool
where
    F: FnMut(&str, &'a dyn LayoutNode) -> bool,
{
    walk("", root, &mut visit)
}

fn walk<'a>(
    prefix: &str,
    node: &'a dyn LayoutNode,
    visit: &mut dyn FnMut(&str, &'a dyn LayoutNode) -> bool,
) -> bool {
    if !visit(prefix, node) {
        return false;
    }
    let children = node.children();
    if children.is_empty() {
        return true;
    }
    let prefix = child_prefix(prefix, node.local_id());
    children.into_iter().all(|child| walk(&prefix, child, visit))
}

/// [`traverse`] with mutable access to each node
pub fn traverse_mut<F>(root: &mut dyn LayoutNode, mut visit: F) -> bool
where
    F: FnMut(&str, &mut dyn LayoutNode) -> bool,
{
    walk_mut("", root, &mut visit)
}

fn walk_mut(
    prefix: &str,
    node: &mut dyn LayoutNode,
    visit: &mut dyn FnMut(&str, &mut dyn LayoutNode) -> bool,
) -> bool {
    if !visit(prefix, &mut *node) {
        return false;
    }
    let prefix = child_prefix(prefix, node.local_id());
    for child in node.children_mut() {
        if !walk_mut(&prefix, child, visit) {
            return false;
        }
    }
    true
}

/// The node whose full path is `path`, e.g. `".main.detail.leftRight"`
pub fn find_node<'a>(root: &'a dyn LayoutNode, path: &str) -> Option<&'a dyn LayoutNode> {
    let mut found = None;
    traverse(root, |prefix, node| {
        if node_path(prefix, node.local_id()).as_deref() == Some(path) {
            found = Some(node);
            return false;
        }
        true
    });
    found
}

pub fn contains_path(root: &dyn LayoutNode, path: &str) -> bool {
    find_node(root, path).is_some()
}

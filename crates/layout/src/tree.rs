// Abstract layout tree
//
// A UI toolkit adapts its widgets to these traits; the persistence code
// only ever sees local ids, children and the two capabilities below.

use crate::columns::ColumnNode;

/// Returns `id` when it is usable as a key segment
pub(crate) fn non_blank(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.trim().is_empty())
}

/// A node in the layout tree
pub trait LayoutNode {
    /// Identifier local to the node's parent. Blank ids are treated as absent.
    fn local_id(&self) -> Option<&str>;

    /// Child nodes in display order. Leaves return nothing.
    fn children(&self) -> Vec<&dyn LayoutNode>;

    fn children_mut(&mut self) -> Vec<&mut dyn LayoutNode>;

    fn as_splitter(&self) -> Option<&dyn Splitter> {
        None
    }

    fn as_splitter_mut(&mut self) -> Option<&mut dyn Splitter> {
        None
    }

    fn as_table(&self) -> Option<&dyn Tabular> {
        None
    }

    fn as_table_mut(&mut self) -> Option<&mut dyn Tabular> {
        None
    }
}

/// A container split into panes by movable dividers
pub trait Splitter {
    /// Divider positions as fractions of the container, left to right
    fn divider_positions(&self) -> Vec<f64>;

    fn set_divider_positions(&mut self, positions: &[f64]);

    /// How many dividers the live splitter has
    fn divider_count(&self) -> usize {
        self.divider_positions().len()
    }
}

/// Flat tables and tree tables store under different key families
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Flat,
    Tree,
}

impl TableKind {
    pub fn key_segment(self) -> &'static str {
        match self {
            TableKind::Flat => ".tableView",
            TableKind::Tree => ".treeTableView",
        }
    }
}

/// A table with a (possibly nested) list of columns
pub trait Tabular {
    fn kind(&self) -> TableKind;

    fn columns(&self) -> Vec<&dyn ColumnNode>;

    fn columns_mut(&mut self) -> Vec<&mut dyn ColumnNode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_ids_are_absent() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some("main")), Some("main"));
    }

    #[test]
    fn test_key_segments() {
        assert_eq!(TableKind::Flat.key_segment(), ".tableView");
        assert_eq!(TableKind::Tree.key_segment(), ".treeTableView");
    }
}

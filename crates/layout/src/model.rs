// In-memory layout model
//
// A plain serde tree implementing the layout traits. The CLI reads and
// writes it as JSON; embedders with a real widget tree implement the traits
// on their own types instead.
//
//   {
//     "x": 40.0, "y": 30.0, "width": 800.0, "height": 600.0,
//     "root": { "type": "container", "id": "main", "children": [
//       { "type": "split", "id": "leftRight", "dividers": [0.3],
//         "children": [ { "type": "leaf" }, { "type": "leaf" } ] } ] }
//   }

use serde::{Deserialize, Serialize};

use crate::columns::ColumnNode;
use crate::tree::{LayoutNode, Splitter, TableKind, Tabular};
use crate::window::{WindowBounds, WindowHandle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Container(Container),
    Split(SplitPane),
    Table(Table),
    Leaf(Leaf),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitPane {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub dividers: Vec<f64>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default = "flat")]
    pub kind: TableKind,
    #[serde(default)]
    pub columns: Vec<Column>,
}

fn flat() -> TableKind {
    TableKind::Flat
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Leaf {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
}

/// A top-level window with its content tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Window {
    #[serde(flatten)]
    pub bounds: WindowBounds,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Node>,
}

impl Node {
    pub fn container(id: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Container(Container {
            id: id.into(),
            children,
        })
    }

    pub fn split(id: impl Into<String>, dividers: Vec<f64>, children: Vec<Node>) -> Self {
        Node::Split(SplitPane {
            id: id.into(),
            dividers,
            children,
        })
    }

    pub fn table(id: impl Into<String>, kind: TableKind, columns: Vec<Column>) -> Self {
        Node::Table(Table {
            id: id.into(),
            kind,
            columns,
        })
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        Node::Leaf(Leaf { id: id.into() })
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Container(c) => &c.id,
            Node::Split(s) => &s.id,
            Node::Table(t) => &t.id,
            Node::Leaf(l) => &l.id,
        }
    }
}

impl LayoutNode for Node {
    fn local_id(&self) -> Option<&str> {
        Some(self.id())
    }

    fn children(&self) -> Vec<&dyn LayoutNode> {
        let children = match self {
            Node::Container(c) => &c.children,
            Node::Split(s) => &s.children,
            Node::Table(_) | Node::Leaf(_) => return Vec::new(),
        };
        children.iter().map(|n| n as &dyn LayoutNode).collect()
    }

    fn children_mut(&mut self) -> Vec<&mut dyn LayoutNode> {
        let children = match self {
            Node::Container(c) => &mut c.children,
            Node::Split(s) => &mut s.children,
            Node::Table(_) | Node::Leaf(_) => return Vec::new(),
        };
        children.iter_mut().map(|n| n as &mut dyn LayoutNode).collect()
    }

    fn as_splitter(&self) -> Option<&dyn Splitter> {
        match self {
            Node::Split(s) => Some(s),
            _ => None,
        }
    }

    fn as_splitter_mut(&mut self) -> Option<&mut dyn Splitter> {
        match self {
            Node::Split(s) => Some(s),
            _ => None,
        }
    }

    fn as_table(&self) -> Option<&dyn Tabular> {
        match self {
            Node::Table(t) => Some(t),
            _ => None,
        }
    }

    fn as_table_mut(&mut self) -> Option<&mut dyn Tabular> {
        match self {
            Node::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl Splitter for SplitPane {
    fn divider_positions(&self) -> Vec<f64> {
        self.dividers.clone()
    }

    fn set_divider_positions(&mut self, positions: &[f64]) {
        self.dividers = positions.to_vec();
    }

    // n panes have n - 1 dividers; a pane-less split trusts its stored list
    fn divider_count(&self) -> usize {
        match self.children.len() {
            0 => self.dividers.len(),
            n => n - 1,
        }
    }
}

impl Tabular for Table {
    fn kind(&self) -> TableKind {
        self.kind
    }

    fn columns(&self) -> Vec<&dyn ColumnNode> {
        self.columns.iter().map(|c| c as &dyn ColumnNode).collect()
    }

    fn columns_mut(&mut self) -> Vec<&mut dyn ColumnNode> {
        self.columns.iter_mut().map(|c| c as &mut dyn ColumnNode).collect()
    }
}

impl Column {
    pub fn new(id: impl Into<String>, width: f64) -> Self {
        Self {
            id: id.into(),
            width,
            columns: Vec::new(),
        }
    }

    pub fn group(id: impl Into<String>, width: f64, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            width,
            columns,
        }
    }
}

impl ColumnNode for Column {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    fn sub_columns(&self) -> Vec<&dyn ColumnNode> {
        self.columns.iter().map(|c| c as &dyn ColumnNode).collect()
    }

    fn sub_columns_mut(&mut self) -> Vec<&mut dyn ColumnNode> {
        self.columns.iter_mut().map(|c| c as &mut dyn ColumnNode).collect()
    }
}

impl Window {
    pub fn new(bounds: WindowBounds, root: Option<Node>) -> Self {
        Self {
            bounds,
            maximized: false,
            root,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl WindowHandle for Window {
    fn bounds(&self) -> WindowBounds {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: WindowBounds) {
        self.bounds = bounds;
    }

    fn is_maximized(&self) -> bool {
        self.maximized
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
    }

    fn root(&self) -> Option<&dyn LayoutNode> {
        self.root.as_ref().map(|n| n as &dyn LayoutNode)
    }

    fn root_mut(&mut self) -> Option<&mut dyn LayoutNode> {
        self.root.as_mut().map(|n| n as &mut dyn LayoutNode)
    }
}

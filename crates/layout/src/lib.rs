//! `keepsake-layout`: persists UI layout state under structural keys.
//!
//! Walks an abstract node tree, derives a dotted key for every identified
//! splitter and table from its position, and stores divider positions and
//! column widths through [`keepsake_config::TypedPreferences`].

pub mod columns;
pub mod error;
pub mod keys;
pub mod model;
pub mod persist;
pub mod tree;
pub mod window;

pub use columns::{ColumnNode, ColumnWidthReconciler, ColumnWidthToken};
pub use error::{LayoutError, Result};
pub use keys::{contains_path, find_node, traverse, traverse_mut};
pub use model::{Column, Node, Window};
pub use persist::{LayoutStateManager, RestoreReport};
pub use tree::{LayoutNode, Splitter, TableKind, Tabular};
pub use window::{WindowBounds, WindowHandle};

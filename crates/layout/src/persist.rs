// Layout state persistence
//
// Keys, all under the manager's prefix:
//
//   <prefix>.maximized / .x / .y / .width / .height     window geometry
//   <prefix>.splitpane<path>.<id>                        "0.25,0.7"
//   <prefix>.tableView<path>.<id>                        "name:80.0,:40.0"
//   <prefix>.treeTableView<path>.<id>                    same, tree tables
//   <prefix>.treeTableView.<id>                          one table by explicit id
//   <prefix>.columnVisible.<column>                      "true" / "false"

use std::collections::BTreeMap;

use keepsake_config::{
    DataFolder, PreferencesParameter, PrefsError, SharedStoreRegistry, TypedPreferences,
    WINDOW_LAYOUT_PREFERENCES,
};

use crate::columns::{collect_tokens, format_tokens, parse_number, parse_tokens, ColumnWidthReconciler};
use crate::error::{LayoutError, Result};
use crate::keys::{traverse, traverse_mut};
use crate::tree::{non_blank, LayoutNode, Splitter, TableKind, Tabular};
use crate::window::{WindowBounds, WindowHandle};

/// Which per-node state a tree walk saves or restores
#[derive(Debug, Clone, Copy)]
struct Families {
    dividers: bool,
    columns: bool,
}

const DIVIDERS: Families = Families {
    dividers: true,
    columns: false,
};
const COLUMNS: Families = Families {
    dividers: false,
    columns: true,
};
const ALL: Families = Families {
    dividers: true,
    columns: true,
};

/// Outcome of restoring a tree's saved state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Nodes whose saved state was applied
    pub restored: usize,
    /// Identified nodes with nothing saved; left as they are
    pub missing: usize,
    /// Nodes whose saved state could not be applied; left as they are
    pub failed: usize,
}

impl RestoreReport {
    fn merge(&mut self, other: RestoreReport) {
        self.restored += other.restored;
        self.missing += other.missing;
        self.failed += other.failed;
    }
}

/// Saves and restores window geometry, splitter dividers and column widths
#[derive(Debug)]
pub struct LayoutStateManager {
    prefs: TypedPreferences,
    prefix: String,
}

impl LayoutStateManager {
    /// `prefix` namespaces every key, so independent windows can share one file
    pub fn new(prefs: TypedPreferences, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(PrefsError::InvalidParameter("layout prefix must be specified".to_string()).into());
        }
        Ok(Self { prefs, prefix })
    }

    /// Manager over the window layout family (`WindowSizePreferences.xml`) in `folder`
    pub fn open(
        registry: &SharedStoreRegistry,
        folder: &DataFolder,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let param = PreferencesParameter::new(WINDOW_LAYOUT_PREFERENCES)?;
        Self::new(TypedPreferences::open(registry, folder, &param), prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn preferences(&self) -> &TypedPreferences {
        &self.prefs
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.prefix)
    }

    fn splitter_key(&self, path: &str, id: &str) -> String {
        self.key(&format!(".splitpane{path}.{id}"))
    }

    fn table_key(&self, kind: TableKind, path: &str, id: &str) -> String {
        self.key(&format!("{}{path}.{id}", kind.key_segment()))
    }

    // ========================================================================
    // Window geometry
    // ========================================================================

    /// Geometry, then divider positions and column widths if the window has content
    pub fn save_window(&self, window: &dyn WindowHandle) -> Result<()> {
        let mut entries = if window.is_maximized() {
            vec![(self.key(".maximized"), "true".to_string())]
        } else {
            self.bounds_entries(window.bounds())
        };
        if let Some(root) = window.root() {
            entries.extend(self.tree_entries(root, ALL));
        }
        self.prefs.set_properties(entries)?;
        Ok(())
    }

    /// Restore what [`save_window`](Self::save_window) stored.
    ///
    /// Saved bounds apply only when not maximized and plausible; the report
    /// covers the content tree.
    pub fn load_window(&self, window: &mut dyn WindowHandle) -> Result<RestoreReport> {
        let maximized = self.prefs.get_bool(&self.key(".maximized"), false)?;
        window.set_maximized(maximized);
        if !maximized {
            if let Some(bounds) = self.load_bounds()? {
                window.set_bounds(bounds);
            }
        }
        match window.root_mut() {
            Some(root) => self.restore_tree(root, ALL),
            None => Ok(RestoreReport::default()),
        }
    }

    /// Dialogs are never maximized; only their bounds are stored
    pub fn save_dialog_bounds(&self, bounds: WindowBounds) -> Result<()> {
        self.prefs.set_properties(self.bounds_entries(bounds))?;
        Ok(())
    }

    /// Saved dialog bounds, if present and plausible
    pub fn load_dialog_bounds(&self) -> Result<Option<WindowBounds>> {
        self.load_bounds()
    }

    fn bounds_entries(&self, bounds: WindowBounds) -> Vec<(String, String)> {
        vec![
            (self.key(".maximized"), "false".to_string()),
            (self.key(".x"), format!("{:?}", bounds.x)),
            (self.key(".y"), format!("{:?}", bounds.y)),
            (self.key(".width"), format!("{:?}", bounds.width)),
            (self.key(".height"), format!("{:?}", bounds.height)),
        ]
    }

    fn load_bounds(&self) -> Result<Option<WindowBounds>> {
        let bounds = WindowBounds::new(
            self.prefs.get_f64(&self.key(".x"), 0.0)?,
            self.prefs.get_f64(&self.key(".y"), 0.0)?,
            self.prefs.get_f64(&self.key(".width"), 0.0)?,
            self.prefs.get_f64(&self.key(".height"), 0.0)?,
        );
        if !bounds.is_plausible() {
            log::debug!("ignoring saved geometry for {}: {bounds:?}", self.prefix);
            return Ok(None);
        }
        Ok(Some(bounds))
    }

    // ========================================================================
    // Tree state
    // ========================================================================

    /// Store the divider positions of every identified splitter under `root`
    pub fn save_divider_positions(&self, root: &dyn LayoutNode) -> Result<usize> {
        self.save_tree(root, DIVIDERS)
    }

    pub fn load_divider_positions(&self, root: &mut dyn LayoutNode) -> Result<RestoreReport> {
        self.restore_tree(root, DIVIDERS)
    }

    /// Store the column widths of every identified table under `root`
    pub fn save_column_widths(&self, root: &dyn LayoutNode) -> Result<usize> {
        self.save_tree(root, COLUMNS)
    }

    pub fn load_column_widths(&self, root: &mut dyn LayoutNode) -> Result<RestoreReport> {
        self.restore_tree(root, COLUMNS)
    }

    /// Dividers and column widths in one batch
    pub fn save_layout(&self, root: &dyn LayoutNode) -> Result<usize> {
        self.save_tree(root, ALL)
    }

    pub fn load_layout(&self, root: &mut dyn LayoutNode) -> Result<RestoreReport> {
        self.restore_tree(root, ALL)
    }

    fn save_tree(&self, root: &dyn LayoutNode, families: Families) -> Result<usize> {
        let entries = self.tree_entries(root, families);
        let count = entries.len();
        self.prefs.set_properties(entries)?;
        Ok(count)
    }

    fn tree_entries(&self, root: &dyn LayoutNode, families: Families) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        traverse(root, |path, node| {
            let Some(id) = non_blank(node.local_id()) else {
                return true;
            };
            if families.dividers {
                if let Some(split) = node.as_splitter() {
                    let key = self.splitter_key(path, id);
                    let value = join_numbers(&split.divider_positions());
                    log::debug!("save split dividers {key}={value}");
                    entries.push((key, value));
                }
            }
            if families.columns {
                if let Some(table) = node.as_table() {
                    let key = self.table_key(table.kind(), path, id);
                    let value = format_tokens(&collect_tokens(&table.columns()));
                    log::debug!("save column widths {key}={value}");
                    entries.push((key, value));
                }
            }
            true
        });
        entries
    }

    fn restore_tree(&self, root: &mut dyn LayoutNode, families: Families) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();
        let mut read_err = None;
        traverse_mut(root, |path, node| {
            let Some(id) = non_blank(node.local_id()).map(str::to_string) else {
                return true;
            };
            let mut outcome = RestoreReport::default();
            if families.dividers {
                if let Some(split) = node.as_splitter_mut() {
                    let key = self.splitter_key(path, &id);
                    match self.restore_node(&key, &mut outcome, |raw| restore_dividers(&key, split, raw)) {
                        Ok(()) => {}
                        Err(e) => {
                            read_err = Some(e);
                            return false;
                        }
                    }
                }
            }
            if families.columns {
                if let Some(table) = node.as_table_mut() {
                    let key = self.table_key(table.kind(), path, &id);
                    match self.restore_node(&key, &mut outcome, |raw| restore_columns(table, raw)) {
                        Ok(()) => {}
                        Err(e) => {
                            read_err = Some(e);
                            return false;
                        }
                    }
                }
            }
            report.merge(outcome);
            true
        });
        match read_err {
            Some(e) => Err(e.into()),
            None => Ok(report),
        }
    }

    /// Look up `key` and hand a non-blank value to `apply`.
    ///
    /// Only a failed read is returned; a failed apply is logged and counted.
    fn restore_node<F>(&self, key: &str, outcome: &mut RestoreReport, apply: F) -> Result<(), PrefsError>
    where
        F: FnOnce(&str) -> Result<()>,
    {
        let raw = match self.prefs.get(key)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                outcome.missing += 1;
                return Ok(());
            }
        };
        match apply(&raw) {
            Ok(()) => {
                log::debug!("restored {key}={raw}");
                outcome.restored += 1;
            }
            Err(e) => {
                log::warn!("failed to restore {key}: {e}");
                outcome.failed += 1;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Single tables and column visibility
    // ========================================================================

    /// Store one table's widths under an explicit id, independent of tree position
    pub fn save_table_columns(&self, table: &dyn Tabular, id: &str) -> Result<()> {
        let value = format_tokens(&collect_tokens(&table.columns()));
        self.prefs.set_properties([(self.single_table_key(id), value)])?;
        Ok(())
    }

    /// Returns false when nothing was saved under `id`
    pub fn load_table_columns(&self, table: &mut dyn Tabular, id: &str) -> Result<bool> {
        let key = self.single_table_key(id);
        match self.prefs.get(&key)? {
            Some(raw) if !raw.trim().is_empty() => {
                restore_columns(table, &raw)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn single_table_key(&self, id: &str) -> String {
        self.key(&format!("{}.{id}", TableKind::Tree.key_segment()))
    }

    fn visibility_prefix(&self) -> String {
        self.key(".columnVisible.")
    }

    pub fn save_column_visibility(&self, visible: &BTreeMap<String, bool>) -> Result<()> {
        let prefix = self.visibility_prefix();
        self.prefs.set_properties(
            visible
                .iter()
                .map(|(name, shown)| (format!("{prefix}{name}"), shown.to_string())),
        )?;
        Ok(())
    }

    /// Saved visibility by column name. Anything but `true` reads as hidden.
    pub fn load_column_visibility(&self) -> Result<BTreeMap<String, bool>> {
        let prefix = self.visibility_prefix();
        let mut visible = BTreeMap::new();
        for key in self.prefs.property_names_starting_with(&prefix)? {
            if let Some(value) = self.prefs.get(&key)? {
                let name = key[prefix.len()..].to_string();
                visible.insert(name, value.trim().eq_ignore_ascii_case("true"));
            }
        }
        Ok(visible)
    }
}

fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn restore_dividers(key: &str, split: &mut dyn Splitter, raw: &str) -> Result<()> {
    let positions = raw.split(',').map(parse_number).collect::<Result<Vec<_>>>()?;
    let expected = split.divider_count();
    if positions.len() != expected {
        return Err(LayoutError::DividerCountMismatch {
            key: key.to_string(),
            expected,
            found: positions.len(),
        });
    }
    split.set_divider_positions(&positions);
    Ok(())
}

fn restore_columns(table: &mut dyn Tabular, raw: &str) -> Result<()> {
    let tokens = parse_tokens(raw)?;
    ColumnWidthReconciler::new(tokens).apply(table.columns_mut());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use crate::model::{Column, Node, Window};

    fn manager(dir: &Path) -> LayoutStateManager {
        let registry = SharedStoreRegistry::new();
        let folder = DataFolder::with_root("keepsake", dir);
        LayoutStateManager::open(&registry, &folder, "mainWindow").unwrap()
    }

    fn tree(divider: f64, name_width: f64, anon_width: f64) -> Node {
        Node::container(
            "main",
            vec![Node::container(
                "detail",
                vec![Node::split(
                    "leftRight",
                    vec![divider],
                    vec![
                        Node::table(
                            "files",
                            TableKind::Flat,
                            vec![Column::new("name", name_width), Column::new("", anon_width)],
                        ),
                        Node::table("outline", TableKind::Tree, vec![Column::new("node", name_width)]),
                    ],
                )],
            )],
        )
    }

    fn dividers_of(root: &Node) -> Vec<f64> {
        let mut out = Vec::new();
        traverse(root, |_, node| {
            if let Some(split) = node.as_splitter() {
                out.extend(split.divider_positions());
            }
            true
        });
        out
    }

    fn columns_of(root: &Node) -> Vec<f64> {
        let mut out = Vec::new();
        traverse(root, |_, node| {
            if let Some(table) = node.as_table() {
                out.extend(table.columns().iter().map(|c| c.width()));
            }
            true
        });
        out
    }

    #[test]
    fn test_keys_follow_tree_structure() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        assert_eq!(layout.save_layout(&tree(0.3, 80.0, 40.0)).unwrap(), 3);

        let prefs = layout.preferences();
        assert_eq!(
            prefs.get("mainWindow.splitpane.main.detail.leftRight").unwrap().as_deref(),
            Some("0.3")
        );
        assert_eq!(
            prefs
                .get("mainWindow.tableView.main.detail.leftRight.files")
                .unwrap()
                .as_deref(),
            Some("name:80.0,:40.0")
        );
        assert_eq!(
            prefs
                .get("mainWindow.treeTableView.main.detail.leftRight.outline")
                .unwrap()
                .as_deref(),
            Some("node:80.0")
        );
    }

    #[test]
    fn test_save_writes_once_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        layout.save_divider_positions(&tree(0.3, 80.0, 40.0)).unwrap();
        assert!(!layout.preferences().is_modified());
        assert!(dir.path().join(WINDOW_LAYOUT_PREFERENCES).is_file());
    }

    #[test]
    fn test_restore_onto_rebuilt_tree() {
        let dir = tempfile::tempdir().unwrap();
        manager(dir.path()).save_layout(&tree(0.3, 80.0, 40.0)).unwrap();

        // Fresh registry: values come back from disk
        let layout = manager(dir.path());
        let mut rebuilt = tree(0.5, 10.0, 10.0);
        let report = layout.load_layout(&mut rebuilt).unwrap();

        assert_eq!(
            report,
            RestoreReport {
                restored: 3,
                missing: 0,
                failed: 0
            }
        );
        assert_eq!(dividers_of(&rebuilt), vec![0.3]);
        assert_eq!(columns_of(&rebuilt), vec![80.0, 40.0, 80.0]);
    }

    #[test]
    fn test_families_restore_independently() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        layout.save_layout(&tree(0.3, 80.0, 40.0)).unwrap();

        let mut rebuilt = tree(0.5, 10.0, 10.0);
        layout.load_divider_positions(&mut rebuilt).unwrap();
        assert_eq!(dividers_of(&rebuilt), vec![0.3]);
        assert_eq!(columns_of(&rebuilt), vec![10.0, 10.0, 10.0]);

        layout.load_column_widths(&mut rebuilt).unwrap();
        assert_eq!(columns_of(&rebuilt), vec![80.0, 40.0, 80.0]);
    }

    #[test]
    fn test_missing_state_leaves_nodes_alone() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        let mut fresh = tree(0.5, 10.0, 10.0);
        let report = layout.load_layout(&mut fresh).unwrap();

        assert_eq!(report.restored, 0);
        assert_eq!(report.missing, 3);
        assert_eq!(fresh, tree(0.5, 10.0, 10.0));
    }

    #[test]
    fn test_one_bad_node_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        layout.save_layout(&tree(0.3, 80.0, 40.0)).unwrap();
        layout.preferences().set(
            "mainWindow.tableView.main.detail.leftRight.files",
            "name:wide,:40.0",
        );

        let mut rebuilt = tree(0.5, 10.0, 10.0);
        let report = layout.load_layout(&mut rebuilt).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.restored, 2);
        assert_eq!(dividers_of(&rebuilt), vec![0.3]);
        assert_eq!(columns_of(&rebuilt), vec![10.0, 10.0, 80.0]);
    }

    #[test]
    fn test_divider_count_mismatch_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        layout
            .preferences()
            .set("mainWindow.splitpane.main.detail.leftRight", "0.2,0.4");

        let mut rebuilt = tree(0.5, 10.0, 10.0);
        let report = layout.load_divider_positions(&mut rebuilt).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(dividers_of(&rebuilt), vec![0.5]);
    }

    #[test]
    fn test_separate_prefixes_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SharedStoreRegistry::new();
        let folder = DataFolder::with_root("keepsake", dir.path());
        let a = LayoutStateManager::open(&registry, &folder, "editor").unwrap();
        let b = LayoutStateManager::open(&registry, &folder, "viewer").unwrap();

        a.save_layout(&tree(0.3, 80.0, 40.0)).unwrap();
        b.save_layout(&tree(0.7, 20.0, 30.0)).unwrap();

        let mut restored = tree(0.5, 1.0, 1.0);
        a.load_layout(&mut restored).unwrap();
        assert_eq!(dividers_of(&restored), vec![0.3]);
        b.load_layout(&mut restored).unwrap();
        assert_eq!(dividers_of(&restored), vec![0.7]);
    }

    #[test]
    fn test_window_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        let saved = Window::new(WindowBounds::new(40.0, 30.0, 800.0, 600.0), Some(tree(0.3, 80.0, 40.0)));
        layout.save_window(&saved).unwrap();
        assert_eq!(
            layout.preferences().get("mainWindow.width").unwrap().as_deref(),
            Some("800.0")
        );

        let mut window = Window::new(WindowBounds::new(0.0, 0.0, 100.0, 100.0), Some(tree(0.5, 1.0, 1.0)));
        let report = layout.load_window(&mut window).unwrap();
        assert_eq!(report.restored, 3);
        assert_eq!(window, saved);
    }

    #[test]
    fn test_implausible_geometry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        layout
            .save_dialog_bounds(WindowBounds::new(-5.0, 10.0, 300.0, 200.0))
            .unwrap();

        let before = WindowBounds::new(50.0, 50.0, 640.0, 480.0);
        let mut window = Window::new(before, None);
        layout.load_window(&mut window).unwrap();
        assert_eq!(window.bounds, before);
        assert_eq!(layout.load_dialog_bounds().unwrap(), None);
    }

    #[test]
    fn test_maximized_skips_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        let mut saved = Window::new(WindowBounds::new(40.0, 30.0, 800.0, 600.0), None);
        saved.maximized = true;
        layout.save_window(&saved).unwrap();

        let prefs = layout.preferences();
        assert_eq!(prefs.get("mainWindow.maximized").unwrap().as_deref(), Some("true"));
        assert_eq!(prefs.get("mainWindow.x").unwrap(), None);

        let before = WindowBounds::new(1.0, 2.0, 300.0, 300.0);
        let mut window = Window::new(before, None);
        layout.load_window(&mut window).unwrap();
        assert!(window.maximized);
        assert_eq!(window.bounds, before);
    }

    #[test]
    fn test_maximized_state_ignores_stale_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        layout
            .save_dialog_bounds(WindowBounds::new(40.0, 30.0, 800.0, 600.0))
            .unwrap();
        layout.preferences().set("mainWindow.maximized", "true");

        let before = WindowBounds::new(1.0, 2.0, 300.0, 300.0);
        let mut window = Window::new(before, None);
        layout.load_window(&mut window).unwrap();
        assert!(window.maximized);
        assert_eq!(window.bounds, before);
    }

    #[test]
    fn test_dialog_bounds_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        let bounds = WindowBounds::new(12.0, 24.0, 420.0, 180.0);
        layout.save_dialog_bounds(bounds).unwrap();
        assert_eq!(layout.load_dialog_bounds().unwrap(), Some(bounds));
    }

    #[test]
    fn test_single_table_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        let table = crate::model::Table {
            id: String::new(),
            kind: TableKind::Flat,
            columns: vec![Column::new("name", 80.0), Column::new("", 40.0)],
        };
        layout.save_table_columns(&table, "history").unwrap();
        assert_eq!(
            layout
                .preferences()
                .get("mainWindow.treeTableView.history")
                .unwrap()
                .as_deref(),
            Some("name:80.0,:40.0")
        );

        let mut fresh = crate::model::Table {
            columns: vec![Column::new("name", 1.0), Column::new("", 1.0)],
            ..table.clone()
        };
        assert!(layout.load_table_columns(&mut fresh, "history").unwrap());
        assert_eq!(fresh, table);
        assert!(!layout.load_table_columns(&mut fresh, "unknown").unwrap());
    }

    #[test]
    fn test_column_visibility_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let layout = manager(dir.path());
        let visible = BTreeMap::from([("name".to_string(), true), ("size".to_string(), false)]);
        layout.save_column_visibility(&visible).unwrap();
        layout.preferences().set("mainWindow.columnVisible.date", "yes");

        let loaded = layout.load_column_visibility().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded["name"], true);
        assert_eq!(loaded["size"], false);
        assert_eq!(loaded["date"], false);
    }

    #[test]
    fn test_blank_prefix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SharedStoreRegistry::new();
        let folder = DataFolder::with_root("keepsake", dir.path());
        let err = LayoutStateManager::open(&registry, &folder, " ").unwrap_err();
        assert!(matches!(err, LayoutError::Prefs(PrefsError::InvalidParameter(_))));
    }
}

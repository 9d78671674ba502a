// Layout commands: save and restore a JSON window description

use std::path::Path;

use keepsake_config::{DataFolder, SharedStoreRegistry};
use keepsake_layout::{LayoutStateManager, Window};

use crate::CliError;

fn read_window(path: &Path) -> Result<Window, CliError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    Window::from_json(&json)
        .map_err(|e| CliError::malformed(format!("{}: {e}", path.display())))
}

fn manager(folder: &DataFolder, prefix: &str) -> Result<LayoutStateManager, CliError> {
    Ok(LayoutStateManager::open(SharedStoreRegistry::global(), folder, prefix)?)
}

pub fn cmd_save(folder: &DataFolder, tree: &Path, prefix: &str) -> Result<(), CliError> {
    let window = read_window(tree)?;
    manager(folder, prefix)?.save_window(&window)?;
    log::info!("saved layout {prefix} from {}", tree.display());
    Ok(())
}

pub fn cmd_restore(folder: &DataFolder, tree: &Path, prefix: &str) -> Result<(), CliError> {
    let mut window = read_window(tree)?;
    let report = manager(folder, prefix)?.load_window(&mut window)?;
    log::info!(
        "restored layout {prefix}: {} restored, {} missing, {} failed",
        report.restored,
        report.missing,
        report.failed
    );

    let json = window
        .to_json_pretty()
        .map_err(|e| CliError::other(format!("failed to write JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

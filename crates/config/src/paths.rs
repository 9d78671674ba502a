// Per-application data folders
// Resolved from %APPDATA% / %LOCALAPPDATA%, then the platform config dirs, then "."

use std::path::{Path, PathBuf};

use crate::error::{PrefsError, Result};
use crate::source::{LayerHandle, LayeredSource};

/// General application preferences
pub const GENERAL_PREFERENCES: &str = "preferences.xml";

/// Window geometry, divider positions and column widths
pub const WINDOW_LAYOUT_PREFERENCES: &str = "WindowSizePreferences.xml";

/// Locates the folders an application keeps its preference files in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFolder {
    app_name: String,
    root: Option<PathBuf>,
}

impl DataFolder {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            root: None,
        }
    }

    /// Pin both roaming and local folders to one directory (tests, portable installs)
    pub fn with_root(app_name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            root: Some(root.into()),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Roaming data folder: `%APPDATA%/<app>`.
    ///
    /// Without `APPDATA`, falls back to the platform config dir joined with
    /// the application name, and finally to the current directory.
    pub fn application_data_folder(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        if let Some(appdata) = env_dir("APPDATA") {
            return appdata.join(&self.app_name);
        }
        dirs::config_dir()
            .map(|dir| dir.join(&self.app_name))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Machine-local data folder: `%LOCALAPPDATA%/<app>`, else the roaming folder
    pub fn local_application_data_folder(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        if let Some(local) = env_dir("LOCALAPPDATA") {
            return local.join(&self.app_name);
        }
        self.application_data_folder()
    }

    /// Full path of a preference file inside the roaming folder
    pub fn preferences_path(&self, file_name: &str) -> PathBuf {
        self.application_data_folder().join(file_name)
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    let value = std::env::var_os(var)?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(value))
}

/// Describes one preference family: a user file plus optional bundled defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesParameter {
    file_name: String,
    defaults: Option<LayerHandle>,
}

impl PreferencesParameter {
    pub fn new(file_name: impl Into<String>) -> Result<Self> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(PrefsError::InvalidParameter(
                "file name must be specified".to_string(),
            ));
        }
        Ok(Self {
            file_name,
            defaults: None,
        })
    }

    /// Read-only defaults shared by all users, shadowed by the user file
    pub fn with_defaults(mut self, defaults: LayerHandle) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn defaults(&self) -> Option<&LayerHandle> {
        self.defaults.as_ref()
    }

    /// Layered source for this family inside `folder`
    pub fn source(&self, folder: &DataFolder) -> LayeredSource {
        self.source_at(&folder.preferences_path(&self.file_name))
    }

    pub fn source_at(&self, path: &Path) -> LayeredSource {
        LayeredSource::simple(self.defaults.clone(), Some(path.to_path_buf()))
    }
}

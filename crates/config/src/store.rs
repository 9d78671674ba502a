// Cascading preference store
//
// Layers load lazily on first access. Each level shadows the levels below it
// key by key; writes land in the top level and mark the store dirty until
// the merged view is saved to the write layer.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use crate::error::{PrefsError, Result};
use crate::properties::{self, PropertyMap};
use crate::source::{LayerHandle, LayeredSource};

const SAVE_COMMENT: &str = "keepsake preferences";

/// Merged, overridable view over every layer of a [`LayeredSource`]
#[derive(Debug)]
pub struct LayeredStore {
    source: LayeredSource,
    /// Lowest priority first; `None` until first access
    levels: Option<Vec<PropertyMap>>,
    dirty: bool,
    /// The missing-write-layer warning was logged for the current unsaved changes
    warned_unsaved: bool,
}

impl LayeredStore {
    pub fn new(source: LayeredSource) -> Self {
        Self {
            source,
            levels: None,
            dirty: false,
            warned_unsaved: false,
        }
    }

    pub fn source(&self) -> &LayeredSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.levels.is_some()
    }

    /// Has anything been set since the last successful save?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Load every layer now. A no-op once loaded.
    pub fn load(&mut self) {
        self.levels();
    }

    /// Drop the in-memory view and any unsaved changes; the next access reads the layers again
    pub fn reload(&mut self) {
        if self.dirty {
            log::warn!("discarding unsaved preferences: source={}", self.source);
        }
        self.levels = None;
        self.dirty = false;
        self.warned_unsaved = false;
    }

    /// Highest layer defining `key` wins
    pub fn get(&mut self, key: &str) -> Option<&str> {
        self.levels()
            .iter()
            .rev()
            .find_map(|level| level.get(key))
            .map(String::as_str)
    }

    /// Set `key` in the top level. Setting the current value changes nothing.
    pub fn set(&mut self, key: &str, value: &str) {
        if self.get(key) == Some(value) {
            return;
        }
        log::debug!("set preference {key}={value}");
        let levels = self.levels();
        if levels.is_empty() {
            levels.push(PropertyMap::new());
        }
        if let Some(top) = levels.last_mut() {
            top.insert(key.to_string(), value.to_string());
        }
        if !self.dirty {
            self.warned_unsaved = false;
        }
        self.dirty = true;
    }

    /// All keys defined by any layer, sorted
    pub fn keys(&mut self) -> Vec<String> {
        self.merged().into_keys().collect()
    }

    /// The cascade flattened into one map
    pub fn merged(&mut self) -> PropertyMap {
        let mut merged = PropertyMap::new();
        for level in self.levels().iter() {
            merged.extend(level.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Write the merged view to the write layer if anything changed.
    ///
    /// Without a writable layer the changes stay pending and a warning is
    /// logged. A failed write is returned and the store stays dirty.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let Some(path) = self
            .source
            .write_layer()
            .and_then(LayerHandle::writable_path)
            .map(Path::to_path_buf)
        else {
            if self.warned_unsaved {
                log::debug!("preferences still unsaved, no writable layer: source={}", self.source);
            } else {
                log::warn!("can't save preferences, no writable layer: source={}", self.source);
                self.warned_unsaved = true;
            }
            return Ok(());
        };

        let xml = properties::to_xml_string(&self.merged(), Some(SAVE_COMMENT));
        if let Err(e) = atomic_write(&path, xml.as_bytes()) {
            log::warn!("failed to save preferences to {}: {e}", path.display());
            return Err(e);
        }
        self.dirty = false;
        log::info!("saved preferences to {}", path.display());
        Ok(())
    }

    fn levels(&mut self) -> &mut Vec<PropertyMap> {
        let source = &self.source;
        self.levels.get_or_insert_with(|| load_levels(source))
    }
}

fn load_levels(source: &LayeredSource) -> Vec<PropertyMap> {
    source
        .read_layers()
        .iter()
        .enumerate()
        .map(|(level, layer)| load_level(level, layer, source))
        .collect()
}

// A layer that is missing, unreadable or malformed counts as empty.
fn load_level(level: usize, layer: &LayerHandle, source: &LayeredSource) -> PropertyMap {
    let text = match layer.read_to_string() {
        Ok(Some(text)) => text,
        Ok(None) => {
            log::warn!("properties not found: level={level}, layer={layer}, source={source}");
            return PropertyMap::new();
        }
        Err(e) => {
            log::warn!("failed to read properties: level={level}, layer={layer}: {e}");
            return PropertyMap::new();
        }
    };

    match properties::parse_properties(&text, &layer.to_string()) {
        Ok(props) => {
            log::debug!("loaded {} properties: level={level}, layer={layer}", props.len());
            props
        }
        Err(e) => {
            log::warn!("ignoring properties layer: level={level}: {e}");
            PropertyMap::new()
        }
    }
}

/// Write via a temp file in the target directory, then rename over the target
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PrefsError::io(dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| PrefsError::io(dir, e))?;
    temp.write_all(data).map_err(|e| PrefsError::io(path, e))?;
    temp.persist(path).map_err(|e| PrefsError::io(path, e.error))?;
    Ok(())
}

// Layer descriptors
//
// A LayeredSource names its layers; two sources naming the same layers are
// the same source, whichever instance describes them.

use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// One readable (and possibly writable) layer of preferences
#[derive(Debug, Clone)]
pub enum LayerHandle {
    /// A file on disk. Absent until first written.
    File(PathBuf),
    /// Read-only defaults compiled into the application
    Bundled {
        name: &'static str,
        contents: &'static str,
    },
}

impl LayerHandle {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn bundled(name: &'static str, contents: &'static str) -> Self {
        Self::Bundled { name, contents }
    }

    /// Open the layer for reading. `Ok(None)` means the layer does not exist.
    pub fn open_read(&self) -> io::Result<Option<Box<dyn Read>>> {
        match self {
            Self::File(path) => {
                if !path.is_file() {
                    return Ok(None);
                }
                let file = File::open(path)?;
                Ok(Some(Box::new(file)))
            }
            Self::Bundled { contents, .. } => Ok(Some(Box::new(contents.as_bytes()))),
        }
    }

    /// Read the whole layer as text
    pub fn read_to_string(&self) -> io::Result<Option<String>> {
        let Some(mut reader) = self.open_read()? else {
            return Ok(None);
        };
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Some(text))
    }

    /// Path a save should go to, if this layer can be written at all
    pub fn writable_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Bundled { .. } => None,
        }
    }
}

// Identity is the layer's name, never its contents.
impl PartialEq for LayerHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::File(a), Self::File(b)) => a == b,
            (Self::Bundled { name: a, .. }, Self::Bundled { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for LayerHandle {}

impl Hash for LayerHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::File(path) => {
                0u8.hash(state);
                path.hash(state);
            }
            Self::Bundled { name, .. } => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Bundled { name, .. } => write!(f, "bundled:{name}"),
        }
    }
}

/// Ordered read layers (lowest priority first) plus one optional write layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayeredSource {
    read_layers: Vec<LayerHandle>,
    write_layer: Option<LayerHandle>,
}

impl LayeredSource {
    pub fn new(read_layers: Vec<LayerHandle>, write_layer: Option<LayerHandle>) -> Self {
        Self {
            read_layers,
            write_layer,
        }
    }

    /// Bundled defaults (if any) shadowed by a user file, which is also the write layer
    pub fn simple(defaults: Option<LayerHandle>, file: Option<PathBuf>) -> Self {
        let file = file.map(LayerHandle::File);
        let read_layers = defaults.into_iter().chain(file.clone()).collect();
        Self {
            read_layers,
            write_layer: file,
        }
    }

    pub fn read_layers(&self) -> &[LayerHandle] {
        &self.read_layers
    }

    pub fn write_layer(&self) -> Option<&LayerHandle> {
        self.write_layer.as_ref()
    }

    pub fn num_levels(&self) -> usize {
        self.read_layers.len()
    }
}

impl fmt::Display for LayeredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, layer) in self.read_layers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{layer}")?;
        }
        f.write_str("]")?;
        match &self.write_layer {
            Some(layer) => write!(f, " -> {layer}"),
            None => f.write_str(" (read-only)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn sources_with_same_layers_are_equal() {
        let a = LayeredSource::simple(
            Some(LayerHandle::bundled("defaults.xml", "<properties/>")),
            Some(PathBuf::from("/data/preferences.xml")),
        );
        // Different contents, same name: still the same layer
        let b = LayeredSource::simple(
            Some(LayerHandle::bundled("defaults.xml", "")),
            Some(PathBuf::from("/data/preferences.xml")),
        );
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn sources_with_different_files_differ() {
        let a = LayeredSource::simple(None, Some(PathBuf::from("/data/preferences.xml")));
        let b = LayeredSource::simple(None, Some(PathBuf::from("/data/WindowSizePreferences.xml")));
        assert_ne!(a, b);
    }

    #[test]
    fn file_and_bundled_never_collide() {
        assert_ne!(
            LayerHandle::file("defaults.xml"),
            LayerHandle::bundled("defaults.xml", "")
        );
    }

    #[test]
    fn simple_source_orders_defaults_first() {
        let source = LayeredSource::simple(
            Some(LayerHandle::bundled("defaults.xml", "")),
            Some(PathBuf::from("/data/p.xml")),
        );
        assert_eq!(source.num_levels(), 2);
        assert!(matches!(source.read_layers()[0], LayerHandle::Bundled { .. }));
        assert_eq!(source.write_layer(), Some(&LayerHandle::file("/data/p.xml")));
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let layer = LayerHandle::file(dir.path().join("nope.xml"));
        assert!(layer.read_to_string().unwrap().is_none());
    }

    #[test]
    fn bundled_layer_is_read_only() {
        let layer = LayerHandle::bundled("defaults.xml", "<properties/>");
        assert_eq!(layer.read_to_string().unwrap().as_deref(), Some("<properties/>"));
        assert!(layer.writable_path().is_none());
    }

    #[test]
    fn display_names_every_layer() {
        let source = LayeredSource::simple(
            Some(LayerHandle::bundled("defaults.xml", "")),
            Some(PathBuf::from("/data/p.xml")),
        );
        assert_eq!(
            source.to_string(),
            "[bundled:defaults.xml, file:/data/p.xml] -> file:/data/p.xml"
        );
        let read_only = LayeredSource::new(vec![LayerHandle::bundled("d", "")], None);
        assert_eq!(read_only.to_string(), "[bundled:d] (read-only)");
    }
}

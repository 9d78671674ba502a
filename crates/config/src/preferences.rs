// Typed preferences over a shared store
//
// Every read first writes back pending changes, so a value set through any
// handle on the same store is on disk before anyone reads it back.
// Malformed stored values never error: the caller's default is returned.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{PrefsError, Result};
use crate::paths::{DataFolder, PreferencesParameter};
use crate::registry::{SharedStore, SharedStoreRegistry};

/// Outcome of a typed read, for callers that care whether the default was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The stored value parsed
    Parsed(T),
    /// The key was absent or its value malformed
    Defaulted(T),
}

impl<T> Lookup<T> {
    pub fn value(self) -> T {
        match self {
            Self::Parsed(v) | Self::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted(_))
    }
}

/// String, numeric, boolean, path and enum accessors over one preference family
pub struct TypedPreferences {
    store: SharedStore,
}

impl TypedPreferences {
    /// Preferences for `param` inside `folder`, sharing the registry's store
    pub fn open(
        registry: &SharedStoreRegistry,
        folder: &DataFolder,
        param: &PreferencesParameter,
    ) -> Self {
        Self::from_store(registry.get_or_create(&param.source(folder)))
    }

    pub fn from_store(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write pending changes, if any
    pub fn flush(&self) -> Result<()> {
        self.store.lock().save()
    }

    /// Alias of [`flush`](Self::flush) for callers driving an explicit save
    pub fn save(&self) -> Result<()> {
        self.flush()
    }

    /// Are there changes not yet written?
    pub fn is_modified(&self) -> bool {
        self.store.lock().is_dirty()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Raw stored value
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut store = self.store.lock();
        store.save()?;
        Ok(store.get(key).map(str::to_string))
    }

    pub fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Parse the stored value, reporting whether `default` stood in for it
    pub fn lookup<T: FromStr>(&self, key: &str, default: T) -> Result<Lookup<T>> {
        let Some(raw) = self.get(key)? else {
            return Ok(Lookup::Defaulted(default));
        };
        match raw.trim().parse() {
            Ok(value) => Ok(Lookup::Parsed(value)),
            Err(_) => {
                log::debug!("malformed preference {key}={raw:?}, using default");
                Ok(Lookup::Defaulted(default))
            }
        }
    }

    /// Strict read: a malformed value is an error instead of a default
    pub fn try_get<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        raw.trim().parse().map(Some).map_err(|_| PrefsError::Parse {
            key: key.to_string(),
            value: raw,
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn get_i32(&self, key: &str, default: i32) -> Result<i32> {
        self.lookup(key, default).map(Lookup::value)
    }

    pub fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        self.lookup(key, default).map(Lookup::value)
    }

    pub fn get_f32(&self, key: &str, default: f32) -> Result<f32> {
        self.lookup(key, default).map(Lookup::value)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        self.lookup(key, default).map(Lookup::value)
    }

    /// `true`/`false` in any case; anything else is the default
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let value = self.get(key)?;
        Ok(match value.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            _ => default,
        })
    }

    /// Trimmed path; a blank value means unset and yields the default
    pub fn get_path(&self, key: &str, default: &Path) -> Result<PathBuf> {
        Ok(self
            .get(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default.to_path_buf()))
    }

    /// Enum stored by name; unknown names yield the default
    pub fn get_enum<E: FromStr>(&self, key: &str, default: E) -> Result<E> {
        self.lookup(key, default).map(Lookup::value)
    }

    /// All keys, sorted
    pub fn property_names(&self) -> Result<BTreeSet<String>> {
        let mut store = self.store.lock();
        store.save()?;
        Ok(store.keys().into_iter().collect())
    }

    /// Keys under one sub-namespace, sorted
    pub fn property_names_starting_with(&self, prefix: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .property_names()?
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect())
    }

    // ========================================================================
    // Writes (deferred until the next read or flush)
    // ========================================================================

    pub fn set(&self, key: &str, value: &str) {
        self.store.lock().set(key, value);
    }

    pub fn set_i32(&self, key: &str, value: i32) {
        self.set(key, &value.to_string());
    }

    pub fn set_i64(&self, key: &str, value: i64) {
        self.set(key, &value.to_string());
    }

    pub fn set_f32(&self, key: &str, value: f32) {
        self.set(key, &format!("{value:?}"));
    }

    /// Stored with a fractional part, e.g. `300.0`
    pub fn set_f64(&self, key: &str, value: f64) {
        self.set(key, &format!("{value:?}"));
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }

    pub fn set_path(&self, key: &str, value: &Path) {
        self.set(key, &value.to_string_lossy());
    }

    pub fn set_enum<E: AsRef<str>>(&self, key: &str, value: &E) {
        self.set(key, value.as_ref());
    }

    /// Apply a batch of values, then write them out in one save
    pub fn set_properties<I, K, V>(&self, batch: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut store = self.store.lock();
        for (key, value) in batch {
            store.set(key.as_ref(), value.as_ref());
        }
        store.save()
    }
}

impl Drop for TypedPreferences {
    fn drop(&mut self) {
        if let Err(e) = self.store.lock().save() {
            log::error!("failed to save preferences on close: {e}");
        }
    }
}

impl std::fmt::Debug for TypedPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self.store.try_lock() {
            Some(store) => store.source().to_string(),
            None => "<locked>".to_string(),
        };
        f.debug_struct("TypedPreferences")
            .field("source", &source)
            .finish()
    }
}

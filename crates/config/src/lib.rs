// Configuration loading and persistence

pub mod error;
pub mod paths;
pub mod preferences;
pub mod properties;
pub mod registry;
pub mod source;
pub mod store;

pub use error::{PrefsError, Result};
pub use paths::{DataFolder, PreferencesParameter, GENERAL_PREFERENCES, WINDOW_LAYOUT_PREFERENCES};
pub use preferences::{Lookup, TypedPreferences};
pub use properties::PropertyMap;
pub use registry::{SharedStore, SharedStoreRegistry};
pub use source::{LayerHandle, LayeredSource};
pub use store::LayeredStore;

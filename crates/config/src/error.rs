// Preference errors

use std::path::PathBuf;

/// Errors raised by preference stores.
///
/// Missing or unreadable read layers and malformed values never surface
/// here; they degrade to empty layers and defaults. Only a failed write of
/// the writable layer is fatal to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// A preference family was described without a usable file name
    #[error("invalid preferences parameter: {0}")]
    InvalidParameter(String),

    /// Writing the writable layer failed
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A properties document could not be parsed
    #[error("malformed properties document {origin}: {message}")]
    Xml { origin: String, message: String },

    /// A stored value does not parse as the requested type
    #[error("invalid value for {key}: {value:?} is not a valid {expected}")]
    Parse {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl PrefsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn xml(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::Xml {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = PrefsError> = std::result::Result<T, E>;

use keepsake_config::PrefsError;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    Prefs(#[from] PrefsError),

    /// A column token without the `name:width` shape
    #[error("malformed column token {token:?}")]
    MalformedToken { token: String },

    #[error("invalid number {value:?}")]
    InvalidNumber { value: String },

    /// Saved divider list does not fit the live splitter
    #[error("{key}: splitter has {expected} divider(s), saved state has {found}")]
    DividerCountMismatch {
        key: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;

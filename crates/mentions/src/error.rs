use thiserror::Error;

/// Construction-time configuration problems. These fail fast.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("prefix must be exactly one character, got {0:?}")]
    InvalidPrefix(String),

    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("failed to build mention pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remote option supplier failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The supplier rejected; the message comes from the supplier.
    #[error("options fetch failed: {0}")]
    Failed(String),

    /// `finish_fetch` was called while no fetch was in flight.
    #[error("no options fetch in flight")]
    NotInFlight,
}

/// Rejected runtime `set` calls.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SetError {
    #[error("`{0}` cannot be set at runtime")]
    UnknownKey(String),

    #[error("`{key}` expects {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

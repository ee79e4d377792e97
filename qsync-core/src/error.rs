use thiserror::Error;

/// Failures raised by a query codec.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode query string: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),
    #[error("Failed to encode query string: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("Value for '{key}' cannot be represented in a query string")]
    UnsupportedValue { key: String },
}

/// A history collaborator refused or failed to navigate.
#[derive(Error, Debug)]
#[error("Navigation to '{path}' failed: {reason}")]
pub struct NavigationError {
    pub path: String,
    pub reason: String,
}

impl NavigationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("State serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("State must serialize to a key/value object")]
    NotAnObject,
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("Query string controller is not mounted")]
    NotMounted,
}

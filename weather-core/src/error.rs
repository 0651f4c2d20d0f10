use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Coarse classification of a failed primary fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    AuthError,
    NotFound,
    ProviderError,
    TransportError,
}

/// Terminal failure of a current-weather, forecast or geolocation request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid or inactive API key. Please activate your key.")]
    Auth,
    #[error("City '{city}' not found.")]
    NotFound { city: String },
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Auth => ErrorKind::AuthError,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Provider(_) => ErrorKind::ProviderError,
            FetchError::Transport(_) => ErrorKind::TransportError,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    /// Unreadable bodies are transport failures; well-formed JSON with the
    /// wrong shape is the provider's fault.
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            FetchError::Provider(format!("Unexpected provider response: {err}"))
        } else {
            FetchError::Transport(format!("Malformed provider response: {err}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Please enter a city name.")]
    MissingCity,
}

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("Failed to access favorites file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Favorites file {path} is not a JSON list of strings: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

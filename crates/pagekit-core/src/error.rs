use thiserror::Error;

/// Failure of the persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write store: {0}")]
    Write(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Failure of the named cache store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache name: {0:?}")]
    InvalidName(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Failed to fetch {id} into cache: {source}")]
    Fetch {
        id: String,
        #[source]
        source: FetchError,
    },
}

/// Failure of a network fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid resource identifier {id}: {reason}")]
    InvalidResource { id: String, reason: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected response: {0}")]
    BadStatus(String),

    #[error("Network unavailable: {0}")]
    Offline(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Classify a non-success status seen while pre-caching an asset.
    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            404 => FetchError::NotFound(truncated),
            500..=599 => FetchError::ServerError(truncated),
            _ => FetchError::BadStatus(format!("Status {}: {}", status, truncated)),
        }
    }
}

/// Failure of the asset worker lifecycle.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Cannot {operation} while worker is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Install of cache {version} failed: {source}")]
    Install {
        version: String,
        #[source]
        source: CacheError,
    },

    #[error("Cache {0} has not been installed")]
    NotInstalled(String),

    #[error("Cache store error: {0}")]
    Cache(#[from] CacheError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Failure to decode a checkin state key.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key {0:?} is not a checkin key")]
    WrongPrefix(String),

    #[error("Key {0:?} has a malformed index")]
    BadIndex(String),
}

/// Failure of the scheduled reset.
#[derive(Error, Debug)]
pub enum ResetError {
    #[error("Failed to clear checkin {key}: {source}")]
    Clear {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to write last reset marker: {0}")]
    Marker(#[source] StoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies() {
        assert!(matches!(FetchError::from_status(404, "gone"), FetchError::NotFound(_)));
        assert!(matches!(FetchError::from_status(503, ""), FetchError::ServerError(_)));
        assert!(matches!(FetchError::from_status(302, ""), FetchError::BadStatus(_)));
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "x".repeat(2000);
        match FetchError::from_status(500, &body) {
            FetchError::ServerError(msg) => {
                assert!(msg.len() < 600);
                assert!(msg.ends_with("(truncated, 2000 total bytes)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

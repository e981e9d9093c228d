//! Content store error types.

use evp_core::{ContentId, EvidenceError, NotFoundError, ValidationError};

use crate::config::ConfigError;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No blob is stored under this identifier.
    #[error("content {0} not found")]
    NotFound(ContentId),

    /// Transport failure, timeout, or a 5xx from a remote backend.
    #[error("{backend} store unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    /// The backend refused the request (non-retryable 4xx).
    #[error("{endpoint} returned {status}: {message}")]
    Rejected {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Stored bytes no longer hash to their identifier.
    #[error("integrity check failed for {content_id}: stored bytes hash to {actual}")]
    Integrity {
        content_id: ContentId,
        actual: String,
    },

    /// The backend answered with something that is not a valid response.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// Whether repeating the call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Io(_))
    }
}

impl From<StoreError> for EvidenceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                EvidenceError::NotFound(NotFoundError::Content(id.as_str().to_string()))
            }
            StoreError::Validation(v) => EvidenceError::Validation(v),
            other => EvidenceError::StoreUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_content_not_found() {
        let id = ContentId::new("QmMissing").unwrap();
        let err: EvidenceError = StoreError::NotFound(id).into();
        assert!(matches!(
            err,
            EvidenceError::NotFound(NotFoundError::Content(ref s)) if s == "QmMissing"
        ));
    }

    #[test]
    fn unavailable_maps_to_store_unavailable_and_is_transient() {
        let err = StoreError::Unavailable {
            backend: "pinata",
            reason: "503".into(),
        };
        assert!(err.is_transient());
        let mapped: EvidenceError = err.into();
        assert!(matches!(mapped, EvidenceError::StoreUnavailable(_)));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn rejected_is_not_transient() {
        let err = StoreError::Rejected {
            endpoint: "POST /pinning/pinFileToIPFS".into(),
            status: 401,
            message: "invalid key".into(),
        };
        assert!(!err.is_transient());
        assert!(format!("{err}").contains("401"));
    }
}

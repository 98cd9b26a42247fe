//! Error taxonomy shared by every catalog operation

use thiserror::Error;

/// Errors surfaced by the fetch layer, persistence calls and lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport failure (fetch, probe, preload, persistence)
    #[error("network error: {message}")]
    Network { message: String, timed_out: bool },

    /// A slug resolved to no record
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Required external credentials are absent
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The response did not have the expected shape
    #[error("malformed response: {0}")]
    Validation(String),

    /// The source answered with zero records
    #[error("no {0} returned")]
    EmptyResult(&'static str),

    /// Local client storage could not be read or written
    #[error("storage error: {0}")]
    Storage(String),
}

impl CatalogError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn game_not_found(slug: &str) -> Self {
        Self::NotFound {
            kind: "game",
            key: slug.to_string(),
        }
    }

    pub fn article_not_found(slug: &str) -> Self {
        Self::NotFound {
            kind: "article",
            key: slug.to_string(),
        }
    }

    /// Whether offering the user a retry makes sense. Anything the fetch layer
    /// can hand back qualifies; lookups, credentials and storage do not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Validation(_) | Self::EmptyResult(_)
        )
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CatalogError::network("reset").is_retryable());
        assert!(CatalogError::timeout("slow").is_retryable());
        assert!(CatalogError::Validation("bad".into()).is_retryable());
        assert!(CatalogError::EmptyResult("games").is_retryable());
        assert!(!CatalogError::game_not_found("mario").is_retryable());
        assert!(!CatalogError::Configuration("no key".into()).is_retryable());
        assert!(!CatalogError::Storage("quota".into()).is_retryable());
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::article_not_found("hello-world");
        assert_eq!(err.to_string(), "article not found: hello-world");
    }
}

//! Error types for vendorscope

/// Result type alias using vendorscope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vendorscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed company identity
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing provider credential or unusable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A single search provider call failed
    #[error("search error: {0}")]
    Search(String),

    /// Page fetch for deep-context verification failed
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Context verifier call failed
    #[error("verifier error: {0}")]
    Verifier(String),

    /// Cache or downstream record write/read failed
    #[error("store error: {0}")]
    Store(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Run exceeded its time or resource budget
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new search error
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a new fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new verifier error
    pub fn verifier(msg: impl Into<String>) -> Self {
        Self::Verifier(msg.into())
    }

    /// Create a new store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is recovered locally without aborting a run
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Search(_) | Self::Fetch(_) | Self::Verifier(_) | Self::Store(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::search("503").is_recoverable());
        assert!(Error::store("disk full").is_recoverable());
        assert!(!Error::config("missing key").is_recoverable());
        assert!(!Error::Timeout.is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = Error::invalid_input("company_name or tax_id is required");
        assert_eq!(
            err.to_string(),
            "invalid input: company_name or tax_id is required"
        );
    }
}

//! Error types for skimjson lookups

/// Result type alias for skimjson operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for skimjson operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The path does not resolve to a value in the document
    #[error("No value at path '{path}'")]
    NotFound {
        /// Path that was looked up
        path: String,
    },

    /// The document could not be read at the given position
    #[error("Malformed JSON at position {position}")]
    Malformed {
        /// Byte offset where reading failed
        position: usize,
    },

    /// Input exceeds the configured size limit
    #[error("Input too large: {size} bytes > {max} bytes")]
    Oversize {
        /// Input length in bytes
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Input is not valid UTF-8
    #[error("Invalid UTF-8 input: {0}")]
    InvalidEncoding(String),

    /// Configuration was rejected
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a not-found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a malformed-input error
    pub fn malformed(position: usize) -> Self {
        Self::Malformed { position }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether a caller may treat this failure as "value absent"
    ///
    /// Every lookup failure is absent; only configuration errors are not.
    pub fn is_absent(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidEncoding(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Malformed {
            position: err.column(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_failures_are_absent() {
        assert!(Error::not_found("a.b").is_absent());
        assert!(Error::malformed(3).is_absent());
        assert!(Error::Oversize { size: 2, max: 1 }.is_absent());
        assert!(Error::InvalidEncoding("bad".into()).is_absent());
        assert!(!Error::config("zero slots").is_absent());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::not_found("user.id").to_string(),
            "No value at path 'user.id'"
        );
        assert_eq!(
            Error::Oversize { size: 11, max: 10 }.to_string(),
            "Input too large: 11 bytes > 10 bytes"
        );
    }

    #[test]
    fn test_from_utf8_error() {
        let bytes = [0xffu8, 0xfe];
        let err: Error = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }
}

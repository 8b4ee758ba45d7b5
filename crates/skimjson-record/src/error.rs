//! Error types for record field resolution
//!
//! Every variant means "this accessor cannot answer"; callers are expected to
//! fall back to a general accessor rather than surface the error.

/// Result type alias for record resolution
pub type RecordResult<T> = Result<T, RecordError>;

/// Reasons a record path could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RecordError {
    /// Path was empty or contained an empty segment
    #[error("Empty path segment in '{0}'")]
    EmptySegment(String),

    /// No field with this name or alias exists on the record
    #[error("Unknown field '{field}' on {record}")]
    UnknownField {
        /// Segment that failed to match
        field: String,
        /// Record type name
        record: &'static str,
    },

    /// Path continues past a field that cannot be descended into
    #[error("Field '{0}' is terminal but the path continues")]
    NotDescendable(String),

    /// A pointer-like field along the path holds no value
    #[error("Field '{0}' is null")]
    NullPointer(String),

    /// Leaf value exists but has a different kind than requested
    #[error("Field '{field}' cannot be read as {requested}")]
    TypeMismatch {
        /// Final path segment
        field: String,
        /// Requested Rust type name
        requested: &'static str,
    },

    /// Schema was applied to a record of a different type
    #[error("Schema of {expected} applied to {found}")]
    WrongRecord {
        /// Record type the schema was derived for
        expected: &'static str,
        /// Record type actually passed
        found: &'static str,
    },
}

//! Error types for permscope
//!
//! The transformations themselves are total. Errors only surface at the JSON
//! boundary and when the static endpoint table is compiled.

/// The main error type for permscope operations
#[derive(Debug, thiserror::Error)]
pub enum RbacError {
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid endpoint pattern {pattern}: {source}")]
    Pattern {
        pattern: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for permscope operations
pub type Result<T> = std::result::Result<T, RbacError>;

//! Extraction Error Types

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A mandatory field could not be found in the document. The whole page
    /// is considered broken; no partial results are ever returned.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but its value could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// A content hash node was found but did not decode as a 128-bit hex digest.
    #[display("malformed content hash: {_0}")]
    Decode(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The page either has the expected structure or it doesn't.
        false
    }
}

//! Remote Error Types

use derive_more::{Display, Error};

/// A remote-access error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Transport-level failure fetching a document.
    #[display("failed to fetch remote document")]
    Fetch,
    /// The site answered, but not with a page.
    #[display("unexpected HTTP status: {_0}")]
    Status(#[error(not(source))] u16),
    /// A fetched document did not have the expected structure.
    #[display("failed to extract release data from remote document")]
    Extract,
    /// A derived URL was not valid against the configured base.
    #[display("invalid site URL")]
    Url,
    /// The store rejected a write or read during reconciliation.
    #[display("store operation failed")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // There is no in-process retry (a failed fetch is reported once);
        // this hint tells the batch driver whether the next scheduled run
        // stands a chance without operator action.
        match self {
            ErrorKind::Fetch => true,
            ErrorKind::Status(code) => *code >= 500,
            ErrorKind::Extract | ErrorKind::Url | ErrorKind::Store => false,
        }
    }
}

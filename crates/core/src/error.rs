use crate::RecordId;

/// Errors returned by the directory store and its backends.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Caller-supplied data failed validation, such as a blank name or a malformed setting.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No organization or provider with this id is in the directory.
    #[error("record not found: {0}")]
    NotFound(RecordId),
    /// The datastore could not be reached or the response could not be read.
    #[error("datastore request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The datastore answered with a non-success status.
    #[error("datastore rejected {operation} on {table} with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        table: &'static str,
        status: u16,
        body: String,
    },
    /// An insert succeeded but the datastore echoed back no row.
    #[error("datastore returned no row for insert into {0}")]
    EmptyInsert(&'static str),
    /// A datastore response did not have the expected row shape.
    #[error("failed to deserialize datastore response: {0}")]
    Deserialization(serde_json::Error),
    /// The configured datastore URL is not an http(s) URL.
    #[error("invalid datastore url: {0}")]
    InvalidUrl(String),
}

/// Convenience type alias for results with [`DirectoryError`].
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("registry returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode registry response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid registry url: {0}")]
    InvalidUrl(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

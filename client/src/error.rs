use thiserror::Error;

/// Client-side failures. API rejections arrive as values, not exceptions,
/// so the caller can show them as transient notifications without touching
/// the rest of the UI state.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error payload.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("upload failed: {0}")]
    Upload(String),

    /// Asking a question requires a stored credential.
    #[error("API key is not set")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, ClientError>;

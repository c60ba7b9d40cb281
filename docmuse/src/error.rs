use thiserror::Error;

/// Failures that can come out of the question-answering pipeline.
///
/// Every variant is an expected outcome: the HTTP layer converts each one
/// into a JSON error payload with a matching status code. None of them is
/// retried and none of them aborts the process.
#[derive(Debug, Error)]
pub enum DocmuseError {
    /// The string did not parse as a URL, or its path does not name a
    /// `.pdf` resource.
    #[error("invalid PDF URL: {0}")]
    InvalidUrl(String),

    /// The source answered with a non-success status or a content type
    /// other than PDF.
    #[error("PDF is not accessible: {0}")]
    NotAccessible(String),

    /// The downloaded bytes could not be parsed as a PDF.
    #[error("failed to extract PDF text: {0}")]
    Extraction(String),

    /// The caller did not supply a credential for the completion API.
    #[error("API key is required")]
    MissingApiKey,

    /// A question arrived before any document was selected.
    #[error("no PDF selected")]
    NoDocumentSelected,

    /// The completion API answered with a non-success status.
    #[error("generative language API error: {0}")]
    Upstream(String),

    /// The completion API answered 2xx but carried no usable candidate.
    #[error("no usable answer in the completion response")]
    EmptyAnswer,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DocmuseError>;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docmuse::DocmuseError;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps pipeline failures onto the HTTP error contract: a status code and a
/// `{"error": ...}` body. Server-side detail stays in the log, not in the
/// payload.
pub struct ApiError(pub DocmuseError);

impl From<DocmuseError> for ApiError {
    fn from(err: DocmuseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DocmuseError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "Invalid PDF URL format"),
            DocmuseError::NotAccessible(_) => (StatusCode::BAD_REQUEST, "PDF is not accessible"),
            DocmuseError::MissingApiKey => (StatusCode::UNAUTHORIZED, "API key is required"),
            DocmuseError::NoDocumentSelected => (StatusCode::BAD_REQUEST, "No PDF selected"),
            DocmuseError::EmptyAnswer => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sorry, I didn't understand your question.",
            ),
            DocmuseError::Extraction(_) | DocmuseError::Upstream(_) | DocmuseError::Http(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing your request.",
            ),
        };

        if status.is_server_error() {
            log::error!("request failed: {}", self.0);
        } else {
            log::warn!("request rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

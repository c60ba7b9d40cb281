use axum::http::HeaderMap;
use docmuse::{DocmuseError, DEFAULT_SESSION};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SESSION_HEADER: &str = "x-session-id";

/// Pulls the caller-supplied completion-API credential out of the request
/// headers. The key is forwarded upstream as-is; it is not checked against
/// any user registry.
pub fn require_api_key(headers: &HeaderMap) -> Result<&str, DocmuseError> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(DocmuseError::MissingApiKey)
}

/// Resolves which session context a request addresses. Requests without the
/// header share the default session.
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_or_blank_key_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            require_api_key(&headers),
            Err(DocmuseError::MissingApiKey)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("   "));
        assert!(matches!(
            require_api_key(&headers),
            Err(DocmuseError::MissingApiKey)
        ));
    }

    #[test]
    fn present_key_is_returned_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" secret-key "));
        assert_eq!(require_api_key(&headers).unwrap(), "secret-key");
    }

    #[test]
    fn session_defaults_when_header_absent() {
        assert_eq!(session_id(&HeaderMap::new()), DEFAULT_SESSION);

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("tab-42"));
        assert_eq!(session_id(&headers), "tab-42");
    }
}

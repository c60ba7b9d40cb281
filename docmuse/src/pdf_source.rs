use std::future::Future;

use url::Url;

use crate::error::{DocmuseError, Result};

/// Checks that a string parses as a URL whose path names a `.pdf` resource.
///
/// This is a pure check: no network traffic happens here, so rejected URLs
/// never cost a fetch.
pub fn validate_pdf_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|_| DocmuseError::InvalidUrl(raw.to_string()))?;
    if url.path().to_ascii_lowercase().ends_with(".pdf") {
        Ok(url)
    } else {
        Err(DocmuseError::InvalidUrl(raw.to_string()))
    }
}

/// Access to a remote PDF source.
///
/// The HTTP surface and the answer pipeline talk to the source only through
/// this trait, so tests can substitute a canned implementation.
pub trait DocumentFetcher: Send + Sync {
    /// Confirms the URL is reachable and actually serves a PDF.
    fn probe(&self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Downloads the raw document bytes.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Production fetcher backed by a shared `reqwest` client.
///
/// Each call issues exactly one outbound request; nothing is cached at this
/// layer.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn probe(&self, url: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DocmuseError::NotAccessible(format!(
                "{url} returned {status}"
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if content_type
            .to_ascii_lowercase()
            .contains("application/pdf")
        {
            Ok(())
        } else {
            Err(DocmuseError::NotAccessible(format!(
                "{url} served content type {content_type:?}"
            )))
        }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("fetching {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DocmuseError::NotAccessible(format!(
                "{url} returned {status}"
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_urls() {
        assert!(validate_pdf_url("https://example.com/report.pdf").is_ok());
        assert!(validate_pdf_url("https://example.com/files/Q3.PDF").is_ok());
        assert!(validate_pdf_url("https://example.com/a.pdf?version=2").is_ok());
    }

    #[test]
    fn rejects_non_pdf_paths() {
        assert!(matches!(
            validate_pdf_url("https://example.com/report.txt"),
            Err(DocmuseError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_pdf_url("https://example.com/pdf"),
            Err(DocmuseError::InvalidUrl(_))
        ));
        // `.pdf` in the query string does not make the path a PDF
        assert!(matches!(
            validate_pdf_url("https://example.com/download?file=x.pdf"),
            Err(DocmuseError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_unparseable_urls() {
        assert!(matches!(
            validate_pdf_url("not a url at all"),
            Err(DocmuseError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_pdf_url(""),
            Err(DocmuseError::InvalidUrl(_))
        ));
    }
}

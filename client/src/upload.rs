use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{ClientError, Result};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Client for a hosted-file service: when the user supplies a local file
/// instead of a URL, the file is uploaded first and the returned hosted URL
/// is what gets handed to `/set-pdf`.
pub struct UploadClient {
    http: reqwest::Client,
    upload_url: String,
}

impl UploadClient {
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.into(),
        }
    }

    /// Posts the file as multipart form data; returns the hosted URL from
    /// the service's JSON response.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ClientError::Upload(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upload(format!(
                "upload service returned {status}"
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|_| ClientError::Upload("malformed upload response".to_string()))?;
        Ok(body.url)
    }

    /// Asks the service to drop a previously uploaded file.
    pub async fn delete(&self, hosted_url: &str) -> Result<()> {
        let response = self.http.delete(hosted_url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Upload(format!("delete returned {status}")))
        }
    }
}

use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ClientError, Result};

const API_KEY_HEADER: &str = "x-api-key";
const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub msg: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TitleBody {
    title: String,
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the document question-answering API. Each client runs
/// under its own session id so concurrent clients do not overwrite each
/// other's selected document.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.http.get(&self.base_url).send().await?;
        parse(response).await
    }

    /// Switches the server-side selected document to the given URL.
    pub async fn set_pdf(&self, pdf_url: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/set-pdf", self.base_url))
            .header(SESSION_HEADER, &self.session_id)
            .json(&serde_json::json!({ "pdfUrl": pdf_url }))
            .send()
            .await?;
        let body: MessageBody = parse(response).await?;
        Ok(body.message)
    }

    pub async fn get_pdf_title(&self, pdf_url: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/get-pdf-title", self.base_url))
            .header(SESSION_HEADER, &self.session_id)
            .json(&serde_json::json!({ "pdfUrl": pdf_url }))
            .send()
            .await?;
        let body: TitleBody = parse(response).await?;
        Ok(body.title)
    }

    /// Asks about the currently selected document, forwarding the user's
    /// credential with the request.
    pub async fn ask_question(&self, question: &str, api_key: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/ask-question", self.base_url))
            .header(SESSION_HEADER, &self.session_id)
            .header(API_KEY_HEADER, api_key)
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await?;
        let body: AnswerBody = parse(response).await?;
        Ok(body.answer)
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("request failed with status {status}"),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPdfRequest {
    pub pdf_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfTitleRequest {
    pub pdf_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SetPdfResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PdfTitleResponse {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

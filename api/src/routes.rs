use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use docmuse::{derive_title, validate_pdf_url, ChatCompleter, DocumentFetcher, TextExtractor};
use tower_http::cors::CorsLayer;

use crate::auth::{require_api_key, session_id};
use crate::error::ApiError;
use crate::payloads::{
    AnswerResponse, AskQuestionRequest, HealthResponse, PdfTitleRequest, PdfTitleResponse,
    SetPdfRequest, SetPdfResponse,
};
use crate::state::AppState;

pub fn router<F, E, C>(state: AppState<F, E, C>) -> Router
where
    F: DocumentFetcher + 'static,
    E: TextExtractor + 'static,
    C: ChatCompleter + 'static,
{
    Router::new()
        .route("/", get(health))
        .route("/set-pdf", post(set_pdf::<F, E, C>))
        .route("/get-pdf-title", post(get_pdf_title::<F, E, C>))
        .route("/ask-question", post(ask_question::<F, E, C>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "success",
        msg: "API is working well.",
    })
}

async fn set_pdf<F, E, C>(
    State(state): State<AppState<F, E, C>>,
    headers: HeaderMap,
    Json(request): Json<SetPdfRequest>,
) -> Result<Json<SetPdfResponse>, ApiError>
where
    F: DocumentFetcher + 'static,
    E: TextExtractor + 'static,
    C: ChatCompleter + 'static,
{
    let url = validate_pdf_url(&request.pdf_url)?;
    state.fetcher.probe(url.as_str()).await?;

    let session = session_id(&headers);
    state.sessions.select(&session, url.as_str()).await;
    log::info!("session {session} selected {url}");

    Ok(Json(SetPdfResponse {
        message: "PDF URL updated successfully",
    }))
}

async fn get_pdf_title<F, E, C>(
    State(state): State<AppState<F, E, C>>,
    Json(request): Json<PdfTitleRequest>,
) -> Result<Json<PdfTitleResponse>, ApiError>
where
    F: DocumentFetcher + 'static,
    E: TextExtractor + 'static,
    C: ChatCompleter + 'static,
{
    let url = validate_pdf_url(&request.pdf_url)?;
    let bytes = state.fetcher.fetch_bytes(url.as_str()).await?;
    let document = state.extractor.extract(&bytes)?;

    Ok(Json(PdfTitleResponse {
        title: derive_title(&document, url.as_str()),
    }))
}

async fn ask_question<F, E, C>(
    State(state): State<AppState<F, E, C>>,
    headers: HeaderMap,
    Json(request): Json<AskQuestionRequest>,
) -> Result<Json<AnswerResponse>, ApiError>
where
    F: DocumentFetcher + 'static,
    E: TextExtractor + 'static,
    C: ChatCompleter + 'static,
{
    let api_key = require_api_key(&headers)?;
    let session = session_id(&headers);

    let answer = state
        .answers
        .answer(&state.sessions, &session, &request.question, api_key)
        .await?;

    Ok(Json(AnswerResponse { answer }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use docmuse::{
        AnswerService, DocmuseError, ExtractedDocument, Result as DocmuseResult, SessionStore,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[derive(Clone)]
    struct FakeFetcher {
        accessible: bool,
        probes: Arc<AtomicUsize>,
        fetches: Arc<AtomicUsize>,
    }

    impl FakeFetcher {
        fn new(accessible: bool) -> Self {
            Self {
                accessible,
                probes: Arc::new(AtomicUsize::new(0)),
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl DocumentFetcher for FakeFetcher {
        async fn probe(&self, url: &str) -> DocmuseResult<()> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.accessible {
                Ok(())
            } else {
                Err(DocmuseError::NotAccessible(url.to_string()))
            }
        }

        async fn fetch_bytes(&self, _url: &str) -> DocmuseResult<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(b"%PDF-1.4 fake".to_vec())
        }
    }

    #[derive(Clone)]
    struct FakeExtractor {
        text: String,
        title: Option<String>,
    }

    impl TextExtractor for FakeExtractor {
        fn extract(&self, _bytes: &[u8]) -> DocmuseResult<ExtractedDocument> {
            Ok(ExtractedDocument {
                text: self.text.clone(),
                title: self.title.clone(),
            })
        }
    }

    #[derive(Clone)]
    struct FakeCompleter {
        answer: String,
        completions: Arc<AtomicUsize>,
        prompts: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeCompleter {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                completions: Arc::new(AtomicUsize::new(0)),
                prompts: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    impl ChatCompleter for FakeCompleter {
        async fn complete(&self, prompt: &str, _api_key: &str) -> DocmuseResult<String> {
            self.completions.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.answer.clone())
        }
    }

    struct Harness {
        app: Router,
        fetcher: FakeFetcher,
        completer: FakeCompleter,
    }

    fn harness(fetcher: FakeFetcher, extractor: FakeExtractor, completer: FakeCompleter) -> Harness {
        let fetcher_arc = Arc::new(fetcher.clone());
        let extractor_arc = Arc::new(extractor);
        let state = AppState {
            sessions: SessionStore::new(),
            fetcher: fetcher_arc.clone(),
            extractor: extractor_arc.clone(),
            answers: Arc::new(AnswerService::new(
                fetcher_arc,
                extractor_arc,
                completer.clone(),
            )),
        };
        Harness {
            app: router(state),
            fetcher,
            completer,
        }
    }

    fn default_harness() -> Harness {
        harness(
            FakeFetcher::new(true),
            FakeExtractor {
                text: "Short Title\nbody text".to_string(),
                title: None,
            },
            FakeCompleter::new("42 is the answer"),
        )
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_success() {
        let h = default_harness();
        let (status, body) = send(&h.app, "GET", "/", None, &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["msg"], "API is working well.");
    }

    #[tokio::test]
    async fn set_pdf_rejects_invalid_urls_without_fetching() {
        let h = default_harness();
        for bad in ["not a url", "https://example.com/page.html"] {
            let (status, body) = send(
                &h.app,
                "POST",
                "/set-pdf",
                Some(json!({"pdfUrl": bad})),
                &[],
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Invalid PDF URL format");
        }
        assert_eq!(h.fetcher.probes.load(Ordering::SeqCst), 0);
        assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_pdf_title_rejects_invalid_urls_without_fetching() {
        let h = default_harness();
        let (status, body) = send(
            &h.app,
            "POST",
            "/get-pdf-title",
            Some(json!({"pdfUrl": "ftp:/broken"})),
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid PDF URL format");
        assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn set_pdf_rejects_sources_that_are_not_pdfs() {
        let h = harness(
            FakeFetcher::new(false),
            FakeExtractor {
                text: String::new(),
                title: None,
            },
            FakeCompleter::new(""),
        );
        let (status, body) = send(
            &h.app,
            "POST",
            "/set-pdf",
            Some(json!({"pdfUrl": "https://example.com/a.pdf"})),
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "PDF is not accessible");
        assert_eq!(h.fetcher.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ask_question_requires_an_api_key() {
        let h = default_harness();
        let (status, body) = send(
            &h.app,
            "POST",
            "/ask-question",
            Some(json!({"question": "hi"})),
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "API key is required");
    }

    #[tokio::test]
    async fn ask_question_requires_a_selected_document() {
        let h = default_harness();
        let (status, body) = send(
            &h.app,
            "POST",
            "/ask-question",
            Some(json!({"question": "hi"})),
            &[("x-api-key", "test-key")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No PDF selected");
        assert_eq!(h.completer.completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ask_question_answers_from_the_selected_document() {
        let h = default_harness();

        let (status, _) = send(
            &h.app,
            "POST",
            "/set-pdf",
            Some(json!({"pdfUrl": "https://example.com/report.pdf"})),
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &h.app,
            "POST",
            "/ask-question",
            Some(json!({"question": "what is the answer?"})),
            &[("x-api-key", "test-key")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "42 is the answer");

        // Exactly one probe (set-pdf), one fetch and one completion.
        assert_eq!(h.fetcher.probes.load(Ordering::SeqCst), 1);
        assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(h.completer.completions.load(Ordering::SeqCst), 1);

        let prompts = h.completer.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            "Here is the text from the PDF:\nShort Title\nbody text\n\nQuestion: what is the answer?"
        );
    }

    #[tokio::test]
    async fn second_question_reuses_the_cached_extraction() {
        let h = default_harness();
        send(
            &h.app,
            "POST",
            "/set-pdf",
            Some(json!({"pdfUrl": "https://example.com/report.pdf"})),
            &[],
        )
        .await;

        for _ in 0..2 {
            let (status, _) = send(
                &h.app,
                "POST",
                "/ask-question",
                Some(json!({"question": "again?"})),
                &[("x-api-key", "test-key")],
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(h.completer.completions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_header() {
        let h = default_harness();
        send(
            &h.app,
            "POST",
            "/set-pdf",
            Some(json!({"pdfUrl": "https://example.com/report.pdf"})),
            &[("x-session-id", "tab-a")],
        )
        .await;

        let (status, body) = send(
            &h.app,
            "POST",
            "/ask-question",
            Some(json!({"question": "hi"})),
            &[("x-api-key", "test-key"), ("x-session-id", "tab-b")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No PDF selected");
    }

    #[tokio::test]
    async fn get_pdf_title_derives_from_the_first_line() {
        let h = harness(
            FakeFetcher::new(true),
            FakeExtractor {
                text: "Annual Report 2023 — Executive Summary and Financial Highlights for Fiscal Year\nbody"
                    .to_string(),
                title: None,
            },
            FakeCompleter::new(""),
        );
        let (status, body) = send(
            &h.app,
            "POST",
            "/get-pdf-title",
            Some(json!({"pdfUrl": "https://example.com/report.pdf"})),
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["title"],
            "Annual Report 2023 — Executive Summary and Financi..."
        );
        assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 1);
    }
}

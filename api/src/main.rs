mod auth;
mod error;
mod payloads;
mod routes;
mod state;

use std::env;
use std::sync::Arc;

use anyhow::Result;
use docmuse::gemini_service::DEFAULT_MODEL;
use docmuse::{AnswerService, GeminiService, HttpFetcher, PdfTextExtractor, SessionStore};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let http = reqwest::Client::new();
    let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let fetcher = Arc::new(HttpFetcher::new(http.clone()));
    let extractor = Arc::new(PdfTextExtractor::new());
    let completer = GeminiService::new(http, model);
    let state = AppState {
        sessions: SessionStore::new(),
        fetcher: fetcher.clone(),
        extractor: extractor.clone(),
        answers: Arc::new(AnswerService::new(fetcher, extractor, completer)),
    };

    let app = routes::router(state);

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

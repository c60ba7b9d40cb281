use std::sync::Arc;

use crate::document_processor::TextExtractor;
use crate::error::{DocmuseError, Result};
use crate::gemini_service::{build_prompt, ChatCompleter};
use crate::pdf_source::DocumentFetcher;
use crate::session::SessionStore;

/// Answers questions about a session's selected document.
///
/// The first question after a selection fetches and extracts the document
/// once; later questions against the same selection reuse the cached
/// extraction.
pub struct AnswerService<F, E, C> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
    completer: C,
}

impl<F, E, C> AnswerService<F, E, C>
where
    F: DocumentFetcher,
    E: TextExtractor,
    C: ChatCompleter,
{
    pub fn new(fetcher: Arc<F>, extractor: Arc<E>, completer: C) -> Self {
        Self {
            fetcher,
            extractor,
            completer,
        }
    }

    /// Resolves the selected document, builds the prompt and forwards it to
    /// the completion API with the caller's credential.
    pub async fn answer(
        &self,
        sessions: &SessionStore,
        session: &str,
        question: &str,
        api_key: &str,
    ) -> Result<String> {
        let url = sessions
            .selected_url(session)
            .await
            .ok_or(DocmuseError::NoDocumentSelected)?;

        let document = match sessions.cached_document(session, &url).await {
            Some(document) => document,
            None => {
                log::info!("extracting {url} for session {session}");
                let bytes = self.fetcher.fetch_bytes(&url).await?;
                let document = self.extractor.extract(&bytes)?;
                sessions.cache_document(session, &url, document.clone()).await;
                document
            }
        };

        let prompt = build_prompt(&document.text, question);
        self.completer.complete(&prompt, api_key).await
    }
}

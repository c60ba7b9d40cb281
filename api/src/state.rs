use std::sync::Arc;

use docmuse::{AnswerService, SessionStore};

/// Shared handler state: the per-session selections plus the pipeline
/// collaborators, generic over the fetcher/extractor/completer so tests can
/// run the router against fakes.
pub struct AppState<F, E, C> {
    pub sessions: SessionStore,
    pub fetcher: Arc<F>,
    pub extractor: Arc<E>,
    pub answers: Arc<AnswerService<F, E, C>>,
}

impl<F, E, C> Clone for AppState<F, E, C> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            answers: self.answers.clone(),
        }
    }
}

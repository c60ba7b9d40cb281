use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::document_processor::ExtractedDocument;

/// Session id used by callers that never name one. Those callers share a
/// single selection, matching the behavior of a process-wide pointer.
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug)]
struct SelectedDocument {
    url: String,
    cached: Option<ExtractedDocument>,
}

#[derive(Debug, Default)]
struct SessionContext {
    selected: Option<SelectedDocument>,
}

/// Per-session document selection shared across request handlers.
///
/// Each session id owns its own selection and extraction cache, so two
/// callers presenting different ids cannot overwrite each other's document.
/// The cache holds at most the one extraction belonging to the current
/// selection; re-selecting drops it.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently overwrites the session's selection and drops any cached
    /// extraction for the previous document.
    pub async fn select(&self, session: &str, url: &str) {
        let mut sessions = self.sessions.write().await;
        let context = sessions.entry(session.to_string()).or_default();
        context.selected = Some(SelectedDocument {
            url: url.to_string(),
            cached: None,
        });
    }

    pub async fn selected_url(&self, session: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session)?
            .selected
            .as_ref()
            .map(|document| document.url.clone())
    }

    /// Returns the cached extraction when it belongs to the given URL.
    pub async fn cached_document(&self, session: &str, url: &str) -> Option<ExtractedDocument> {
        let sessions = self.sessions.read().await;
        let selected = sessions.get(session)?.selected.as_ref()?;
        if selected.url == url {
            selected.cached.clone()
        } else {
            None
        }
    }

    /// Stores the extraction for the session's current selection. If the
    /// selection changed while the document was being extracted, the stale
    /// result is discarded.
    pub async fn cache_document(&self, session: &str, url: &str, document: ExtractedDocument) {
        let mut sessions = self.sessions.write().await;
        if let Some(selected) = sessions
            .get_mut(session)
            .and_then(|context| context.selected.as_mut())
        {
            if selected.url == url {
                selected.cached = Some(document);
            }
        }
    }
}

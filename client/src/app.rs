use crate::api::ApiClient;
use crate::conversation::Conversation;
use crate::error::{ClientError, Result};
use crate::library::{DocumentLibrary, DocumentRef};
use crate::storage::Storage;

/// Storage key for the user's completion-API credential.
pub const API_KEY_KEY: &str = "api_key";

/// Top-level client state: the chat thread, the document sidebar and the
/// stored credential, wired to the HTTP API.
pub struct App<S> {
    api: ApiClient,
    storage: S,
    api_key: Option<String>,
    pub conversation: Conversation,
    pub library: DocumentLibrary<S>,
}

impl<S: Storage + Clone> App<S> {
    pub fn new(api: ApiClient, storage: S) -> Self {
        let api_key = storage.get(API_KEY_KEY);
        let library = DocumentLibrary::load(storage.clone());
        Self {
            api,
            storage,
            api_key,
            conversation: Conversation::new(),
            library,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        self.storage.set(API_KEY_KEY, key)?;
        self.api_key = Some(key.to_string());
        Ok(())
    }

    /// Adds a document by URL: server-side switch first, then the title
    /// lookup, then the local insert + select. The thread resets because
    /// the selection changed.
    pub async fn add_document(&mut self, url: &str) -> Result<DocumentRef> {
        self.api.set_pdf(url).await?;
        let title = self.api.get_pdf_title(url).await?;

        let document = DocumentRef {
            url: url.to_string(),
            title,
        };
        self.library.upsert(document.clone())?;
        self.finish_switch(url)?;
        Ok(document)
    }

    /// Switches to an already-listed document.
    pub async fn select_document(&mut self, url: &str) -> Result<()> {
        self.api.set_pdf(url).await?;
        self.finish_switch(url)
    }

    /// Drops a document from the sidebar. Deleting the active one also
    /// unsets the selection and clears the thread. Returns whether it was
    /// the active document.
    pub fn delete_document(&mut self, url: &str) -> Result<bool> {
        let was_selected = self.library.remove(url)?;
        if was_selected {
            self.conversation.clear();
        }
        Ok(was_selected)
    }

    /// Asks about the selected document: optimistic append, then reconcile
    /// with the response or the failure.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let api_key = self.api_key.clone().ok_or(ClientError::MissingApiKey)?;

        let pending = self.conversation.push_pending_user(question);
        match self.api.ask_question(question, &api_key).await {
            Ok(answer) => {
                self.conversation.commit_answer(pending, &answer);
                Ok(answer)
            }
            Err(err) => {
                self.conversation.mark_failed(pending);
                Err(err)
            }
        }
    }

    /// Local half of a document switch, applied only after the server
    /// accepted the new selection.
    fn finish_switch(&mut self, url: &str) -> Result<()> {
        self.library.select(url)?;
        self.conversation.clear();
        Ok(())
    }
}

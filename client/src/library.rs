use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::storage::Storage;

/// Storage key for the persisted document list.
pub const DOCUMENTS_KEY: &str = "pdf_links";
/// Storage key for the selected document URL.
pub const SELECTED_KEY: &str = "selected_pdf";

/// A document the user added to the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub url: String,
    pub title: String,
}

/// Sidebar state: the persisted list of added documents plus the selection.
/// Every mutation is written through to storage so the list survives
/// restarts.
pub struct DocumentLibrary<S> {
    storage: S,
    documents: Vec<DocumentRef>,
    selected: Option<String>,
}

impl<S: Storage> DocumentLibrary<S> {
    pub fn load(storage: S) -> Self {
        let documents = storage
            .get(DOCUMENTS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let selected = storage.get(SELECTED_KEY);
        Self {
            storage,
            documents,
            selected,
        }
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&DocumentRef> {
        self.documents.get(index)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Adds an entry, or refreshes its title when the URL is already listed.
    pub fn upsert(&mut self, document: DocumentRef) -> Result<()> {
        match self
            .documents
            .iter_mut()
            .find(|existing| existing.url == document.url)
        {
            Some(existing) => *existing = document,
            None => self.documents.push(document),
        }
        self.persist_documents()
    }

    pub fn select(&mut self, url: &str) -> Result<()> {
        self.selected = Some(url.to_string());
        self.storage.set(SELECTED_KEY, url)
    }

    /// Removes the entry. Returns whether it was the selected document, in
    /// which case the selection is also unset.
    pub fn remove(&mut self, url: &str) -> Result<bool> {
        self.documents.retain(|document| document.url != url);
        self.persist_documents()?;

        if self.selected.as_deref() == Some(url) {
            self.selected = None;
            self.storage.remove(SELECTED_KEY)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn persist_documents(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.documents)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        self.storage.set(DOCUMENTS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn doc(url: &str, title: &str) -> DocumentRef {
        DocumentRef {
            url: url.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn documents_persist_across_reload() {
        let storage = MemoryStorage::new();
        {
            let mut library = DocumentLibrary::load(storage.clone());
            library.upsert(doc("https://example.com/a.pdf", "A")).unwrap();
            library.select("https://example.com/a.pdf").unwrap();
        }

        let library = DocumentLibrary::load(storage);
        assert_eq!(library.documents(), &[doc("https://example.com/a.pdf", "A")]);
        assert_eq!(library.selected(), Some("https://example.com/a.pdf"));
    }

    #[test]
    fn upsert_refreshes_existing_entries() {
        let mut library = DocumentLibrary::load(MemoryStorage::new());
        library.upsert(doc("https://example.com/a.pdf", "Old")).unwrap();
        library.upsert(doc("https://example.com/a.pdf", "New")).unwrap();

        assert_eq!(library.documents().len(), 1);
        assert_eq!(library.documents()[0].title, "New");
    }

    #[test]
    fn removing_the_selected_document_unsets_the_selection() {
        let mut library = DocumentLibrary::load(MemoryStorage::new());
        library.upsert(doc("https://example.com/a.pdf", "A")).unwrap();
        library.select("https://example.com/a.pdf").unwrap();

        let was_selected = library.remove("https://example.com/a.pdf").unwrap();
        assert!(was_selected);
        assert!(library.documents().is_empty());
        assert_eq!(library.selected(), None);
    }

    #[test]
    fn removing_another_document_keeps_the_selection() {
        let mut library = DocumentLibrary::load(MemoryStorage::new());
        library.upsert(doc("https://example.com/a.pdf", "A")).unwrap();
        library.upsert(doc("https://example.com/b.pdf", "B")).unwrap();
        library.select("https://example.com/a.pdf").unwrap();

        let was_selected = library.remove("https://example.com/b.pdf").unwrap();
        assert!(!was_selected);
        assert_eq!(library.selected(), Some("https://example.com/a.pdf"));
    }
}

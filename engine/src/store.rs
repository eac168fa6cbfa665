use crate::document::{DocId, Document};
use std::collections::HashSet;

/// Append-only forward index. A document's id is its position, so
/// lookups are a bounds-checked slice access and ids stay dense.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: Vec<Document>,
    keys: HashSet<String>,
    max_recommendations: u32,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next accepted document will receive.
    pub fn next_id(&self) -> DocId {
        self.docs.len() as DocId
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Caller guarantees `doc.doc_id == self.next_id()` and that `key`
    /// is the document's identity key.
    pub fn push(&mut self, key: String, doc: Document) {
        debug_assert_eq!(doc.doc_id, self.next_id());
        self.keys.insert(key);
        if doc.recommendations > self.max_recommendations {
            self.max_recommendations = doc.recommendations;
        }
        self.docs.push(doc);
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id as usize)
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Highest recommendation count seen so far; popularity scores are
    /// normalized against this watermark.
    pub fn max_recommendations(&self) -> u32 {
        self.max_recommendations
    }

    /// Rebuild from restored documents. Identity keys and the
    /// recommendation watermark are derived, not persisted.
    pub fn from_docs(docs: Vec<Document>) -> Self {
        let mut keys = HashSet::with_capacity(docs.len());
        let mut max_recommendations = 0;
        for doc in &docs {
            keys.insert(doc.identity_key());
            max_recommendations = max_recommendations.max(doc.recommendations);
        }
        Self {
            docs,
            keys,
            max_recommendations,
        }
    }
}

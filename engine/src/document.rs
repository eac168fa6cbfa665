use crate::record::RawRecord;
use crate::semantic::{embed, WordVectors};
use serde::{Deserialize, Serialize};

pub type DocId = u32;

/// One stored catalog item. The plain fields are immutable once ingested
/// and are the only part that serializes; the lowercased text and the
/// embedding are derived caches rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: DocId,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub header_image: String,
    pub metacritic_score: u32,
    pub recommendations: u32,
    pub is_free: bool,
    #[serde(skip)]
    pub(crate) name_lc: String,
    #[serde(skip)]
    pub(crate) description_lc: String,
    #[serde(skip)]
    pub(crate) embedding: Option<Vec<f32>>,
}

impl Document {
    pub(crate) fn from_record(
        doc_id: DocId,
        record: &RawRecord,
        vectors: Option<&dyn WordVectors>,
    ) -> Self {
        let mut doc = Document {
            doc_id,
            app_id: record.app_id_text(),
            name: record.name_text(),
            description: record.description_text(),
            header_image: record.header_image_text(),
            metacritic_score: record.metacritic_value(),
            recommendations: record.recommendations_value(),
            is_free: record.is_free_value(),
            name_lc: String::new(),
            description_lc: String::new(),
            embedding: None,
        };
        doc.recompute_derived(vectors);
        doc
    }

    /// Rebuild the derived caches from the plain fields. Called at
    /// construction and after deserializing a snapshot.
    pub(crate) fn recompute_derived(&mut self, vectors: Option<&dyn WordVectors>) {
        self.name_lc = self.name.to_lowercase();
        self.description_lc = self.description.to_lowercase();
        self.embedding = vectors.and_then(|v| embed(&self.index_text(), v));
    }

    /// The text fed to the tokenizer and the embedding: name and
    /// description joined.
    pub(crate) fn index_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// Identity key of a stored document, used when rebuilding the dedup
    /// set from a snapshot. Empty only for documents that could never have
    /// passed ingestion validation.
    pub(crate) fn identity_key(&self) -> String {
        if !self.app_id.is_empty() {
            self.app_id.clone()
        } else {
            self.name_lc.clone()
        }
    }
}

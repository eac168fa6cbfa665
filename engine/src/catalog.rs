use crate::category::CATEGORIES;
use crate::document::{DocId, Document};
use crate::index::{InvertedIndex, Lexicon};
use crate::ingest::{BatchSummary, ChunkedIngest, DEFAULT_CHUNK_SIZE};
use crate::rank::{self, SearchPage};
use crate::record::RawRecord;
use crate::semantic::WordVectors;
use crate::store::DocumentStore;
use crate::suggest;
use crate::tokenizer::tokenize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of one ingest call. Skips are ordinary outcomes; nothing here
/// is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Added(DocId),
    Duplicate,
    Unidentified,
}

impl IngestOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, IngestOutcome::Added(_))
    }

    pub fn doc_id(&self) -> Option<DocId> {
        match self {
            IngestOutcome::Added(id) => Some(*id),
            _ => None,
        }
    }
}

/// The whole search state: forward index, inverted index and lexicon,
/// kept consistent by routing every mutation through [`ingest`].
///
/// [`ingest`]: CatalogIndex::ingest
#[derive(Default)]
pub struct CatalogIndex {
    pub(crate) store: DocumentStore,
    pub(crate) inverted: InvertedIndex,
    pub(crate) lexicon: Lexicon,
    vectors: Option<Arc<dyn WordVectors>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index that scores a semantic term during ranking. Without
    /// vectors that term contributes zero and everything else behaves
    /// identically.
    pub fn with_vectors(vectors: Arc<dyn WordVectors>) -> Self {
        Self {
            vectors: Some(vectors),
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        store: DocumentStore,
        inverted: InvertedIndex,
        lexicon: Lexicon,
        vectors: Option<Arc<dyn WordVectors>>,
    ) -> Self {
        Self {
            store,
            inverted,
            lexicon,
            vectors,
        }
    }

    /// First-write-wins insertion. The store, dedup set, inverted index
    /// and lexicon are updated together or not at all.
    pub fn ingest(&mut self, record: &RawRecord) -> IngestOutcome {
        let Some(key) = record.identity_key() else {
            return IngestOutcome::Unidentified;
        };
        if self.store.contains_key(&key) {
            return IngestOutcome::Duplicate;
        }

        let id = self.store.next_id();
        let doc = Document::from_record(id, record, self.vectors.as_deref());
        for token in tokenize(&doc.index_text()) {
            self.inverted.add(&token, id);
            self.lexicon.add(token);
        }
        self.store.push(key, doc);
        IngestOutcome::Added(id)
    }

    /// Synchronous convenience over [`ChunkedIngest`] for callers that
    /// do not need to interleave work between chunks.
    pub fn ingest_batch<I>(&mut self, records: I) -> BatchSummary
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut run = ChunkedIngest::new(records.into_iter(), DEFAULT_CHUNK_SIZE);
        while run.process_chunk(self).is_some() {}
        let summary = run.summary();
        tracing::info!(
            added = summary.added,
            duplicates = summary.duplicates,
            unidentified = summary.unidentified,
            "ingest batch complete"
        );
        summary
    }

    /// Ranked, unpaginated search.
    pub fn search(&self, query: &str) -> Vec<&Document> {
        rank::search(&self.store, &self.inverted, self.vectors.as_deref(), query)
    }

    /// Ranked search plus pagination in one call.
    pub fn search_page(&self, query: &str, page: usize, page_size: usize) -> SearchPage<'_> {
        let ranked = self.search(query);
        rank::paginate(&ranked, page, page_size)
    }

    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<&Document> {
        suggest::suggest(&self.store, &self.inverted, partial, limit)
    }

    /// Category carousels for browsing; categories with no members are
    /// omitted entirely.
    pub fn browse(&self) -> Vec<(&'static str, Vec<&Document>)> {
        CATEGORIES
            .iter()
            .filter_map(|category| {
                let members = category.members(self.store.documents());
                if members.is_empty() {
                    None
                } else {
                    Some((category.name, members))
                }
            })
            .collect()
    }

    pub fn doc(&self, id: DocId) -> Option<&Document> {
        self.store.get(id)
    }

    pub fn documents(&self) -> &[Document] {
        self.store.documents()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.inverted.term_count()
    }

    /// Lexicon contents in a stable order, for export.
    pub fn lexicon_terms(&self) -> Vec<String> {
        self.lexicon.sorted_terms()
    }

    /// Inverted index in its interchange shape (barrel, token, ordered
    /// id list), for export.
    pub fn inverted_lists(&self) -> BTreeMap<String, BTreeMap<String, Vec<DocId>>> {
        self.inverted.to_sorted_lists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Scalar;

    fn record(app_id: Option<&str>, name: &str, description: &str) -> RawRecord {
        RawRecord {
            app_id: app_id.map(|v| Scalar::Str(v.to_string())),
            name: Some(Scalar::Str(name.to_string())),
            description: Some(Scalar::Str(description.to_string())),
            ..RawRecord::default()
        }
    }

    #[test]
    fn accepted_ids_count_up_from_zero() {
        let mut catalog = CatalogIndex::new();
        let a = catalog.ingest(&record(Some("10"), "First", ""));
        let b = catalog.ingest(&record(Some("20"), "Second", ""));
        let c = catalog.ingest(&record(Some("30"), "Third", ""));
        assert_eq!(a.doc_id(), Some(0));
        assert_eq!(b.doc_id(), Some(1));
        assert_eq!(c.doc_id(), Some(2));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn duplicate_external_id_keeps_first_record() {
        let mut catalog = CatalogIndex::new();
        assert!(catalog.ingest(&record(Some("42"), "Game A", "")).accepted());
        let second = catalog.ingest(&record(Some("42"), "Game A Remastered", ""));
        assert_eq!(second, IngestOutcome::Duplicate);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.doc(0).unwrap().name, "Game A");
    }

    #[test]
    fn name_fallback_dedup_is_case_insensitive() {
        let mut catalog = CatalogIndex::new();
        assert!(catalog.ingest(&record(None, "Rocket Dash", "")).accepted());
        let dup = catalog.ingest(&record(None, "  ROCKET DASH ", ""));
        assert_eq!(dup, IngestOutcome::Duplicate);
    }

    #[test]
    fn unidentifiable_records_are_skipped_without_side_effects() {
        let mut catalog = CatalogIndex::new();
        let outcome = catalog.ingest(&record(None, "   ", "still has text"));
        assert_eq!(outcome, IngestOutcome::Unidentified);
        assert!(catalog.is_empty());
        assert_eq!(catalog.term_count(), 0);
    }

    #[test]
    fn ingest_indexes_every_token() {
        let mut catalog = CatalogIndex::new();
        let id = catalog
            .ingest(&record(Some("1"), "Neon Drift", "street racing at night"))
            .doc_id()
            .unwrap();
        for token in ["neon", "drift", "street", "racing", "night"] {
            let postings = catalog.inverted.postings_for(token).unwrap();
            assert!(postings.contains(&id), "missing postings for {token}");
            assert!(catalog.lexicon.contains(token));
        }
        // "at" is a stop word and never reaches the index.
        assert!(catalog.inverted.postings_for("at").is_none());
    }

    #[test]
    fn batch_ingest_tallies_outcomes() {
        let mut catalog = CatalogIndex::new();
        let summary = catalog.ingest_batch(vec![
            record(Some("1"), "One", ""),
            record(Some("1"), "One Again", ""),
            record(None, "", ""),
            record(Some("2"), "Two", ""),
        ]);
        assert_eq!(summary.added, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.unidentified, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn browse_omits_empty_categories() {
        let mut catalog = CatalogIndex::new();
        let mut free = record(Some("1"), "Gift Horse", "");
        free.is_free = Some(Scalar::Bool(true));
        catalog.ingest(&free);

        let sections = catalog.browse();
        let names: Vec<&str> = sections.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Free Games"]);
        assert_eq!(sections[0].1[0].name, "Gift Horse");
    }

    #[test]
    fn doc_lookup_by_id() {
        let mut catalog = CatalogIndex::new();
        catalog.ingest(&record(Some("7"), "Lone Entry", ""));
        assert_eq!(catalog.doc(0).unwrap().app_id, "7");
        assert!(catalog.doc(1).is_none());
    }
}

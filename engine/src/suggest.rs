use crate::document::Document;
use crate::index::InvertedIndex;
use crate::store::DocumentStore;
use std::collections::HashSet;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Autocomplete over partially-typed input. Candidates are gathered by
/// prefix scan per whitespace token and ranked by raw recommendation
/// count, not lexical relevance: the panel favors famous matches.
pub fn suggest<'a>(
    store: &'a DocumentStore,
    index: &InvertedIndex,
    partial: &str,
    limit: usize,
) -> Vec<&'a Document> {
    let partial = partial.trim().to_lowercase();
    if partial.is_empty() {
        return Vec::new();
    }

    let mut ids = HashSet::new();
    for token in partial.split_whitespace() {
        ids.extend(index.postings_with_prefix(token));
    }

    let mut docs: Vec<&Document> = ids.into_iter().filter_map(|id| store.get(id)).collect();
    docs.sort_by(|a, b| {
        b.recommendations
            .cmp(&a.recommendations)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    docs.truncate(limit);
    docs
}

use crate::concept;
use crate::document::{DocId, Document};
use crate::index::InvertedIndex;
use crate::semantic::{cosine, embed, WordVectors};
use crate::store::DocumentStore;
use std::cmp::Ordering;
use std::collections::HashSet;

pub const EXACT_PHRASE_WEIGHT: f32 = 1000.0;
pub const PHRASE_PREFIX_BONUS: f32 = 500.0;
pub const NAME_TOKEN_WEIGHT: f32 = 200.0;
pub const DESCRIPTION_TOKEN_WEIGHT: f32 = 50.0;
pub const CONCEPT_NAME_WEIGHT: f32 = 150.0;
pub const SEMANTIC_WEIGHT: f32 = 100.0;
pub const SEMANTIC_THRESHOLD: f32 = 0.12;
/// Candidates whose lexical+semantic score does not exceed this are
/// dropped before the popularity prior, so fame alone cannot surface
/// an irrelevant document.
pub const MATCH_FLOOR: f32 = 10.0;
pub const POPULARITY_WEIGHT: f32 = 5000.0;

pub const DEFAULT_PAGE_SIZE: usize = 7;

/// Fame prior in `[0, 1]`: log-scaled recommendation count normalized
/// against the corpus-wide maximum, blended with the critic score.
pub fn popularity(doc: &Document, max_recommendations: u32) -> f32 {
    let denom = (max_recommendations.max(1) as f32 + 1.0).log10();
    let rec_part = (doc.recommendations as f32 + 1.0).log10() / denom;
    let meta_part = doc.metacritic_score as f32 / 100.0;
    0.85 * rec_part + 0.15 * meta_part
}

fn gather(index: &InvertedIndex, term: &str, candidates: &mut HashSet<DocId>) {
    if let Some(postings) = index.postings_for(term) {
        candidates.extend(postings.iter().copied());
    }
    candidates.extend(index.postings_with_prefix(term));
}

/// Full ranked search. Returns every matching document ordered by
/// descending score, ties broken by ascending id; the caller slices
/// pages out of the result.
pub fn search<'a>(
    store: &'a DocumentStore,
    index: &InvertedIndex,
    vectors: Option<&dyn WordVectors>,
    query: &str,
) -> Vec<&'a Document> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    // Query tokens split on whitespace only. Stop words stay in, so a
    // query like "the room" still matches literally.
    let query_tokens: Vec<&str> = query.split_whitespace().collect();
    let expansion = concept::expand(query_tokens.iter().copied());

    let mut candidates: HashSet<DocId> = HashSet::new();
    for token in &query_tokens {
        gather(index, token, &mut candidates);
    }
    for term in &expansion {
        gather(index, term, &mut candidates);
    }

    let query_vec = vectors.and_then(|v| embed(&query, v));

    let mut scored: Vec<(f32, &Document)> = Vec::with_capacity(candidates.len());
    for &id in &candidates {
        let Some(doc) = store.get(id) else { continue };
        let mut score = 0.0f32;

        if doc.name_lc.contains(query.as_str()) {
            score += EXACT_PHRASE_WEIGHT;
            if doc.name_lc.starts_with(query.as_str()) {
                score += PHRASE_PREFIX_BONUS;
            }
        }

        for token in &query_tokens {
            if doc.name_lc.contains(token) {
                score += NAME_TOKEN_WEIGHT;
            } else if doc.description_lc.contains(token) {
                score += DESCRIPTION_TOKEN_WEIGHT;
            }
        }

        for term in &expansion {
            if doc.name_lc.contains(term) {
                score += CONCEPT_NAME_WEIGHT;
            } else if doc.description_lc.contains(term) {
                score += DESCRIPTION_TOKEN_WEIGHT;
            }
        }

        if let (Some(qv), Some(dv)) = (&query_vec, &doc.embedding) {
            let sim = cosine(qv, dv);
            if sim > SEMANTIC_THRESHOLD {
                score += sim * SEMANTIC_WEIGHT;
            }
        }

        if score > MATCH_FLOOR {
            score += popularity(doc, store.max_recommendations()) * POPULARITY_WEIGHT;
            scored.push((score, doc));
        }
    }

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.doc_id.cmp(&b.1.doc_id))
    });
    scored.into_iter().map(|(_, doc)| doc).collect()
}

/// One page of ranked results plus the numbers a pager needs.
#[derive(Debug)]
pub struct SearchPage<'a> {
    pub results: Vec<&'a Document>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Pure slice of an already-ranked list. Page numbers are 1-based;
/// out-of-range pages yield an empty slice, never an error.
pub fn paginate<'a>(ranked: &[&'a Document], page: usize, page_size: usize) -> SearchPage<'a> {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total = ranked.len();
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);
    let results = if start >= total {
        Vec::new()
    } else {
        ranked[start..(start + page_size).min(total)].to_vec()
    };
    SearchPage {
        results,
        total,
        page,
        page_size,
        total_pages,
    }
}

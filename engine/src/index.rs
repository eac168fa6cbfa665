use crate::document::DocId;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Barrel for tokens that do not start with an ASCII letter.
pub const CATCH_ALL_BARREL: char = '_';

/// Barrel assignment is a pure function of the token's first character:
/// `a`-`z` (case-insensitive) map to themselves, everything else to `_`.
pub fn barrel_for(token: &str) -> char {
    match token.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_lowercase(),
        _ => CATCH_ALL_BARREL,
    }
}

/// Token → posting-set mapping, partitioned into 27 barrels so prefix
/// scans touch a single barrel instead of the whole vocabulary.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    barrels: HashMap<char, HashMap<String, HashSet<DocId>>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str, id: DocId) {
        self.barrels
            .entry(barrel_for(token))
            .or_default()
            .entry(token.to_string())
            .or_default()
            .insert(id);
    }

    /// Exact lookup; `None` for tokens never indexed.
    pub fn postings_for(&self, token: &str) -> Option<&HashSet<DocId>> {
        self.barrels.get(&barrel_for(token))?.get(token)
    }

    /// Union of the posting sets of every token starting with `prefix`,
    /// scanning only the barrel of the prefix's first character.
    pub fn postings_with_prefix(&self, prefix: &str) -> HashSet<DocId> {
        let mut ids = HashSet::new();
        if prefix.is_empty() {
            return ids;
        }
        if let Some(barrel) = self.barrels.get(&barrel_for(prefix)) {
            for (token, postings) in barrel {
                if token.starts_with(prefix) {
                    ids.extend(postings.iter().copied());
                }
            }
        }
        ids
    }

    pub fn term_count(&self) -> usize {
        self.barrels.values().map(|b| b.len()).sum()
    }

    /// Interchange shape: barrel → token → ascending id list, fully
    /// ordered so exports are deterministic.
    pub fn to_sorted_lists(&self) -> BTreeMap<String, BTreeMap<String, Vec<DocId>>> {
        let mut out = BTreeMap::new();
        for (barrel, tokens) in &self.barrels {
            let mut entry: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
            for (token, postings) in tokens {
                let mut ids: Vec<DocId> = postings.iter().copied().collect();
                ids.sort_unstable();
                entry.insert(token.clone(), ids);
            }
            out.insert(barrel.to_string(), entry);
        }
        out
    }

    /// Rebuild from the interchange shape. Barrels are recomputed from
    /// the tokens themselves, so a hand-edited artifact cannot introduce
    /// a misfiled token.
    pub fn from_sorted_lists(lists: &BTreeMap<String, BTreeMap<String, Vec<DocId>>>) -> Self {
        let mut index = Self::new();
        for tokens in lists.values() {
            for (token, ids) in tokens {
                for &id in ids {
                    index.add(token, id);
                }
            }
        }
        index
    }
}

/// All distinct tokens ever indexed; presence only.
#[derive(Debug, Default)]
pub struct Lexicon {
    terms: HashSet<String>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: String) {
        self.terms.insert(term);
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn sorted_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self.terms.iter().cloned().collect();
        terms.sort_unstable();
        terms
    }

    pub fn from_terms<I: IntoIterator<Item = String>>(terms: I) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }
}

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Tokens shorter than this are skipped when averaging word vectors; they
/// still participate in lexical matching.
const MIN_EMBED_TOKEN_LEN: usize = 3;

/// Source of per-word embedding vectors. Absence of a provider (or of a
/// word) simply removes the semantic term from scoring.
pub trait WordVectors: Send + Sync {
    fn vector(&self, word: &str) -> Option<&[f32]>;
}

/// In-memory provider backed by a word → vector map, loadable from the
/// JSON shape `{"word": [0.1, 0.2, ...], ...}`.
#[derive(Debug, Default)]
pub struct MapVectors {
    vectors: HashMap<String, Vec<f32>>,
}

impl MapVectors {
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> Self {
        Self { vectors }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading vectors file {}", path.display()))?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_str(&data)
            .with_context(|| format!("parsing vectors file {}", path.display()))?;
        Ok(Self::new(vectors))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl WordVectors for MapVectors {
    fn vector(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(|v| v.as_slice())
    }
}

/// Average the vectors of all known words of `text` (words of at least
/// three characters). `None` when no word has a vector.
pub fn embed(text: &str, vectors: &dyn WordVectors) -> Option<Vec<f32>> {
    let lower = text.to_lowercase();
    let mut sum: Vec<f32> = Vec::new();
    let mut count = 0usize;
    for word in lower.split(|c: char| !c.is_ascii_alphanumeric()) {
        if word.len() < MIN_EMBED_TOKEN_LEN {
            continue;
        }
        let Some(vec) = vectors.vector(word) else {
            continue;
        };
        if sum.is_empty() {
            sum = vec![0.0; vec.len()];
        }
        if vec.len() != sum.len() {
            continue;
        }
        for (acc, x) in sum.iter_mut().zip(vec) {
            *acc += x;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    for x in sum.iter_mut() {
        *x /= count as f32;
    }
    Some(sum)
}

/// Cosine similarity; zero when either vector has zero magnitude.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a.sqrt() * mag_b.sqrt())
    }
}

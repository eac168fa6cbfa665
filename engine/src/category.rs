use crate::document::Document;
use lazy_static::lazy_static;
use regex::Regex;

/// How many documents a browse carousel shows per category.
pub const CAROUSEL_SIZE: usize = 24;

enum Rule {
    MinRecommendations(u32),
    Free,
    MinMetacritic(u32),
    Text(Regex),
}

/// A named, pure predicate over document fields. Categories are view
/// data: membership is recomputed on demand and never persisted.
pub struct Category {
    pub name: &'static str,
    rule: Rule,
}

impl Category {
    pub fn matches(&self, doc: &Document) -> bool {
        match &self.rule {
            Rule::MinRecommendations(n) => doc.recommendations >= *n,
            Rule::Free => doc.is_free,
            Rule::MinMetacritic(n) => doc.metacritic_score >= *n,
            // Substring match on either field: "Motorcycle" lands in
            // Vehicle via "cycle".
            Rule::Text(re) => re.is_match(&doc.name) || re.is_match(&doc.description),
        }
    }

    /// Members ordered by fame, capped for carousel display.
    pub fn members<'a>(&self, docs: &'a [Document]) -> Vec<&'a Document> {
        let mut members: Vec<&Document> = docs.iter().filter(|d| self.matches(d)).collect();
        members.sort_by(|a, b| {
            b.recommendations
                .cmp(&a.recommendations)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        members.truncate(CAROUSEL_SIZE);
        members
    }
}

lazy_static! {
    pub static ref CATEGORIES: Vec<Category> = vec![
        Category {
            name: "Popular",
            rule: Rule::MinRecommendations(5000),
        },
        Category {
            name: "Free Games",
            rule: Rule::Free,
        },
        Category {
            name: "Top Metacritic",
            rule: Rule::MinMetacritic(80),
        },
        Category {
            name: "Sports",
            rule: Rule::Text(Regex::new("(?i)sports").unwrap()),
        },
        Category {
            name: "Vehicle",
            rule: Rule::Text(Regex::new("(?i)vehicle|car|bike|cycle|racing").unwrap()),
        },
        Category {
            name: "Horror",
            rule: Rule::Text(Regex::new("(?i)horror|zombi|zombie|scary|ghost").unwrap()),
        },
    ];
}

/// Names of every category the document belongs to; possibly empty.
pub fn classify(doc: &Document) -> Vec<&'static str> {
    CATEGORIES
        .iter()
        .filter(|c| c.matches(doc))
        .map(|c| c.name)
        .collect()
}

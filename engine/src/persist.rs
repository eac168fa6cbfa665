use crate::catalog::CatalogIndex;
use crate::document::{DocId, Document};
use crate::index::{InvertedIndex, Lexicon};
use crate::semantic::WordVectors;
use crate::store::DocumentStore;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn inverted(&self) -> PathBuf { self.root.join("inverted.bin") }
    fn lexicon(&self) -> PathBuf { self.root.join("lexicon.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn forward_json(&self) -> PathBuf { self.root.join("forward_index.json") }
    fn inverted_json(&self) -> PathBuf { self.root.join("inverted_index.json") }
    fn lexicon_json(&self) -> PathBuf { self.root.join("lexicon.json") }
}

type InvertedLists = BTreeMap<String, BTreeMap<String, Vec<DocId>>>;

pub fn save_docs(paths: &IndexPaths, docs: &[Document]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.docs())?;
    let bytes = bincode::serialize(docs)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_docs(paths: &IndexPaths) -> Result<Vec<Document>> {
    let mut f = File::open(paths.docs())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let docs = bincode::deserialize(&buf)?;
    Ok(docs)
}

pub fn save_inverted(paths: &IndexPaths, lists: &InvertedLists) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.inverted())?;
    let bytes = bincode::serialize(lists)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_inverted(paths: &IndexPaths) -> Result<InvertedLists> {
    let mut f = File::open(paths.inverted())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let lists = bincode::deserialize(&buf)?;
    Ok(lists)
}

pub fn save_lexicon(paths: &IndexPaths, terms: &[String]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.lexicon())?;
    let bytes = bincode::serialize(terms)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_lexicon(paths: &IndexPaths) -> Result<Vec<String>> {
    let mut f = File::open(paths.lexicon())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let terms = bincode::deserialize(&buf)?;
    Ok(terms)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write every structure the catalog needs to answer queries.
pub fn save_catalog(paths: &IndexPaths, catalog: &CatalogIndex, created_at: String) -> Result<MetaFile> {
    let meta = MetaFile {
        num_docs: catalog.len() as u32,
        created_at,
        version: SNAPSHOT_VERSION,
    };
    save_docs(paths, catalog.documents())?;
    save_inverted(paths, &catalog.inverted_lists())?;
    save_lexicon(paths, &catalog.lexicon_terms())?;
    save_meta(paths, &meta)?;
    Ok(meta)
}

pub fn load_catalog(paths: &IndexPaths, vectors: Option<Arc<dyn WordVectors>>) -> Result<CatalogIndex> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        bail!("unsupported index version {}", meta.version);
    }
    let docs = load_docs(paths)?;
    if docs.len() != meta.num_docs as usize {
        bail!(
            "index is inconsistent: meta says {} documents, found {}",
            meta.num_docs,
            docs.len()
        );
    }
    let lists = load_inverted(paths)?;
    let terms = load_lexicon(paths)?;
    restore(docs, &lists, terms, vectors)
}

/// Rebuild a catalog from persisted structures. Ids must be dense and
/// in order, every posting must point at a stored document, and every
/// document must still be identifiable; derived fields (lowercased
/// text, embeddings, dedup keys, the fame watermark) are recomputed
/// rather than trusted.
pub fn restore(
    mut docs: Vec<Document>,
    lists: &InvertedLists,
    terms: Vec<String>,
    vectors: Option<Arc<dyn WordVectors>>,
) -> Result<CatalogIndex> {
    for (position, doc) in docs.iter().enumerate() {
        if doc.doc_id as usize != position {
            bail!("document id {} out of order at position {position}", doc.doc_id);
        }
        // Plain fields only: the derived caches are not part of the
        // artifact and are rebuilt below.
        if doc.app_id.trim().is_empty() && doc.name.trim().is_empty() {
            bail!("document {} has neither external id nor name", doc.doc_id);
        }
    }
    let num_docs = docs.len() as u32;
    for tokens in lists.values() {
        for (token, ids) in tokens {
            for &id in ids {
                if id >= num_docs {
                    bail!("token {token:?} references unknown document {id}");
                }
            }
        }
    }

    for doc in &mut docs {
        doc.recompute_derived(vectors.as_deref());
    }
    let store = DocumentStore::from_docs(docs);
    let inverted = InvertedIndex::from_sorted_lists(lists);
    let lexicon = Lexicon::from_terms(terms);
    Ok(CatalogIndex::from_parts(store, inverted, lexicon, vectors))
}

/// Human-readable JSON mirrors of the binary state, for download and
/// debug tooling.
pub fn export_json(paths: &IndexPaths, catalog: &CatalogIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.lexicon_json())?;
    f.write_all(serde_json::to_string_pretty(&catalog.lexicon_terms())?.as_bytes())?;
    let mut f = File::create(paths.forward_json())?;
    f.write_all(serde_json::to_string_pretty(catalog.documents())?.as_bytes())?;
    let mut f = File::create(paths.inverted_json())?;
    f.write_all(serde_json::to_string_pretty(&catalog.inverted_lists())?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawRecord, Scalar};

    fn seeded_catalog() -> CatalogIndex {
        let mut catalog = CatalogIndex::new();
        for (app_id, name, desc, recs) in [
            ("10", "Forza Horizon", "open world racing", 9000u32),
            ("20", "Forza Street", "arcade racing", 50),
            ("30", "Quiet Farm", "plant and harvest", 300),
        ] {
            catalog.ingest(&RawRecord {
                app_id: Some(Scalar::Str(app_id.into())),
                name: Some(Scalar::Str(name.into())),
                description: Some(Scalar::Str(desc.into())),
                recommendations: Some(Scalar::Int(recs as i64)),
                ..RawRecord::default()
            });
        }
        catalog
    }

    fn names(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn round_trip_preserves_search_behavior() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let catalog = seeded_catalog();
        let meta = save_catalog(&paths, &catalog, "2026-01-01T00:00:00Z".into()).unwrap();
        assert_eq!(meta.num_docs, 3);

        let loaded = load_catalog(&paths, None).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.term_count(), catalog.term_count());
        assert_eq!(names(&loaded.search("forza")), names(&catalog.search("forza")));
        assert_eq!(
            names(&loaded.suggest("for", 8)),
            names(&catalog.suggest("for", 8))
        );
    }

    #[test]
    fn round_trip_keeps_name_identified_documents() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut catalog = CatalogIndex::new();
        catalog.ingest(&RawRecord {
            name: Some(Scalar::Str("Forza Horizon".into())),
            ..RawRecord::default()
        });
        save_catalog(&paths, &catalog, "2026-01-01T00:00:00Z".into()).unwrap();

        let mut loaded = load_catalog(&paths, None).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(names(&loaded.search("forza")), vec!["Forza Horizon"]);

        // The rebuilt dedup set still owns the name key.
        let dup = loaded.ingest(&RawRecord {
            name: Some(Scalar::Str("  FORZA HORIZON ".into())),
            ..RawRecord::default()
        });
        assert!(!dup.accepted());
    }

    #[test]
    fn restore_rejects_out_of_order_ids() {
        let catalog = seeded_catalog();
        let mut docs = catalog.documents().to_vec();
        docs[1].doc_id = 5;
        let err = restore(docs, &catalog.inverted_lists(), catalog.lexicon_terms(), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn restore_rejects_dangling_postings() {
        let catalog = seeded_catalog();
        let mut lists = catalog.inverted_lists();
        lists
            .entry("g".into())
            .or_default()
            .insert("ghost".into(), vec![99]);
        let err = restore(catalog.documents().to_vec(), &lists, catalog.lexicon_terms(), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown document 99"));
    }

    #[test]
    fn restore_rejects_unidentifiable_documents() {
        let catalog = seeded_catalog();
        let mut docs = catalog.documents().to_vec();
        docs[0].app_id.clear();
        docs[0].name.clear();
        let err = restore(docs, &catalog.inverted_lists(), catalog.lexicon_terms(), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("neither external id nor name"));
    }

    #[test]
    fn version_mismatch_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_catalog(&paths, &seeded_catalog(), "2026-01-01T00:00:00Z".into()).unwrap();
        let mut meta = load_meta(&paths).unwrap();
        meta.version = SNAPSHOT_VERSION + 1;
        save_meta(&paths, &meta).unwrap();
        assert!(load_catalog(&paths, None).is_err());
    }

    #[test]
    fn json_export_mirrors_state() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let catalog = seeded_catalog();
        export_json(&paths, &catalog).unwrap();

        let lexicon: Vec<String> = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("lexicon.json")).unwrap(),
        )
        .unwrap();
        assert!(lexicon.contains(&"forza".to_string()));
        let mut sorted = lexicon.clone();
        sorted.sort();
        assert_eq!(lexicon, sorted);

        let forward: Vec<Document> = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("forward_index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(forward.len(), 3);
        assert_eq!(forward[0].name, "Forza Horizon");

        let inverted: InvertedLists = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("inverted_index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(inverted["f"]["forza"], vec![0, 1]);
    }
}

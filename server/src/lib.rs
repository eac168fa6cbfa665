use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use engine::{
    CatalogIndex, DocId, Document, RawRecord, DEFAULT_PAGE_SIZE, DEFAULT_SUGGESTION_LIMIT,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}
fn default_page() -> usize {
    1
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Deserialize)]
pub struct SuggestParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: f64,
    pub total_hits: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub results: Vec<Document>,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub results: Vec<Document>,
}

#[derive(Serialize)]
pub struct BrowseSection {
    pub name: &'static str,
    pub results: Vec<Document>,
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub added: usize,
    pub duplicates: usize,
    pub unidentified: usize,
    pub total: usize,
    pub num_docs: usize,
}

/// Queries take the read side; ingestion takes the write side, so
/// writers are serialized and never observe a half-updated index.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<CatalogIndex>>,
}

pub fn build_app(catalog: CatalogIndex) -> Router {
    let state = AppState {
        catalog: Arc::new(RwLock::new(catalog)),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/suggest", get(suggest_handler))
        .route("/browse", get(browse_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/ingest", post(ingest_handler))
        .route("/export/lexicon", get(export_lexicon))
        .route("/export/forward", get(export_forward))
        .route("/export/inverted", get(export_inverted))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let catalog = state.catalog.read();
    let page = catalog.search_page(&params.q, params.page, params.page_size);
    let results: Vec<Document> = page.results.iter().map(|d| (*d).clone()).collect();
    let took_ms = start.elapsed().as_secs_f64() * 1000.0;
    Json(SearchResponse {
        query: params.q,
        took_ms,
        total_hits: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        results,
    })
}

pub async fn suggest_handler(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestResponse> {
    let catalog = state.catalog.read();
    let results = catalog
        .suggest(&params.q, params.limit)
        .into_iter()
        .cloned()
        .collect();
    Json(SuggestResponse {
        query: params.q,
        results,
    })
}

pub async fn browse_handler(State(state): State<AppState>) -> Json<Vec<BrowseSection>> {
    let catalog = state.catalog.read();
    let sections = catalog
        .browse()
        .into_iter()
        .map(|(name, docs)| BrowseSection {
            name,
            results: docs.into_iter().cloned().collect(),
        })
        .collect();
    Json(sections)
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Json<serde_json::Value> {
    let catalog = state.catalog.read();
    match catalog.doc(doc_id) {
        Some(doc) => Json(serde_json::json!(doc)),
        None => Json(serde_json::json!({ "error": "not found" })),
    }
}

pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(records): Json<Vec<RawRecord>>,
) -> Json<IngestResponse> {
    let mut catalog = state.catalog.write();
    let summary = catalog.ingest_batch(records);
    Json(IngestResponse {
        added: summary.added,
        duplicates: summary.duplicates,
        unidentified: summary.unidentified,
        total: summary.total(),
        num_docs: catalog.len(),
    })
}

pub async fn export_lexicon(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.read().lexicon_terms())
}

pub async fn export_forward(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.catalog.read().documents().to_vec())
}

pub async fn export_inverted(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, BTreeMap<String, Vec<DocId>>>> {
    Json(state.catalog.read().inverted_lists())
}

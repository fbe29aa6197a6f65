use anyhow::Result;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use scribe_engine::persist::{load_docs, load_engine, DocMeta, IndexPaths};
use scribe_engine::search::sort_ranked;
use scribe_engine::{DocId, SearchEngine, SimilarityModel};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use std::collections::HashMap;
use std::sync::Arc;

/// Everything loaded from one index directory. Swapped as a unit on reload
/// so readers never observe a half-loaded index.
pub struct Loaded {
    pub engine: SearchEngine,
    pub docs: HashMap<DocId, DocMeta>,
}

#[derive(Clone)]
pub struct AppState {
    loaded: Arc<RwLock<Arc<Loaded>>>,
    index_dir: String,
    admin_token: Option<String>,
}

impl AppState {
    /// Cheap snapshot of the current index; queries run lock-free on it.
    fn snapshot(&self) -> Arc<Loaded> {
        self.loaded.read().clone()
    }
}

fn load(index_dir: &str) -> Result<Loaded> {
    let paths = IndexPaths::new(index_dir);
    let engine = load_engine(&paths)?;
    let docs = load_docs(&paths)?;
    Ok(Loaded { engine, docs })
}

pub fn build_app(index_dir: String) -> Result<Router> {
    let loaded = load(&index_dir)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState {
        loaded: Arc::new(RwLock::new(Arc::new(loaded))),
        index_dir,
        admin_token,
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match", get(match_handler))
        .route("/boolean", get(boolean_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/term/:term", get(term_handler))
        .route("/reload", post(reload_handler))
        .with_state(state)
        .layer(cors);
    Ok(app)
}

type Rejection = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Similarity model; defaults to the one recorded at index time.
    pub model: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Score over tf-idf weights instead of raw counts.
    #[serde(default)]
    pub weighted: bool,
}

#[derive(Deserialize)]
pub struct BooleanParams {
    pub q: String,
}

fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: u32,
    pub score: f32,
    pub title: String,
}

#[derive(Serialize)]
pub struct BooleanResponse {
    pub query: String,
    pub doc_ids: Vec<u32>,
}

fn to_hits(
    ranked: Vec<(DocId, f32)>,
    k: usize,
    docs: &HashMap<DocId, DocMeta>,
) -> Vec<SearchHit> {
    ranked
        .into_iter()
        .take(k.clamp(1, 100))
        .map(|(doc_id, score)| SearchHit {
            doc_id,
            score,
            title: docs.get(&doc_id).map(|d| d.title.clone()).unwrap_or_default(),
        })
        .collect()
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, Rejection> {
    let loaded = state.snapshot();
    let model = match &params.model {
        Some(name) => name
            .parse::<SimilarityModel>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => loaded.engine.default_model(),
    };
    let scores = loaded.engine.score_by_vector(&params.q, model);
    let ranked = sort_ranked(&scores);
    Ok(Json(SearchResponse {
        query: params.q,
        total_hits: ranked.len(),
        results: to_hits(ranked, params.k, &loaded.docs),
    }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchParams>,
) -> Json<SearchResponse> {
    let loaded = state.snapshot();
    let ranked: Vec<(DocId, f32)> = if params.weighted {
        sort_ranked(&loaded.engine.score_by_weighted_matching(&params.q))
    } else {
        sort_ranked(&loaded.engine.score_by_matching(&params.q))
            .into_iter()
            .map(|(doc_id, score)| (doc_id, score as f32))
            .collect()
    };
    Json(SearchResponse {
        query: params.q,
        total_hits: ranked.len(),
        results: to_hits(ranked, params.k, &loaded.docs),
    })
}

pub async fn boolean_handler(
    State(state): State<AppState>,
    Query(params): Query<BooleanParams>,
) -> Result<Json<BooleanResponse>, Rejection> {
    let loaded = state.snapshot();
    let matched = loaded
        .engine
        .evaluate_boolean(&params.q)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(BooleanResponse {
        query: params.q,
        doc_ids: matched.into_iter().collect(),
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    UrlPath(doc_id): UrlPath<u32>,
) -> Result<Json<serde_json::Value>, Rejection> {
    let loaded = state.snapshot();
    let meta = loaded
        .docs
        .get(&doc_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no document {doc_id}")))?;
    Ok(Json(serde_json::json!({
        "doc_id": doc_id,
        "title": meta.title,
        "summary": meta.summary,
        "terms": loaded.engine.terms_of(doc_id),
    })))
}

pub async fn term_handler(
    State(state): State<AppState>,
    UrlPath(term): UrlPath<String>,
) -> Json<serde_json::Value> {
    let loaded = state.snapshot();
    let counts = loaded.engine.documents_of(&term);
    let weights = loaded
        .engine
        .weights()
        .map(|w| w.documents_of(&term));
    Json(serde_json::json!({
        "term": term,
        "documents": counts,
        "weights": weights,
    }))
}

pub async fn reload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Rejection> {
    authorize(&state, &headers)?;
    let loaded = load(&state.index_dir)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let num_docs = loaded.engine.index().doc_count();
    // Readers holding the previous snapshot finish on it; new requests see
    // the fresh index only once it is fully loaded.
    *state.loaded.write() = Arc::new(loaded);
    tracing::info!(num_docs, "index reloaded");
    Ok(Json(serde_json::json!({ "reloaded": true, "num_docs": num_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Rejection> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers
        .get("X-ADMIN-TOKEN")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

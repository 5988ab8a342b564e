use anyhow::{Context, Result};
use axum::{body::Bytes, extract::{Query, State}, http::{HeaderMap, HeaderValue, StatusCode}, routing::{get, post}, Json, Router};
use recommend_core::{
    load_corpus, parse_top_n, recommend_articles, ArticleIndex, FailureKind, IndexConfig, IndexHandle, IndexStats,
    Outcome, QueryInput, MAX_TOP_N,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Query string of `GET /recommend`. Every field is optional so malformed input is
/// reported through the response body instead of an extractor rejection.
#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: Option<String>,
    pub top_n: Option<String>,
}

/// Header carrying the admin token for mutating endpoints.
pub const ADMIN_HEADER: &str = "x-admin-token";

/// Message for a `POST /recommend` body that is not a JSON object.
pub const MSG_BAD_BODY: &str = "Invalid input: request body must be a JSON object";

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: Value,
    pub took_s: f64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Clone)]
pub struct AppState {
    pub corpus_path: PathBuf,
    pub config: IndexConfig,
    pub index: IndexHandle,
    pub admin_token: Option<String>,
}

/// Load and index the corpus, then build the router. Fails if the corpus cannot be indexed.
pub fn build_app(corpus_path: impl Into<PathBuf>, config: IndexConfig) -> Result<Router> {
    let corpus_path = corpus_path.into();
    let corpus = load_corpus(&corpus_path).with_context(|| format!("loading corpus from {}", corpus_path.display()))?;
    let index = IndexHandle::new(ArticleIndex::build(corpus, &config));
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(AppState { corpus_path, config, index, admin_token }))
}

pub fn router(app_state: AppState) -> Router {
    let cors = cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref());
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_get).post(recommend_post))
        .route("/articles", get(articles_handler))
        .route("/stats", get(stats_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Origins listed in a comma separated `CORS_ALLOW_ORIGIN` value; unparsable entries are skipped.
pub fn allowed_origins(value: &str) -> Vec<HeaderValue> {
    value.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let origins = allow_origin.map(allowed_origins).unwrap_or_default();
    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn recommend_get(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Json<RecommendResponse> {
    let top_n = params.top_n.map(Value::String);
    let query = params.title.map(Value::String).unwrap_or(Value::Null);
    let input = match &query {
        Value::Null => QueryInput::Title(String::new()),
        v => QueryInput::from(v),
    };
    Json(respond(&state, query, &input, top_n.as_ref()))
}

/// `POST /recommend` reads the raw body so that any payload, valid JSON or not,
/// produces a tagged outcome.
pub async fn recommend_post(State(state): State<AppState>, body: Bytes) -> Json<RecommendResponse> {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(v @ Value::Object(_)) => v,
        _ => {
            let outcome = Outcome::failure(FailureKind::InvalidInput, MSG_BAD_BODY);
            return Json(RecommendResponse { query: Value::Null, took_s: 0.0, outcome });
        }
    };
    let query = body.get("title").cloned().unwrap_or(Value::Null);
    let input = match &query {
        Value::Null => QueryInput::Title(String::new()),
        v => QueryInput::from(v),
    };
    Json(respond(&state, query, &input, body.get("top_n")))
}

fn respond(state: &AppState, query: Value, input: &QueryInput, top_n: Option<&Value>) -> RecommendResponse {
    let start = std::time::Instant::now();
    let outcome = match (input, parse_top_n(top_n)) {
        // a non-string title is reported ahead of a bad count
        (QueryInput::Title(_), Err(e)) => e.into(),
        (_, top_n) => {
            let index = state.index.current();
            recommend_articles(&index, input, top_n.unwrap_or(1).min(MAX_TOP_N))
        }
    };
    RecommendResponse { query, took_s: start.elapsed().as_secs_f64(), outcome }
}

pub async fn articles_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    let index = state.index.current();
    let titles = index.titles().map(str::to_string).collect();
    Json(titles)
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    let index = state.index.current();
    Json(index.stats())
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, (StatusCode, String)> {
    check_admin(state.admin_token.as_deref(), &headers)?;
    let handle = state.index.clone();
    let path = state.corpus_path.clone();
    let config = state.config.clone();
    // file reads and the all-pairs build stay off the async workers
    let reloaded = tokio::task::spawn_blocking(move || handle.try_reload(|| load_corpus(&path), &config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("reload task failed: {e}")))?;
    reloaded.map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let index = state.index.current();
    Ok(Json(index.stats()))
}

fn check_admin(expected: Option<&str>, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let Some(expected) = expected else {
        return Err((StatusCode::UNAUTHORIZED, "reload disabled: ADMIN_TOKEN is not configured".into()));
    };
    match headers.get(ADMIN_HEADER).map(HeaderValue::to_str) {
        Some(Ok(given)) if given == expected => Ok(()),
        Some(_) => Err((StatusCode::UNAUTHORIZED, format!("{ADMIN_HEADER} does not match"))),
        None => Err((StatusCode::UNAUTHORIZED, format!("missing {ADMIN_HEADER} header"))),
    }
}

//! Rate-limited HTTP API over the analyzers.
//!
//! Every route checks the rate limiter before it looks at the request body, keyed by
//! `<route>:<client-ip>`. Rejections become `429 Too Many Requests` with `Retry-After`.
//! The client IP is the socket peer unless the state trusts a reverse proxy, in which
//! case forwarding headers are honoured.

use crate::extractor::SignalExtractor;
use crate::fetcher::{FetchError, PageFetcher};
use crate::html_scan::visible_text;
use crate::keywords;
use crate::rate_limiter::{RateLimitOptions, RateLimiter};
use crate::readability;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, ResponseError, web};
use anyhow::Context;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

/// Largest request body accepted, raw HTML included
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
/// Upper bound on the `max` a keyword request may ask for
const MAX_KEYWORDS_PER_REQUEST: usize = 200;

pub struct AppState {
    pub limiter: RateLimiter,
    pub fetcher: PageFetcher,
    pub extractor: SignalExtractor,
    pub rate_limit: RateLimitOptions,
    /// Read the client IP from `Forwarded`/`X-Forwarded-For`
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(
        fetcher: PageFetcher,
        extractor: SignalExtractor,
        rate_limit: RateLimitOptions,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(),
            fetcher,
            extractor,
            rate_limit,
            trust_proxy: false,
        }
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too many requests, retry in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(e) => match e {
                FetchError::InvalidUrl { .. } | FetchError::UnsupportedScheme(_) => {
                    StatusCode::BAD_REQUEST
                }
                FetchError::CrossOrigin { .. } => StatusCode::FORBIDDEN,
                FetchError::Request { .. }
                | FetchError::Status { .. }
                | FetchError::TooManyRedirects { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let ApiError::RateLimited { retry_after_secs } = self {
            response.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }
        response.json(json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub text: String,
    pub max: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReadabilityRequest {
    pub text: Option<String>,
    pub html: Option<String>,
}

fn client_ip(req: &HttpRequest, trust_proxy: bool) -> String {
    if trust_proxy && let Some(ip) = req.connection_info().realip_remote_addr() {
        return ip.to_string();
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn enforce_rate_limit(state: &AppState, route: &str, req: &HttpRequest) -> Result<(), ApiError> {
    let key = format!("{}:{}", route, client_ip(req, state.trust_proxy));
    let decision = state.limiter.check(&key, state.rate_limit);
    if decision.allowed {
        return Ok(());
    }

    let retry_after_secs = decision.retry_after(chrono::Utc::now()).as_secs();
    tracing::warn!(key = %key, retry_after_secs, "Rate limit exceeded");
    Err(ApiError::RateLimited { retry_after_secs })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn health(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    enforce_rate_limit(&state, "health", &req)?;
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

async fn analyze_page(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    enforce_rate_limit(&state, "seo-analyze", &req)?;
    let request: AnalyzeRequest = parse_body(&body)?;

    let analysis = match (non_blank(request.url), non_blank(request.html)) {
        (url, Some(html)) => {
            let url = url.unwrap_or_else(|| state.fetcher.origin().to_string());
            state.extractor.extract(&url, &html)
        }
        (Some(url), None) => {
            let page = state.fetcher.fetch(&url).await?;
            state.extractor.extract(page.url.as_str(), &page.html)
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Provide either `url` or `html`".to_string(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(analysis))
}

async fn rank_keywords(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    enforce_rate_limit(&state, "seo-keywords", &req)?;
    let request: KeywordsRequest = parse_body(&body)?;

    let max = request
        .max
        .unwrap_or(state.extractor.max_keywords())
        .min(MAX_KEYWORDS_PER_REQUEST);
    Ok(HttpResponse::Ok().json(keywords::rank(&request.text, max)))
}

async fn score_readability(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    enforce_rate_limit(&state, "content-readability", &req)?;
    let request: ReadabilityRequest = parse_body(&body)?;

    let text = match (non_blank(request.text), non_blank(request.html)) {
        (Some(text), _) => text,
        (None, Some(html)) => visible_text(&html),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Provide either `text` or `html`".to_string(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(readability::analyze(&text)))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .route("/seo/analyze", web::post().to(analyze_page))
            .route("/seo/keywords", web::post().to(rank_keywords))
            .route("/content/readability", web::post().to(score_readability)),
    );
}

pub async fn serve(state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let state = web::Data::new(state);

    tracing::info!(
        bind = %bind,
        port,
        limit = state.rate_limit.limit,
        window_ms = state.rate_limit.window_ms,
        trust_proxy = state.trust_proxy,
        "Starting HTTP API"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .configure(routes)
    })
    .bind((bind, port))
    .with_context(|| format!("Failed to bind {}:{}", bind, port))?
    .run()
    .await?;

    Ok(())
}

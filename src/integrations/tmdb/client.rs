// src/integrations/tmdb/client.rs
//
// TMDB movie search client.
//
// ARCHITECTURE:
// - REST client for `GET /search/movie`
// - Handles authentication and rate limiting
// - Maps the external response to a `ResolutionResult` (NO persistence)
//
// CRITICAL RULES:
// - "No results" is `ResolutionResult::NoMatch`, never an error
// - Anything that prevents getting an answer is `ResolverUnavailable`
// - Never panics on malformed responses

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::models::{SearchHit, SearchResponse, StatusMessage};
use crate::domain::{ResolutionResult, TmdbId};
use crate::error::{AppError, AppResult};
use crate::integrations::error::ResolverUnavailable;
use crate::integrations::traits::MetadataResolver;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Spaces requests at least `min_interval` apart.
/// Callers queue on the lock, so concurrent lookups are serialized at the gate.
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    async fn wait_if_needed(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// How the API key is presented
#[derive(Debug, Clone, PartialEq, Eq)]
enum Credentials {
    /// v3 key, sent as `api_key` query parameter
    ApiKey(String),
    /// v4 read access token, sent as bearer
    Bearer(String),
}

impl Credentials {
    fn from_key(key: &str) -> Self {
        let key = key.trim();
        // v4 tokens are JWTs
        if key.matches('.').count() == 2 {
            Credentials::Bearer(key.to_string())
        } else {
            Credentials::ApiKey(key.to_string())
        }
    }
}

pub struct TmdbClient {
    base_url: String,
    language: Option<String>,
    http_client: Client,
    rate_limiter: RateLimiter,
    credentials: Credentials,
}

impl TmdbClient {
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        language: Option<String>,
        min_interval: Duration,
        timeout: Duration,
    ) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("tmdb.api_key is not set".to_string()));
        }

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.filter(|l| !l.trim().is_empty()),
            http_client,
            rate_limiter: RateLimiter::new(min_interval),
            credentials: Credentials::from_key(api_key),
        })
    }

    /// Search movies by title; first results page only
    pub async fn search_movie(&self, query: &str) -> Result<Vec<SearchHit>, ResolverUnavailable> {
        self.rate_limiter.wait_if_needed().await;

        let url = format!("{}/search/movie", self.base_url);
        let mut params: Vec<(&str, &str)> = vec![("query", query), ("include_adult", "false")];
        if let Some(language) = &self.language {
            params.push(("language", language.as_str()));
        }

        let mut request = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/json");

        request = match &self.credentials {
            Credentials::ApiKey(key) => {
                params.push(("api_key", key.as_str()));
                request
            }
            Credentials::Bearer(token) => {
                request.header(header::AUTHORIZATION, format!("Bearer {}", token))
            }
        };

        let response = request
            .query(&params)
            .send()
            .await
            .map_err(|e| ResolverUnavailable::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolverUnavailable::Network(e.to_string()))?;

        if let Some(unavailable) = classify_status(status) {
            if let Ok(message) = serde_json::from_str::<StatusMessage>(&body) {
                log::debug!(
                    "TMDB error {:?}: {}",
                    message.status_code,
                    message.status_message.unwrap_or_default()
                );
            }
            return Err(unavailable);
        }

        parse_search_response(&body)
    }
}

#[async_trait]
impl MetadataResolver for TmdbClient {
    async fn resolve(&self, title: &str) -> Result<ResolutionResult, ResolverUnavailable> {
        let query = title.trim();
        if query.is_empty() {
            return Ok(ResolutionResult::NoMatch);
        }

        let hits = self.search_movie(query).await?;
        let result = best_match(query, &hits);
        log::debug!("TMDB lookup '{}': {} hits, {:?}", query, hits.len(), result);
        Ok(result)
    }
}

/// Map a non-success HTTP status to the reason the resolver is unavailable.
fn classify_status(status: StatusCode) -> Option<ResolverUnavailable> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ResolverUnavailable::Auth(status.as_u16())
        }
        StatusCode::TOO_MANY_REQUESTS => ResolverUnavailable::RateLimited,
        other => ResolverUnavailable::Upstream(other.as_u16()),
    })
}

fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, ResolverUnavailable> {
    serde_json::from_str::<SearchResponse>(body)
        .map(|response| response.results)
        .map_err(|e| ResolverUnavailable::InvalidResponse(e.to_string()))
}

/// Pick the identifier for `query` among search hits.
///
/// A hit whose title or original title equals the query (ignoring case and
/// surrounding whitespace) wins; otherwise TMDB's own ranking is trusted and
/// the first hit is taken. Hits with an invalid id are ignored.
pub fn best_match(query: &str, hits: &[SearchHit]) -> ResolutionResult {
    let wanted = query.trim().to_lowercase();

    let valid: Vec<(&SearchHit, TmdbId)> = hits
        .iter()
        .filter_map(|hit| TmdbId::new(hit.id).ok().map(|id| (hit, id)))
        .collect();

    let exact = valid.iter().find(|(hit, _)| {
        hit.title.trim().to_lowercase() == wanted
            || hit
                .original_title
                .as_deref()
                .map(|t| t.trim().to_lowercase() == wanted)
                .unwrap_or(false)
    });

    match exact.or_else(|| valid.first()) {
        Some((_, id)) => ResolutionResult::Resolved(*id),
        None => ResolutionResult::NoMatch,
    }
}

//! Typed async wrappers around the ShopSight backend endpoints.
//!
//! Each operation performs exactly one HTTP request, decodes the JSON body
//! and passes it through [`crate::normalize`]. No retries happen here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config;
use crate::error::{FetchError, Result};
use crate::models::{
    AgentAnalysis, AgentSuggestions, CustomerSegment, Forecast, InsightText, Product, SalesSeries,
};
use crate::normalize;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Body of the backend root route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub message: String,
}

// ---------------------------------------------------------------------------
// ShopsightClient
// ---------------------------------------------------------------------------

/// Async HTTP client for the ShopSight analytics API.
///
/// Cheap to clone: clones share the connection pool and request counter.
#[derive(Debug, Clone)]
pub struct ShopsightClient {
    http: Client,
    base_url: Url,
    issued: Arc<AtomicU64>,
}

impl ShopsightClient {
    /// Create a client with its own connection pool.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_http(http: Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Number of HTTP requests issued by this client and its clones.
    pub fn requests_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Build an endpoint URL. Each segment is percent-encoded on its own, so
    /// product identifiers containing `/` or `?` stay a single segment.
    fn url(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder) -> FetchResult<Value> {
        self.issued.fetch_add(1, Ordering::Relaxed);
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get(&self, segments: &[&str]) -> FetchResult<Value> {
        let url = self.url(segments)?;
        debug!(%url, "GET");
        self.send(self.http.get(url)).await
    }

    async fn post(&self, segments: &[&str], body: &Value) -> FetchResult<Value> {
        let url = self.url(segments)?;
        debug!(%url, "POST");
        self.send(self.http.post(url).json(body)).await
    }

    // -- Operations --------------------------------------------------------

    /// Check that the backend is reachable.
    pub async fn health(&self) -> FetchResult<Health> {
        let url = self.base_url.clone();
        debug!(%url, "GET");
        let raw = self.send(self.http.get(url)).await?;
        Ok(Health {
            message: normalize::text(raw.get("message")),
        })
    }

    /// Search the catalogue, reporting failures to the caller.
    pub async fn try_search(&self, query: &str) -> FetchResult<Vec<Product>> {
        let raw = self
            .post(&config::SEARCH_ROUTE, &json!({ "query": query }))
            .await?;
        Ok(normalize::normalize_products(&raw))
    }

    /// Search the catalogue.
    ///
    /// Never fails: a transport, HTTP or decode error yields
    /// [`config::fallback_products`] instead.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        match self.try_search(query).await {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, query, "search failed; showing fallback products");
                config::fallback_products()
            }
        }
    }

    pub async fn sales(&self, product_id: &str) -> FetchResult<SalesSeries> {
        let raw = self
            .get(&config::product_route(product_id, config::SALES))
            .await?;
        Ok(normalize::normalize_sales(&raw, product_id))
    }

    pub async fn forecast(&self, product_id: &str) -> FetchResult<Forecast> {
        let raw = self
            .get(&config::product_route(product_id, config::FORECAST))
            .await?;
        Ok(normalize::normalize_forecast(&raw, product_id))
    }

    pub async fn segments(&self, product_id: &str) -> FetchResult<Vec<CustomerSegment>> {
        let raw = self
            .get(&config::product_route(product_id, config::SEGMENTS))
            .await?;
        Ok(normalize::normalize_segments(&raw))
    }

    pub async fn insights(&self, product_id: &str) -> FetchResult<InsightText> {
        let raw = self
            .get(&config::product_route(product_id, config::INSIGHTS))
            .await?;
        Ok(normalize::normalize_insights(&raw))
    }

    /// Ask the analytics agent a free-text question about a product.
    pub async fn analyze(&self, query: &str, product_id: &str) -> FetchResult<AgentAnalysis> {
        let body = json!({ "query": query, "product_id": product_id });
        let raw = self.post(&config::ANALYZE_ROUTE, &body).await?;
        Ok(normalize::normalize_analysis(&raw))
    }

    pub async fn suggestions(&self, product_id: &str) -> FetchResult<AgentSuggestions> {
        let raw = self.get(&config::suggestions_route(product_id)).await?;
        Ok(normalize::normalize_suggestions(&raw))
    }
}

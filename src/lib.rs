//! ShopSight SDK for Rust.
//!
//! Client-side orchestration for the ShopSight analytics API: product
//! search, concurrent per-product analytics with stale-response suppression,
//! and the conversational agent sub-flow. Every backend payload is
//! normalized into strict, always-valid records before it reaches callers.
//!
//! # Quick start
//!
//! ```no_run
//! use shopsight_sdk::ShopsightSdk;
//!
//! # async fn example() -> shopsight_sdk::Result<()> {
//! let sdk = ShopsightSdk::builder().from_env()?.build()?;
//!
//! // Search never fails; backend errors yield the fallback products
//! let products = sdk.search("nike running shoes").await;
//!
//! // Fan out to sales, forecast, segments and insights
//! let view = sdk.select(&products[0].product_id).await?;
//!
//! // Ask the agent
//! let suggestions = sdk.agent().suggestions().await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod aggregator;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;

pub use agent::AgentSession;
pub use aggregator::SelectionAggregator;
pub use client::ShopsightClient;
pub use error::{FetchError, Result, ShopsightError};

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use tokio::sync::watch;

use models::{Product, ProductAnalyticsView};

// ---------------------------------------------------------------------------
// ShopsightSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`ShopsightSdk`] instance.
///
/// Use [`ShopsightSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](ShopsightSdkBuilder::build) to create the SDK.
pub struct ShopsightSdkBuilder {
    api_url: String,
    timeout: Duration,
}

impl Default for ShopsightSdkBuilder {
    fn default() -> Self {
        Self {
            api_url: config::DEFAULT_API_URL.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl ShopsightSdkBuilder {
    /// Set the backend base URL.
    ///
    /// Defaults to `http://localhost:8000`.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the per-request timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply `SHOPSIGHT_API_URL` and `SHOPSIGHT_TIMEOUT_SECS` if they are set.
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(config::API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var(config::TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ShopsightError::Config(format!(
                    "{} must be a whole number of seconds, got {raw:?}",
                    config::TIMEOUT_ENV
                ))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }

    /// Build the SDK. Validates the URL and creates the HTTP client; no
    /// request is sent.
    pub fn build(self) -> Result<ShopsightSdk> {
        let base_url = Url::parse(&self.api_url).map_err(|e| {
            ShopsightError::Config(format!("invalid API URL {:?}: {e}", self.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ShopsightError::Config(format!(
                "API URL {:?} cannot carry a path",
                self.api_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ShopsightError::Config("timeout must be non-zero".into()));
        }
        let client = ShopsightClient::new(base_url, self.timeout)?;
        Ok(ShopsightSdk::with_client(client))
    }
}

// ---------------------------------------------------------------------------
// ShopsightSdk
// ---------------------------------------------------------------------------

/// The main entry point for the ShopSight SDK.
///
/// Wraps one [`ShopsightClient`] shared by a [`SelectionAggregator`] and an
/// [`AgentSession`], and keeps the two pointed at the same product.
#[derive(Clone)]
pub struct ShopsightSdk {
    client: ShopsightClient,
    aggregator: SelectionAggregator,
    agent: AgentSession,
}

impl ShopsightSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> ShopsightSdkBuilder {
        ShopsightSdkBuilder::default()
    }

    /// Assemble the SDK around an existing client.
    pub fn with_client(client: ShopsightClient) -> Self {
        Self {
            aggregator: SelectionAggregator::new(client.clone()),
            agent: AgentSession::new(client.clone()),
            client,
        }
    }

    /// Search the catalogue. Backend failures yield the fallback products.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        self.client.search(query).await
    }

    /// Select a product: points the agent session at it and resolves the
    /// analytics view. See [`SelectionAggregator::select`].
    pub async fn select(&self, product_id: &str) -> Result<ProductAnalyticsView> {
        if !product_id.is_empty() {
            self.agent.set_product(product_id)?;
        }
        self.aggregator.select(product_id).await
    }

    /// The most recently committed analytics view.
    pub fn view(&self) -> Option<ProductAnalyticsView> {
        self.aggregator.view()
    }

    /// Receive every committed analytics view.
    pub fn subscribe(&self) -> watch::Receiver<Option<ProductAnalyticsView>> {
        self.aggregator.subscribe()
    }

    /// The underlying endpoint client.
    pub fn client(&self) -> &ShopsightClient {
        &self.client
    }

    /// The selection aggregator behind [`select`](Self::select).
    pub fn aggregator(&self) -> &SelectionAggregator {
        &self.aggregator
    }

    /// The agent session for the selected product.
    pub fn agent(&self) -> &AgentSession {
        &self.agent
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ShopsightSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selected = self
            .view()
            .map(|v| v.product_id)
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "ShopsightSdk(api_url={}, selected={}, requests={})",
            self.client.base_url(),
            selected,
            self.client.requests_issued()
        )
    }
}

//! Shared fixtures for the ShopSight SDK integration tests.
//!
//! Provides a mock backend (via `httpmock`) that serves per-product
//! analytics payloads whose values are derived from the product id, so a
//! test can tell which selection a view came from.

#![allow(dead_code)]

use std::time::Duration;

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use shopsight_sdk::ShopsightSdk;

/// Build an SDK pointed at the mock server.
pub fn sdk_for(server: &MockServer) -> ShopsightSdk {
    ShopsightSdk::builder()
        .api_url(server.base_url())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Revenue figure unique to a product, so views can be told apart.
pub fn revenue_for(product_id: &str) -> f64 {
    product_id.bytes().map(f64::from).sum::<f64>() * 100.0
}

pub fn insights_for(product_id: &str) -> String {
    format!("**Sales Performance Analysis for {product_id}**")
}

pub fn sales_body(product_id: &str) -> Value {
    let base = revenue_for(product_id);
    json!({
        "product_id": product_id,
        "dates": ["2024-01-01", "2024-01-15", "2024-02-01"],
        "sales": [base, base + 1.0, base + 2.0],
        "units_sold": [80, 100, 120],
    })
}

pub fn forecast_body(product_id: &str) -> Value {
    json!({
        "product_id": product_id,
        "next_month_forecast": revenue_for(product_id) + 3.0,
        "confidence": 0.75,
        "trend": "increasing",
    })
}

pub fn segments_body(product_id: &str) -> Value {
    json!({
        "product_id": product_id,
        "segments": [
            {
                "name": format!("{product_id} enthusiasts"),
                "percentage": 45,
                "avg_age": 28,
                "interests": ["running", "fitness", "health"],
                "purchase_frequency": "monthly"
            },
            {
                "name": "Casual Athletes",
                "percentage": 35,
                "avg_age": 32,
                "interests": "walking",
                "purchase_frequency": "quarterly"
            }
        ]
    })
}

/// Mount the four analytics routes for `product_id`, each answering after
/// `delay`. Returns the mocks in sales, forecast, segments, insights order.
pub async fn mock_analytics<'a>(
    server: &'a MockServer,
    product_id: &str,
    delay: Duration,
) -> Vec<Mock<'a>> {
    let routes = [
        ("sales", sales_body(product_id)),
        ("forecast", forecast_body(product_id)),
        ("segments", segments_body(product_id)),
        ("insights", json!({ "insights": insights_for(product_id) })),
    ];
    let mut mocks = Vec::new();
    for (leaf, body) in routes {
        let path = format!("/products/{product_id}/{leaf}");
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(body)
                    .delay(delay);
            })
            .await;
        mocks.push(mock);
    }
    mocks
}

pub async fn total_hits(mocks: &[Mock<'_>]) -> usize {
    let mut total = 0;
    for mock in mocks {
        total += mock.hits_async().await;
    }
    total
}

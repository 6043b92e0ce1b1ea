//! Endpoint client tests: request shapes, error taxonomy, search fallback.

mod common;

use httpmock::prelude::*;
use serde_json::json;
use shopsight_sdk::config;
use shopsight_sdk::models::{Priority, Trend};
use shopsight_sdk::{FetchError, ShopsightSdk};

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_posts_query_and_normalizes_results() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/search")
                .json_body(json!({ "query": "nike" }));
            then.status(200).json_body(json!([
                {
                    "product_id": "nike_air_max_270",
                    "name": "Nike Air Max 270",
                    "category": "Running Shoes",
                    "price": 150.0,
                    "brand": "Nike",
                    "description": "Comfortable running shoes with Air Max technology"
                },
                {
                    "product_id": "nike_react_infinity",
                    "name": "Nike React Infinity Run",
                    "price": "160"
                }
            ]));
        })
        .await;
    let sdk = common::sdk_for(&server);

    let products = sdk.search("nike").await;

    mock.assert_async().await;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].brand, "Nike");
    assert_eq!(products[0].price, 150.0);
    assert_eq!(products[1].product_id, "nike_react_infinity");
    assert_eq!(products[1].price, 0.0);
    assert_eq!(products[1].category, "");
}

#[tokio::test]
async fn search_http_500_shows_exactly_the_fallback_products() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/search");
            then.status(500).json_body(json!({ "detail": "Search failed" }));
        })
        .await;
    let sdk = common::sdk_for(&server);

    let products = sdk.search("anything").await;

    let ids: Vec<&str> = products.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(ids, vec!["nike_air_max_270", "adidas_ultraboost_22"]);
    assert_eq!(products, config::fallback_products());
}

#[tokio::test]
async fn search_transport_failure_shows_fallback_products() {
    let sdk = ShopsightSdk::builder()
        .api_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let products = sdk.search("adidas").await;
    assert_eq!(products.len(), 2);

    let err = sdk.client().try_search("adidas").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn search_non_json_body_shows_fallback_products() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/search");
            then.status(200).body("<html>oops</html>");
        })
        .await;
    let sdk = common::sdk_for(&server);

    assert_eq!(sdk.search("x").await, config::fallback_products());
    let err = sdk.client().try_search("x").await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn search_with_empty_result_is_not_a_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/search");
            then.status(200).json_body(json!([]));
        })
        .await;
    let sdk = common::sdk_for(&server);

    assert!(sdk.search("socks").await.is_empty());
}

// ---------------------------------------------------------------------------
// analytics endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analytics_endpoints_return_typed_records() {
    let server = MockServer::start_async().await;
    common::mock_analytics(&server, "prod_a", std::time::Duration::ZERO).await;
    let sdk = common::sdk_for(&server);
    let client = sdk.client();

    let sales = client.sales("prod_a").await.unwrap();
    assert_eq!(sales.product_id, "prod_a");
    assert_eq!(sales.points.len(), 3);
    assert_eq!(sales.revenue()[0], common::revenue_for("prod_a"));

    let forecast = client.forecast("prod_a").await.unwrap();
    assert_eq!(forecast.trend, Trend::Increasing);
    assert_eq!(forecast.confidence, 0.75);

    let segments = client.segments("prod_a").await.unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].interests, vec!["walking"]);

    let insights = client.insights("prod_a").await.unwrap();
    assert_eq!(insights.as_str(), common::insights_for("prod_a"));

    assert_eq!(client.requests_issued(), 4);
}

#[tokio::test]
async fn non_2xx_is_an_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products/unknown/forecast");
            then.status(404).json_body(json!({ "detail": "Product not found" }));
        })
        .await;
    let sdk = common::sdk_for(&server);

    let err = sdk.client().forecast("unknown").await.unwrap_err();
    assert_eq!(err, FetchError::Http { status: 404 });
}

#[tokio::test]
async fn health_reads_root_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .json_body(json!({ "message": "ShopSight Analytics API is running" }));
        })
        .await;
    let sdk = common::sdk_for(&server);

    let health = sdk.client().health().await.unwrap();
    assert_eq!(health.message, "ShopSight Analytics API is running");
}

// ---------------------------------------------------------------------------
// agent endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_posts_query_and_product() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/agent/analyze")
                .json_body(json!({ "query": "why is it growing?", "product_id": "prod_a" }));
            then.status(200).json_body(json!({
                "analysis": "AI Agent analysis requires OpenAI API key",
                "recommendations": "Set up OpenAI API key for full functionality",
                "confidence": 0.5
            }));
        })
        .await;
    let sdk = common::sdk_for(&server);

    let analysis = sdk
        .client()
        .analyze("why is it growing?", "prod_a")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        analysis.recommendations,
        vec!["Set up OpenAI API key for full functionality"]
    );
    assert_eq!(analysis.confidence, 0.5);
    assert_eq!(analysis.next_steps, None);
}

#[tokio::test]
async fn suggestions_degrade_unknown_priority() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/agent/suggestions/prod_a");
            then.status(200).json_body(json!({
                "suggestions": ["Consider seasonal promotions during peak months"],
                "priority": "critical"
            }));
        })
        .await;
    let sdk = common::sdk_for(&server);

    let suggestions = sdk.client().suggestions("prod_a").await.unwrap();
    assert_eq!(suggestions.suggestions.len(), 1);
    assert_eq!(suggestions.priority, Priority::Medium);
}

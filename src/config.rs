use std::time::Duration;

use crate::models::Product;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "SHOPSIGHT_API_URL";
pub const TIMEOUT_ENV: &str = "SHOPSIGHT_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const SEARCH_ROUTE: [&str; 1] = ["search"];
pub const ANALYZE_ROUTE: [&str; 2] = ["agent", "analyze"];

pub const SALES: &str = "sales";
pub const FORECAST: &str = "forecast";
pub const SEGMENTS: &str = "segments";
pub const INSIGHTS: &str = "insights";

/// Path segments for the per-product analytics routes
/// (`/products/{id}/<leaf>`).
pub fn product_route<'a>(product_id: &'a str, leaf: &'static str) -> [&'a str; 3] {
    ["products", product_id, leaf]
}

/// Path segments for `/agent/suggestions/{id}`.
pub fn suggestions_route(product_id: &str) -> [&str; 3] {
    ["agent", "suggestions", product_id]
}

/// Products shown when `/search` fails.
///
/// This is part of the client's contract: a failing search never surfaces
/// an error to the caller, it shows these two catalogue entries instead.
pub fn fallback_products() -> Vec<Product> {
    vec![
        Product {
            product_id: "nike_air_max_270".to_string(),
            name: "Nike Air Max 270".to_string(),
            category: "Running Shoes".to_string(),
            price: 150.0,
            brand: "Nike".to_string(),
            description: "Comfortable running shoes with Air Max technology".to_string(),
        },
        Product {
            product_id: "adidas_ultraboost_22".to_string(),
            name: "Adidas Ultraboost 22".to_string(),
            category: "Running Shoes".to_string(),
            price: 180.0,
            brand: "Adidas".to_string(),
            description: "High-performance running shoes with Boost technology".to_string(),
        },
    ]
}

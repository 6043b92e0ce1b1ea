//! Conversion of raw backend payloads into strict domain records.
//!
//! Every function here is total: it accepts any JSON value (including `{}`,
//! `[]` and `null`) and returns a fully-populated record. Misshapen fields
//! degrade to documented defaults instead of failing:
//!
//! - string-or-array fields always become a `Vec<String>`
//! - non-numeric numbers become `0`, then are clamped to their valid range
//! - non-string text becomes its JSON rendering, missing text becomes `""`
//! - unknown fields are ignored
//!
//! All "is it a string or an array" branching lives in this module so the
//! rest of the crate only ever sees the normalized shape.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::models::{
    AgentAnalysis, AgentSuggestions, CustomerSegment, Forecast, InsightText, Priority, Product,
    SalesPoint, SalesSeries, Trend,
};

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Render a scalar or nested value as text. `null` has no text.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Normalize a field the backend sends as either a string or a list of
/// strings.
///
/// An array is used element by element (each coerced to text, `null`
/// elements skipped); any other non-empty value becomes a one-element list;
/// absent, `null` and `""` become an empty list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(other) => value_to_text(other).into_iter().collect(),
    }
}

/// Text field: strings as-is, other scalars as their JSON text, else `""`.
pub fn text(value: Option<&Value>) -> String {
    value.and_then(value_to_text).unwrap_or_default()
}

/// Numeric field: anything that is not a JSON number becomes `0.0`.
/// Numeric strings such as `"0.5"` are not parsed.
pub fn number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

/// Confidence score in `[0, 1]`.
pub fn confidence(value: Option<&Value>) -> f64 {
    number(value).clamp(0.0, 1.0)
}

/// Percentage in `[0, 100]`.
pub fn percentage(value: Option<&Value>) -> f64 {
    number(value).clamp(0.0, 100.0)
}

fn non_negative(value: Option<&Value>) -> f64 {
    number(value).max(0.0)
}

fn count(value: Option<&Value>) -> u64 {
    match value {
        Some(v) => v
            .as_u64()
            .unwrap_or_else(|| v.as_f64().map(|f| f.max(0.0).round() as u64).unwrap_or(0)),
        None => 0,
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

pub fn normalize_product(raw: &Value) -> Product {
    Product {
        product_id: text(raw.get("product_id")),
        name: text(raw.get("name")),
        category: text(raw.get("category")),
        price: non_negative(raw.get("price")),
        brand: text(raw.get("brand")),
        description: text(raw.get("description")),
    }
}

/// Normalize a `/search` body.
///
/// A non-array body yields no products. Entries without an identifier are
/// dropped, and only the first entry for each identifier is kept.
pub fn normalize_products(raw: &Value) -> Vec<Product> {
    let mut seen = HashSet::new();
    let mut products = Vec::new();
    for item in array(Some(raw)) {
        let product = normalize_product(item);
        if product.product_id.is_empty() {
            debug!("dropping search result without product_id");
            continue;
        }
        if seen.insert(product.product_id.clone()) {
            products.push(product);
        }
    }
    products
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Normalize a `/products/{id}/sales` body.
///
/// The `dates`, `sales` and `units_sold` columns are zipped to the shortest
/// length. Points with an unparseable date, or a date not strictly after the
/// previous kept point, are dropped. `fallback_id` is used when the body
/// carries no `product_id`.
pub fn normalize_sales(raw: &Value, fallback_id: &str) -> SalesSeries {
    let dates = array(raw.get("dates"));
    let sales = array(raw.get("sales"));
    let units = array(raw.get("units_sold"));

    let mut points: Vec<SalesPoint> = Vec::with_capacity(dates.len());
    for ((date, revenue), sold) in dates.iter().zip(sales).zip(units) {
        let Some(date) = parse_date(date) else {
            continue;
        };
        if points.last().is_some_and(|prev| prev.date >= date) {
            continue;
        }
        points.push(SalesPoint {
            date,
            revenue: number(Some(revenue)),
            units_sold: count(Some(sold)),
        });
    }

    SalesSeries {
        product_id: product_id_or(raw, fallback_id),
        points,
    }
}

fn product_id_or(raw: &Value, fallback_id: &str) -> String {
    let id = text(raw.get("product_id"));
    if id.is_empty() {
        fallback_id.to_string()
    } else {
        id
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// Anything other than `"increasing"` (any case) is classified as
/// [`Trend::Decreasing`].
pub fn trend(value: Option<&Value>) -> Trend {
    match value.and_then(Value::as_str) {
        Some(s) if s.trim().eq_ignore_ascii_case("increasing") => Trend::Increasing,
        _ => Trend::Decreasing,
    }
}

pub fn normalize_forecast(raw: &Value, fallback_id: &str) -> Forecast {
    Forecast {
        product_id: product_id_or(raw, fallback_id),
        next_month_forecast: number(raw.get("next_month_forecast")),
        trend: trend(raw.get("trend")),
        confidence: confidence(raw.get("confidence")),
    }
}

// ---------------------------------------------------------------------------
// Segments and insights
// ---------------------------------------------------------------------------

pub fn normalize_segment(raw: &Value) -> CustomerSegment {
    CustomerSegment {
        name: text(raw.get("name")),
        percentage: percentage(raw.get("percentage")),
        avg_age: non_negative(raw.get("avg_age")),
        interests: string_list(raw.get("interests")),
        purchase_frequency: text(raw.get("purchase_frequency")),
    }
}

pub fn normalize_segments(raw: &Value) -> Vec<CustomerSegment> {
    array(raw.get("segments"))
        .iter()
        .map(normalize_segment)
        .collect()
}

/// The narrative is passed through unmodified; a non-string value yields
/// an empty narrative.
pub fn normalize_insights(raw: &Value) -> InsightText {
    InsightText(
        raw.get("insights")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    )
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

pub fn normalize_analysis(raw: &Value) -> AgentAnalysis {
    let next_steps = match raw.get("next_steps") {
        None | Some(Value::Null) => None,
        steps => Some(string_list(steps)),
    };
    AgentAnalysis {
        analysis: text(raw.get("analysis")),
        recommendations: string_list(raw.get("recommendations")),
        confidence: confidence(raw.get("confidence")),
        next_steps,
    }
}

pub fn normalize_suggestions(raw: &Value) -> AgentSuggestions {
    AgentSuggestions {
        suggestions: string_list(raw.get("suggestions")),
        priority: raw
            .get("priority")
            .and_then(Value::as_str)
            .map(Priority::parse_lenient)
            .unwrap_or_default(),
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SalesSeries — historical revenue and units per reporting period
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub units_sold: u64,
}

/// Sales history for one product.
///
/// Points are ordered by strictly increasing date. Storing triples keeps the
/// dates, revenue and units columns the same length by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSeries {
    pub product_id: String,
    pub points: Vec<SalesPoint>,
}

impl SalesSeries {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn revenue(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.revenue).collect()
    }

    pub fn units(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.units_sold).collect()
    }

    pub fn total_revenue(&self) -> f64 {
        self.points.iter().map(|p| p.revenue).sum()
    }

    /// Sum of units sold, saturating at `u64::MAX`.
    pub fn total_units(&self) -> u64 {
        self.points
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.units_sold))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Forecast — next-period revenue prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub product_id: String,
    pub next_month_forecast: f64,
    pub trend: Trend,
    /// In `[0, 1]`.
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// CustomerSegment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub name: String,
    /// Share of the customer base, in `[0, 100]`. Shares are not required to
    /// sum to 100 across a product's segments.
    pub percentage: f64,
    pub avg_age: f64,
    pub interests: Vec<String>,
    pub purchase_frequency: String,
}

// ---------------------------------------------------------------------------
// InsightText — backend narrative, passed through verbatim
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightText(pub String);

impl InsightText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InsightText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ProductAnalyticsView — the merged view model for one selection
// ---------------------------------------------------------------------------

/// One of the four per-product analytics fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsField {
    Sales,
    Forecast,
    Segments,
    Insights,
}

/// Committed analytics snapshot for a selected product.
///
/// Each field is present only if its fetch succeeded; the fetches that
/// failed are listed in `failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalyticsView {
    pub product_id: String,
    /// Selection generation the snapshot was produced for.
    pub generation: u64,
    pub sales: Option<SalesSeries>,
    pub forecast: Option<Forecast>,
    pub segments: Option<Vec<CustomerSegment>>,
    pub insights: Option<InsightText>,
    #[serde(default)]
    pub failed: Vec<AnalyticsField>,
}

impl ProductAnalyticsView {
    pub fn empty(product_id: &str, generation: u64) -> Self {
        Self {
            product_id: product_id.to_string(),
            generation,
            sales: None,
            forecast: None,
            segments: None,
            insights: None,
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Product — a catalogue entry returned by search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: String,
    /// Unit price, never negative.
    pub price: f64,
    pub brand: String,
    pub description: String,
}

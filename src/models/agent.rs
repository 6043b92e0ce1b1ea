use serde::{Deserialize, Serialize};

use crate::error::FetchError;

// ---------------------------------------------------------------------------
// AgentAnalysis — response to a free-text agent query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnalysis {
    pub analysis: String,
    pub recommendations: Vec<String>,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub next_steps: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// AgentSuggestions — proactive suggestions for a product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Case-insensitive parse; anything unrecognised is [`Priority::Medium`].
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSuggestions {
    pub suggestions: Vec<String>,
    pub priority: Priority,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    #[default]
    Query,
    Suggestions,
}

/// Lifecycle of one agent interaction mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(FetchError),
}

impl<T> Default for ModeState<T> {
    fn default() -> Self {
        ModeState::Idle
    }
}

impl<T> ModeState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ModeState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ModeState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

//! Conversational agent sub-flow for the selected product.
//!
//! Two independent modes share one session: free-text queries
//! ([`AgentSession::analyze`]) and on-demand suggestions
//! ([`AgentSession::suggestions`]). Each mode moves through
//! `Idle -> Loading -> Ready | Failed` and allows at most one request in
//! flight. Suggestions are fetched once per product and reused until the
//! product changes or they are invalidated.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::client::{FetchResult, ShopsightClient};
use crate::error::{Result, ShopsightError};
use crate::models::{AgentAnalysis, AgentMode, AgentSuggestions, ModeState};

#[derive(Default)]
struct SessionState {
    product_id: Option<String>,
    generation: u64,
    mode: AgentMode,
    query: ModeState<AgentAnalysis>,
    suggestions: ModeState<AgentSuggestions>,
}

type Slot<T> = fn(&mut SessionState) -> &mut ModeState<T>;

fn query_slot(state: &mut SessionState) -> &mut ModeState<AgentAnalysis> {
    &mut state.query
}

fn suggestions_slot(state: &mut SessionState) -> &mut ModeState<AgentSuggestions> {
    &mut state.suggestions
}

enum Begin<T> {
    Cached(T),
    Started { product_id: String, generation: u64 },
}

/// Agent interaction state for one product at a time.
///
/// Clones share state.
#[derive(Clone)]
pub struct AgentSession {
    client: ShopsightClient,
    state: Arc<Mutex<SessionState>>,
}

impl AgentSession {
    pub fn new(client: ShopsightClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|_| ShopsightError::Internal("agent session lock poisoned".into()))
    }

    /// Point the session at a product.
    ///
    /// Changing product resets both modes to `Idle`; results still in flight
    /// for the previous product are discarded when they arrive.
    pub fn set_product(&self, product_id: &str) -> Result<()> {
        let mut state = self.lock()?;
        if state.product_id.as_deref() == Some(product_id) {
            return Ok(());
        }
        state.product_id = Some(product_id.to_string());
        state.generation += 1;
        state.query = ModeState::Idle;
        state.suggestions = ModeState::Idle;
        debug!(product_id, generation = state.generation, "agent session product changed");
        Ok(())
    }

    pub fn product(&self) -> Result<Option<String>> {
        Ok(self.lock()?.product_id.clone())
    }

    /// Switch the active mode. Never triggers a fetch.
    pub fn set_mode(&self, mode: AgentMode) -> Result<()> {
        self.lock()?.mode = mode;
        Ok(())
    }

    pub fn mode(&self) -> Result<AgentMode> {
        Ok(self.lock()?.mode)
    }

    pub fn query_state(&self) -> Result<ModeState<AgentAnalysis>> {
        Ok(self.lock()?.query.clone())
    }

    pub fn suggestions_state(&self) -> Result<ModeState<AgentSuggestions>> {
        Ok(self.lock()?.suggestions.clone())
    }

    /// Ask the agent about the current product.
    ///
    /// Fails fast with [`ShopsightError::Busy`] while a previous query is
    /// loading. A failed request leaves the mode in `Failed` and is returned
    /// as [`ShopsightError::Fetch`]; it is never retried automatically.
    pub async fn analyze(&self, query: &str) -> Result<AgentAnalysis> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ShopsightError::InvalidArgument(
                "query must not be empty".into(),
            ));
        }
        let begin = self.begin::<AgentAnalysis>(AgentMode::Query, query_slot, false)?;
        let (product_id, generation) = match begin {
            Begin::Started {
                product_id,
                generation,
            } => (product_id, generation),
            Begin::Cached(analysis) => return Ok(analysis),
        };

        // The request runs on its own task so the mode always leaves
        // `Loading`, even if the caller stops waiting.
        let session = self.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let result = session.client.analyze(&query, &product_id).await;
            session.finish(query_slot, generation, result)
        })
        .await
        .map_err(|e| ShopsightError::Internal(format!("Task join error: {e}")))?
    }

    /// Suggestions for the current product, fetched at most once.
    ///
    /// A `Ready` result is returned without a network call. A `Failed` one
    /// is retried when this is called again.
    pub async fn suggestions(&self) -> Result<AgentSuggestions> {
        let begin =
            self.begin::<AgentSuggestions>(AgentMode::Suggestions, suggestions_slot, true)?;
        let (product_id, generation) = match begin {
            Begin::Started {
                product_id,
                generation,
            } => (product_id, generation),
            Begin::Cached(suggestions) => return Ok(suggestions),
        };

        let session = self.clone();
        tokio::spawn(async move {
            let result = session.client.suggestions(&product_id).await;
            session.finish(suggestions_slot, generation, result)
        })
        .await
        .map_err(|e| ShopsightError::Internal(format!("Task join error: {e}")))?
    }

    /// Force the next [`suggestions`](Self::suggestions) call to fetch.
    pub fn invalidate_suggestions(&self) -> Result<()> {
        let mut state = self.lock()?;
        if state.suggestions.is_loading() {
            return Err(ShopsightError::Busy);
        }
        state.suggestions = ModeState::Idle;
        Ok(())
    }

    fn begin<T: Clone>(
        &self,
        mode: AgentMode,
        slot: Slot<T>,
        reuse_ready: bool,
    ) -> Result<Begin<T>> {
        let mut state = self.lock()?;
        let product_id = state
            .product_id
            .clone()
            .ok_or_else(|| ShopsightError::InvalidArgument("no product selected".into()))?;
        let generation = state.generation;
        state.mode = mode;

        let current = slot(&mut *state);
        if current.is_loading() {
            return Err(ShopsightError::Busy);
        }
        if reuse_ready {
            if let Some(ready) = current.ready() {
                return Ok(Begin::Cached(ready.clone()));
            }
        }
        *current = ModeState::Loading;
        Ok(Begin::Started {
            product_id,
            generation,
        })
    }

    fn finish<T: Clone>(
        &self,
        slot: Slot<T>,
        generation: u64,
        result: FetchResult<T>,
    ) -> Result<T> {
        let mut state = self.lock()?;
        if state.generation != generation {
            debug!(generation, current = state.generation, "discarding stale agent result");
            return Err(ShopsightError::StaleDiscarded);
        }
        let current = slot(&mut *state);
        match result {
            Ok(value) => {
                *current = ModeState::Ready(value.clone());
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "agent request failed");
                *current = ModeState::Failed(e.clone());
                Err(e.into())
            }
        }
    }
}

//! Per-product analytics fan-out with stale-response suppression.
//!
//! Selecting a product starts one *run*: the sales, forecast, segments and
//! insights fetches are issued concurrently on a spawned task and merged
//! into a [`ProductAnalyticsView`] once all four settle. Every run carries
//! the selection generation it was started for. [`SelectionAggregator::commit`]
//! is the only writer of the published view and refuses results whose
//! generation is no longer current, so a slow response for an old selection
//! can never overwrite a newer one.
//!
//! The merge step runs inside the spawned task, so a run is committed (or
//! discarded) even when nobody is awaiting it any more. Superseded runs are
//! not cancelled on the wire; their results are dropped at the merge step.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::{FetchResult, ShopsightClient};
use crate::error::{Result, ShopsightError};
use crate::models::{AnalyticsField, ProductAnalyticsView};

type SharedRun = Shared<BoxFuture<'static, Outcome>>;

/// What a finished run resolved to, shared by every caller awaiting it.
#[derive(Clone)]
enum Outcome {
    Committed(ProductAnalyticsView),
    Stale,
    Failed(String),
}

struct InFlight {
    product_id: String,
    generation: u64,
    run: SharedRun,
}

#[derive(Default)]
struct SelectionState {
    generation: u64,
    selected: Option<String>,
    in_flight: Option<InFlight>,
}

enum Plan {
    Committed(ProductAnalyticsView),
    Await(SharedRun),
}

// ---------------------------------------------------------------------------
// SelectionAggregator
// ---------------------------------------------------------------------------

/// Owns the current selection and its committed analytics view.
///
/// Clones share state, so a clone can be moved into a spawned task.
#[derive(Clone)]
pub struct SelectionAggregator {
    client: ShopsightClient,
    state: Arc<Mutex<SelectionState>>,
    view_tx: Arc<watch::Sender<Option<ProductAnalyticsView>>>,
}

impl SelectionAggregator {
    pub fn new(client: ShopsightClient) -> Self {
        let (view_tx, _) = watch::channel(None);
        Self {
            client,
            state: Arc::new(Mutex::new(SelectionState::default())),
            view_tx: Arc::new(view_tx),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SelectionState>> {
        self.state
            .lock()
            .map_err(|_| ShopsightError::Internal("selection state lock poisoned".into()))
    }

    /// Select a product and wait for its analytics view.
    ///
    /// - If a run for `product_id` is already in flight, this joins it
    ///   instead of issuing new requests.
    /// - If `product_id` is already selected and its view committed, the
    ///   committed view is returned without network calls.
    ///
    /// Returns [`ShopsightError::StaleDiscarded`] if another product was
    /// selected (or the selection cleared) before this run finished.
    pub async fn select(&self, product_id: &str) -> Result<ProductAnalyticsView> {
        if product_id.is_empty() {
            return Err(ShopsightError::InvalidArgument(
                "product_id must not be empty".into(),
            ));
        }
        let plan = {
            let mut state = self.lock()?;
            self.plan(&mut state, product_id, false)
        };
        self.resolve(plan).await
    }

    /// Re-fetch the analytics of the currently selected product.
    ///
    /// Joins the in-flight run if there is one.
    pub async fn refresh(&self) -> Result<ProductAnalyticsView> {
        let plan = {
            let mut state = self.lock()?;
            let product_id = state.selected.clone().ok_or_else(|| {
                ShopsightError::InvalidArgument("no product selected".into())
            })?;
            self.plan(&mut state, &product_id, true)
        };
        self.resolve(plan).await
    }

    /// Drop the current selection. In-flight results will be discarded.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.generation += 1;
        state.selected = None;
        state.in_flight = None;
        self.view_tx.send_replace(None);
        Ok(())
    }

    /// The most recently committed view, if any.
    pub fn view(&self) -> Option<ProductAnalyticsView> {
        self.view_tx.borrow().clone()
    }

    /// Receive every committed view. Partial merges are never published.
    pub fn subscribe(&self) -> watch::Receiver<Option<ProductAnalyticsView>> {
        self.view_tx.subscribe()
    }

    pub fn selected(&self) -> Result<Option<String>> {
        Ok(self.lock()?.selected.clone())
    }

    pub fn is_loading(&self) -> Result<bool> {
        Ok(self.lock()?.in_flight.is_some())
    }

    pub fn client(&self) -> &ShopsightClient {
        &self.client
    }

    fn plan(&self, state: &mut SelectionState, product_id: &str, force: bool) -> Plan {
        if let Some(in_flight) = &state.in_flight {
            if in_flight.product_id == product_id {
                debug!(product_id, generation = in_flight.generation, "joining in-flight run");
                return Plan::Await(in_flight.run.clone());
            }
        }

        if !force && state.selected.as_deref() == Some(product_id) {
            let committed = self.view_tx.borrow();
            if let Some(view) = committed.as_ref() {
                if view.product_id == product_id && view.generation == state.generation {
                    return Plan::Committed(view.clone());
                }
            }
        }

        state.generation += 1;
        let generation = state.generation;
        state.selected = Some(product_id.to_string());

        debug!(product_id, generation, "starting analytics run");
        let run = self.spawn_run(product_id.to_string(), generation);
        state.in_flight = Some(InFlight {
            product_id: product_id.to_string(),
            generation,
            run: run.clone(),
        });
        Plan::Await(run)
    }

    async fn resolve(&self, plan: Plan) -> Result<ProductAnalyticsView> {
        match plan {
            Plan::Committed(view) => Ok(view),
            Plan::Await(run) => match run.await {
                Outcome::Committed(view) => Ok(view),
                Outcome::Stale => Err(ShopsightError::StaleDiscarded),
                Outcome::Failed(message) => Err(ShopsightError::Internal(message)),
            },
        }
    }

    /// Start the fan-out for `generation` on its own task. The task commits
    /// its result before finishing.
    fn spawn_run(&self, product_id: String, generation: u64) -> SharedRun {
        let aggregator = self.clone();
        let handle = tokio::spawn(async move {
            let fetch = tokio::spawn(fetch_all(
                aggregator.client.clone(),
                product_id.clone(),
                generation,
            ));
            let view = match fetch.await {
                Ok(view) => view,
                Err(e) => {
                    warn!(product_id = %product_id, error = %e, "analytics task failed");
                    let mut view = ProductAnalyticsView::empty(&product_id, generation);
                    view.failed = vec![
                        AnalyticsField::Sales,
                        AnalyticsField::Forecast,
                        AnalyticsField::Segments,
                        AnalyticsField::Insights,
                    ];
                    view
                }
            };
            match aggregator.commit(generation, view) {
                Ok(view) => Outcome::Committed(view),
                Err(ShopsightError::StaleDiscarded) => Outcome::Stale,
                Err(e) => Outcome::Failed(e.to_string()),
            }
        });
        async move {
            handle
                .await
                .unwrap_or_else(|e| Outcome::Failed(format!("Task join error: {e}")))
        }
        .boxed()
        .shared()
    }

    /// The single merge point: publish `view` only if its run is current.
    fn commit(&self, generation: u64, view: ProductAnalyticsView) -> Result<ProductAnalyticsView> {
        let mut state = self.lock()?;
        if state.generation != generation {
            debug!(
                product_id = %view.product_id,
                generation,
                current = state.generation,
                "discarding stale analytics"
            );
            return Err(ShopsightError::StaleDiscarded);
        }
        state.in_flight = None;
        self.view_tx.send_replace(Some(view.clone()));
        Ok(view)
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

async fn fetch_all(
    client: ShopsightClient,
    product_id: String,
    generation: u64,
) -> ProductAnalyticsView {
    let (sales, forecast, segments, insights) = tokio::join!(
        client.sales(&product_id),
        client.forecast(&product_id),
        client.segments(&product_id),
        client.insights(&product_id),
    );

    let mut failed = Vec::new();
    ProductAnalyticsView {
        sales: settle(&product_id, AnalyticsField::Sales, sales, &mut failed),
        forecast: settle(&product_id, AnalyticsField::Forecast, forecast, &mut failed),
        segments: settle(&product_id, AnalyticsField::Segments, segments, &mut failed),
        insights: settle(&product_id, AnalyticsField::Insights, insights, &mut failed),
        failed,
        product_id,
        generation,
    }
}

fn settle<T>(
    product_id: &str,
    field: AnalyticsField,
    result: FetchResult<T>,
    failed: &mut Vec<AnalyticsField>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(product_id, ?field, error = %e, "analytics fetch failed");
            failed.push(field);
            None
        }
    }
}

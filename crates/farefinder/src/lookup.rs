//! Debounced airport autocomplete.
//!
//! Each [`AirportLookup`] owns a background task. Query updates are pushed
//! through a channel; once no update has arrived for the debounce window the
//! latest query is dispatched on its own task, and the options it returns
//! replace the published list.
//!
//! Requests are neither deduplicated nor cancelled. Whichever response
//! arrives last wins, even if it belongs to an older query, so a slow early
//! request can overwrite the results of a fast later one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::airport::AirportOption;
use crate::api::AirportSearch;

/// Debounced airport search feeding a shared option list.
#[derive(Debug)]
pub struct AirportLookup {
    queries: mpsc::UnboundedSender<String>,
    options: watch::Receiver<Vec<AirportOption>>,
    task: JoinHandle<()>,
}

impl AirportLookup {
    /// Start a lookup that waits `debounce` after the last query update
    /// before searching.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<A>(api: Arc<A>, debounce: Duration) -> Self
    where
        A: AirportSearch + ?Sized + 'static,
    {
        let (queries, query_rx) = mpsc::unbounded_channel();
        let (options_tx, options) = watch::channel(Vec::new());
        let task = tokio::spawn(run_debounce_loop(
            api,
            debounce,
            query_rx,
            Arc::new(options_tx),
        ));
        Self {
            queries,
            options,
            task,
        }
    }

    /// Record the text currently typed in the field.
    pub fn set_query(&self, query: impl Into<String>) {
        // The loop only stops once this handle is dropped.
        let _ = self.queries.send(query.into());
    }

    /// The current option list.
    #[must_use]
    pub fn options(&self) -> Vec<AirportOption> {
        self.options.borrow().clone()
    }

    /// A receiver notified every time the option list is replaced.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<AirportOption>> {
        self.options.clone()
    }
}

impl Drop for AirportLookup {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wait for a query, absorb further updates until the debounce window
/// passes quietly, then dispatch the latest one.
async fn run_debounce_loop<A>(
    api: Arc<A>,
    debounce: Duration,
    mut query_rx: mpsc::UnboundedReceiver<String>,
    options_tx: Arc<watch::Sender<Vec<AirportOption>>>,
) where
    A: AirportSearch + ?Sized + 'static,
{
    while let Some(mut query) = query_rx.recv().await {
        loop {
            match tokio::time::timeout(debounce, query_rx.recv()).await {
                Ok(Some(next)) => query = next,
                // Handle dropped mid-window; nobody is left to read results.
                Ok(None) => return,
                Err(_) => break,
            }
        }
        dispatch(&api, query, &options_tx);
    }
}

fn dispatch<A>(api: &Arc<A>, query: String, options_tx: &Arc<watch::Sender<Vec<AirportOption>>>)
where
    A: AirportSearch + ?Sized + 'static,
{
    if query.is_empty() {
        options_tx.send_replace(Vec::new());
        return;
    }

    trace!(%query, "dispatching airport lookup");
    let api = Arc::clone(api);
    let options_tx = Arc::clone(options_tx);
    tokio::spawn(async move {
        match api.search_airports(&query).await {
            Ok(options) => {
                options_tx.send_replace(options);
            }
            Err(e) => warn!(%query, "airport lookup failed: {e}"),
        }
    });
}

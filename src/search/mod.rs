use crate::models::SearchResult;
use crate::omdb::{ApiError, MovieApi};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
    pub loading: bool,
}

struct Inner {
    generation: u64,
    state: SearchState,
}

/// Owns the query and the results list.
///
/// Each query change takes a new generation; a response that comes back
/// after a newer query was issued is dropped.
pub struct SearchController {
    api: Arc<dyn MovieApi>,
    min_query_len: usize,
    inner: Mutex<Inner>,
}

impl SearchController {
    pub fn new(api: Arc<dyn MovieApi>, min_query_len: usize) -> Self {
        Self {
            api,
            min_query_len,
            inner: Mutex::new(Inner {
                generation: 0,
                state: SearchState::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SearchState {
        self.lock().state.clone()
    }

    pub fn result_at(&self, position: usize) -> Option<SearchResult> {
        position
            .checked_sub(1)
            .and_then(|i| self.lock().state.results.get(i).cloned())
    }

    #[instrument(skip(self))]
    pub async fn set_query(&self, query: &str) -> SearchState {
        let ticket = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state.query = query.to_string();

            if query.chars().count() < self.min_query_len {
                inner.state.results.clear();
                inner.state.error = None;
                inner.state.loading = false;
                return inner.state.clone();
            }

            inner.state.loading = true;
            inner.state.error = None;
            inner.generation
        };

        let outcome = self.api.search(query).await;

        let mut inner = self.lock();
        if inner.generation != ticket {
            debug!(ticket, current = inner.generation, "Discarding stale search response");
            return inner.state.clone();
        }

        match outcome {
            Ok(results) => {
                debug!("Applying {} results", results.len());
                inner.state.results = results;
            }
            Err(e) => {
                if let ApiError::NotFound { ref reason } = e {
                    debug!(?reason, "No matches for query");
                    inner.state.results.clear();
                } else {
                    warn!("Search failed: {}", e);
                }
                inner.state.error = Some(e.to_string());
            }
        }
        inner.state.loading = false;
        inner.state.clone()
    }
}

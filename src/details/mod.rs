use crate::models::{MovieDetail, WatchedEntry};
use crate::omdb::MovieApi;
use crate::storage::Storage;
use crate::watched::WatchedStore;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailStatus {
    #[default]
    Idle,
    Loading,
    Loaded(MovieDetail),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    pub selected_id: Option<String>,
    pub status: DetailStatus,
    pub user_rating: Option<u8>,
}

impl DetailState {
    pub fn detail(&self) -> Option<&MovieDetail> {
        match self.status {
            DetailStatus::Loaded(ref detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("No movie is selected")]
    NothingSelected,
    #[error("Movie details have not loaded yet")]
    NotLoaded,
    #[error("{title} is already in your watched list")]
    AlreadyWatched { title: String },
    #[error("Choose a rating before adding to the watched list")]
    MissingRating,
    #[error("Rating must be between 1 and {max}")]
    RatingOutOfRange { max: u8 },
    #[error("Failed to save watched list: {0}")]
    Storage(anyhow::Error),
}

struct Inner {
    generation: u64,
    state: DetailState,
}

/// Selection, detail fetch and rating for a single movie at a time.
pub struct DetailController {
    api: Arc<dyn MovieApi>,
    max_stars: u8,
    inner: Mutex<Inner>,
}

impl DetailController {
    pub fn new(api: Arc<dyn MovieApi>, max_stars: u8) -> Self {
        Self {
            api,
            max_stars,
            inner: Mutex::new(Inner {
                generation: 0,
                state: DetailState::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_stars(&self) -> u8 {
        self.max_stars
    }

    pub fn state(&self) -> DetailState {
        self.lock().state.clone()
    }

    /// Selecting the current movie again deselects it; any other id becomes
    /// the new target and its details are fetched.
    #[instrument(skip(self))]
    pub async fn toggle(&self, id: &str) -> DetailState {
        let ticket = {
            let mut inner = self.lock();
            inner.generation += 1;

            if inner.state.selected_id.as_deref() == Some(id) {
                debug!("Deselecting {}", id);
                inner.state = DetailState::default();
                return inner.state.clone();
            }

            inner.state = DetailState {
                selected_id: Some(id.to_string()),
                status: DetailStatus::Loading,
                user_rating: None,
            };
            inner.generation
        };

        let outcome = self.api.details(id).await;

        let mut inner = self.lock();
        if inner.generation != ticket {
            debug!(ticket, current = inner.generation, "Discarding stale detail response");
            return inner.state.clone();
        }

        inner.state.status = match outcome {
            Ok(detail) => {
                info!("Loaded details for {} ({})", detail.title, detail.id);
                DetailStatus::Loaded(detail)
            }
            Err(e) => {
                warn!("Detail lookup for {} failed: {}", id, e);
                DetailStatus::Failed(e.to_string())
            }
        };
        inner.state.clone()
    }

    /// Back to the list view; an in-flight fetch is dropped on arrival.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = DetailState::default();
    }

    pub fn rate(&self, rating: u8) -> Result<u8, CommitError> {
        if rating == 0 || rating > self.max_stars {
            return Err(CommitError::RatingOutOfRange {
                max: self.max_stars,
            });
        }

        let mut inner = self.lock();
        if inner.state.selected_id.is_none() {
            return Err(CommitError::NothingSelected);
        }
        inner.state.user_rating = Some(rating);
        Ok(rating)
    }

    /// Moves the loaded movie into `store` with the chosen rating and clears
    /// the selection.
    pub fn commit<S: Storage>(&self, store: &mut WatchedStore<S>) -> Result<WatchedEntry, CommitError> {
        let mut inner = self.lock();
        let state = &inner.state;

        if state.selected_id.is_none() {
            return Err(CommitError::NothingSelected);
        }
        let detail = state.detail().ok_or(CommitError::NotLoaded)?;
        if store.contains(&detail.id) {
            return Err(CommitError::AlreadyWatched {
                title: detail.title.clone(),
            });
        }
        let rating = state.user_rating.ok_or(CommitError::MissingRating)?;

        let entry = WatchedEntry::from_detail(detail, rating, Utc::now());
        store.add(entry.clone()).map_err(CommitError::Storage)?;
        info!("Added {} to watched list with rating {}", entry.title, rating);

        inner.generation += 1;
        inner.state = DetailState::default();
        Ok(entry)
    }
}

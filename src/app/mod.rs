use crate::details::{CommitError, DetailController, DetailState, DetailStatus};
use crate::models::WatchedEntry;
use crate::omdb::MovieApi;
use crate::search::{SearchController, SearchState};
use crate::stats::WatchedStats;
use crate::storage::Storage;
use crate::watched::WatchedStore;
use anyhow::Result;
use std::sync::Arc;

/// Search, detail and watched list wired into one session.
pub struct App<S: Storage> {
    search: SearchController,
    details: DetailController,
    watched: WatchedStore<S>,
}

impl<S: Storage> App<S> {
    pub fn new(api: Arc<dyn MovieApi>, watched: WatchedStore<S>, min_query_len: usize, max_stars: u8) -> Self {
        Self {
            search: SearchController::new(api.clone(), min_query_len),
            details: DetailController::new(api, max_stars),
            watched,
        }
    }

    pub async fn set_query(&self, query: &str) -> SearchState {
        self.search.set_query(query).await
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    /// Toggles selection of the search result at a 1-based position.
    pub async fn select_result(&self, position: usize) -> Option<DetailState> {
        let result = self.search.result_at(position)?;
        Some(self.details.toggle(&result.id).await)
    }

    pub async fn select(&self, id: &str) -> DetailState {
        self.details.toggle(id).await
    }

    pub fn detail_state(&self) -> DetailState {
        self.details.state()
    }

    pub fn back(&self) {
        self.details.clear();
    }

    pub fn rate(&self, rating: u8) -> Result<u8, CommitError> {
        self.details.rate(rating)
    }

    pub fn max_stars(&self) -> u8 {
        self.details.max_stars()
    }

    pub fn add_selected(&mut self) -> Result<WatchedEntry, CommitError> {
        self.details.commit(&mut self.watched)
    }

    /// Loads, rates and commits `id` in one step.
    pub async fn add_by_id(&mut self, id: &str, rating: u8) -> Result<WatchedEntry> {
        let state = self.details.toggle(id).await;
        if let DetailStatus::Failed(ref message) = state.status {
            anyhow::bail!("Could not load {}: {}", id, message);
        }
        self.details.rate(rating)?;
        Ok(self.add_selected()?)
    }

    pub fn remove_watched(&mut self, id: &str) -> Result<usize> {
        self.watched.remove(id)
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        self.watched.entries()
    }

    pub fn watched_entry(&self, id: &str) -> Option<&WatchedEntry> {
        self.watched.get(id)
    }

    pub fn stats(&self) -> WatchedStats {
        WatchedStats::from_entries(self.watched.entries())
    }

    #[cfg(test)]
    pub fn store(&self) -> &WatchedStore<S> {
        &self.watched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omdb::fake::{detail, result, FakeApi};
    use crate::storage::MemoryStorage;
    use crate::watched::WATCHED_KEY;

    fn app(api: FakeApi) -> (Arc<FakeApi>, App<MemoryStorage>) {
        let api = Arc::new(api);
        let store = WatchedStore::load(MemoryStorage::default()).unwrap();
        (api.clone(), App::new(api, store, 3, 10))
    }

    fn persisted(app: &App<MemoryStorage>) -> Vec<WatchedEntry> {
        let raw = app.store().storage().slots.get(WATCHED_KEY).unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn two_letter_query_stays_quiet() {
        let (api, app) = app(FakeApi::new());
        let state = app.set_query("in").await;
        assert!(state.results.is_empty());
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert_eq!(api.search_calls(), 0);
    }

    #[tokio::test]
    async fn search_select_rate_add_then_remove() {
        let (_, mut app) = app(
            FakeApi::new()
                .with_search("inception", vec![result("tt1", "Inception"), result("tt2", "Inception: Jump")])
                .with_detail(detail("tt1", "Inception")),
        );

        let state = app.set_query("inception").await;
        assert_eq!(state.results.len(), 2);
        assert_eq!(state.results[0].id, "tt1");
        assert_eq!(state.results[1].id, "tt2");

        let detail_state = app.select_result(1).await.unwrap();
        assert_eq!(detail_state.selected_id.as_deref(), Some("tt1"));
        assert!(app.watched_entry("tt1").is_none());

        app.rate(8).unwrap();
        let entry = app.add_selected().unwrap();
        assert_eq!(entry.id, "tt1");
        assert_eq!(entry.user_rating, 8);
        assert_eq!(app.detail_state().selected_id, None);
        assert_eq!(app.watched().len(), 1);
        assert_eq!(persisted(&app), app.watched());

        let stats = app.stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.avg_user_rating, 8.0);
        assert_eq!(stats.avg_runtime_minutes, 148.0);

        assert_eq!(app.remove_watched("tt1").unwrap(), 1);
        assert!(app.watched().is_empty());
        assert!(persisted(&app).is_empty());
        assert_eq!(app.stats(), WatchedStats::default());
    }

    #[tokio::test]
    async fn selecting_out_of_range_position_is_none() {
        let (api, app) = app(FakeApi::new().with_search("matrix", vec![result("tt3", "The Matrix")]));
        app.set_query("matrix").await;
        assert!(app.select_result(2).await.is_none());
        assert_eq!(api.detail_calls(), 0);
    }

    #[tokio::test]
    async fn add_by_id_commits_loaded_movie() {
        let (_, mut app) = app(FakeApi::new().with_detail(detail("tt1", "Inception")));
        let entry = app.add_by_id("tt1", 8).await.unwrap();
        assert_eq!(entry.id, "tt1");
        assert_eq!(persisted(&app), app.watched());
    }

    #[tokio::test]
    async fn add_by_id_fails_when_lookup_fails() {
        let (_, mut app) = app(FakeApi::new().with_detail_failure("tt1", "timed out"));
        let err = app.add_by_id("tt1", 8).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(app.watched().is_empty());
    }

    #[tokio::test]
    async fn add_by_id_rejects_already_watched() {
        let (_, mut app) = app(FakeApi::new().with_detail(detail("tt1", "Inception")));
        app.add_by_id("tt1", 8).await.unwrap();
        assert!(app.add_by_id("tt1", 5).await.is_err());
        assert_eq!(app.watched().len(), 1);
    }

    #[tokio::test]
    async fn back_returns_to_list_view() {
        let (_, app) = app(FakeApi::new().with_detail(detail("tt1", "Inception")));
        app.select("tt1").await;
        app.back();
        assert_eq!(app.detail_state(), DetailState::default());
    }
}

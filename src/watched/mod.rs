use crate::models::WatchedEntry;
use crate::storage::Storage;
use anyhow::Result;
use tracing::{debug, info, warn};

pub const WATCHED_KEY: &str = "watched";
const BACKUP_KEY: &str = "watched.bak";

/// Ordered watched collection mirrored into a storage slot.
pub struct WatchedStore<S: Storage> {
    entries: Vec<WatchedEntry>,
    storage: S,
}

impl<S: Storage> WatchedStore<S> {
    /// Seeds the collection from the `watched` slot.
    ///
    /// An absent slot or a JSON `null` is an empty collection. Entries that
    /// do not read as a `WatchedEntry` are skipped; a value that is not an
    /// array at all leaves the store empty. Either way the raw value is
    /// copied to `watched.bak` first.
    pub fn load(mut storage: S) -> Result<Self> {
        let raw = storage.get_item(WATCHED_KEY)?;

        let entries = match raw.as_deref() {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Option<Vec<serde_json::Value>>>(raw) {
                Ok(values) => {
                    let values = values.unwrap_or_default();
                    let total = values.len();
                    let entries = parse_entries(values);
                    if entries.len() < total {
                        warn!(
                            "Skipped {} unreadable watched entries",
                            total - entries.len()
                        );
                        backup(&mut storage, raw);
                    }
                    entries
                }
                Err(e) => {
                    warn!("Persisted watched list is malformed ({}), starting empty", e);
                    backup(&mut storage, raw);
                    Vec::new()
                }
            },
        };

        let store = Self { entries, storage };
        info!("Loaded {} watched movies", store.len());
        Ok(store)
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Appends without checking for an existing id.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<()> {
        debug!("Adding {} ({}) to watched list", entry.title, entry.id);
        self.entries.push(entry);
        self.persist()
    }

    /// Drops every entry with `id` and returns how many went.
    pub fn remove(&mut self, id: &str) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = before - self.entries.len();
        debug!("Removed {} entries for {}", removed, id);
        self.persist()?;
        Ok(removed)
    }

    fn persist(&mut self) -> Result<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        self.storage.set_item(WATCHED_KEY, &serialized)
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn parse_entries(values: Vec<serde_json::Value>) -> Vec<WatchedEntry> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WatchedEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Dropping watched entry: {}", e);
                None
            }
        })
        .collect()
}

fn backup<S: Storage>(storage: &mut S, raw: &str) {
    if let Err(e) = storage.set_item(BACKUP_KEY, raw) {
        warn!("Failed to back up watched list: {}", e);
    }
}

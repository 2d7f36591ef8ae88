use crate::models::WatchedEntry;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WatchedStats {
    pub count: usize,
    pub avg_critic_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime_minutes: f64,
}

impl WatchedStats {
    /// Entries missing a critic score or runtime are left out of that mean.
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            avg_critic_rating: average(entries.iter().filter_map(|e| e.critic_rating)),
            avg_user_rating: average(entries.iter().map(|e| f64::from(e.user_rating))),
            avg_runtime_minutes: average(
                entries
                    .iter()
                    .filter_map(|e| e.runtime_minutes)
                    .map(f64::from),
            ),
        }
    }
}

/// Arithmetic mean, 0 for no values.
pub fn average(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One row of an OMDb title search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub genre: String,
    pub rating: Option<f64>,
    pub runtime: String,
    pub runtime_minutes: Option<u32>,
    pub director: String,
    pub actors: String,
    pub plot: String,
}

/// A rated movie in the watched collection.
///
/// Field names on the wire match the collection format the web client
/// persisted. Entries it saved without a rating or title do not read and are
/// skipped on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: String,
    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,
    #[serde(rename = "imdbRating", default, deserialize_with = "lenient_score")]
    pub critic_rating: Option<f64>,
    #[serde(rename = "userRating")]
    pub user_rating: u8,
    #[serde(rename = "watchedAt", default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
}

impl WatchedEntry {
    pub fn from_detail(detail: &MovieDetail, user_rating: u8, watched_at: DateTime<Utc>) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            poster_url: detail.poster_url.clone(),
            runtime_minutes: detail.runtime_minutes,
            critic_rating: detail.rating,
            user_rating,
            watched_at: Some(watched_at),
        }
    }
}

/// Leading numeric token of an OMDb runtime such as `"148 min"`.
pub fn parse_runtime_minutes(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

/// OMDb scores arrive as strings and use `"N/A"` for missing values.
pub fn parse_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Score>::deserialize(deserializer)? {
        Some(Score::Number(n)) => Some(n),
        Some(Score::Text(s)) => parse_score(&s),
        None => None,
    })
}

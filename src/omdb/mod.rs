use crate::http::HttpClient;
use crate::models::{parse_runtime_minutes, parse_score, MovieDetail, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    /// OMDb answered `Response: "False"`.
    #[error("Movie not found")]
    NotFound { reason: Option<String> },
    #[error(transparent)]
    Request(#[from] anyhow::Error),
}

/// The two lookups the application makes against the movie database.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError>;

    async fn details(&self, id: &str) -> Result<MovieDetail, ApiError>;
}

pub struct OmdbClient {
    http: HttpClient,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<SearchResult>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
}

impl OmdbDetail {
    fn into_detail(self, requested_id: &str) -> MovieDetail {
        let id = if self.imdb_id.is_empty() {
            requested_id.to_string()
        } else {
            self.imdb_id
        };

        MovieDetail {
            id,
            title: self.title,
            year: self.year,
            poster_url: self.poster,
            genre: self.genre,
            rating: parse_score(&self.imdb_rating),
            runtime_minutes: parse_runtime_minutes(&self.runtime),
            runtime: self.runtime,
            director: self.director,
            actors: self.actors,
            plot: self.plot,
        }
    }
}

impl OmdbClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: String) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid OMDb base URL '{}': {}", base_url, e))?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url_with(&self, param: &str, value: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair(param, value);
        url
    }
}

#[async_trait]
impl MovieApi for OmdbClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = self.url_with("s", query);
        let envelope: SearchEnvelope = self.http.get_json(&url).await?;

        if envelope.response == "False" {
            debug!("Search rejected by OMDb: {:?}", envelope.error);
            return Err(ApiError::NotFound {
                reason: envelope.error,
            });
        }

        info!("Search returned {} results", envelope.search.len());
        Ok(envelope.search)
    }

    #[instrument(skip(self))]
    async fn details(&self, id: &str) -> Result<MovieDetail, ApiError> {
        let url = self.url_with("i", id);
        let detail: OmdbDetail = self.http.get_json(&url).await?;

        if detail.response == "False" {
            debug!("Detail lookup rejected by OMDb: {:?}", detail.error);
            return Err(ApiError::NotFound {
                reason: detail.error,
            });
        }

        Ok(detail.into_detail(id))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(base: &str) -> OmdbClient {
        let http = HttpClient::new(Duration::from_secs(5)).unwrap();
        OmdbClient::new(http, base, "secret".to_string()).unwrap()
    }

    #[test]
    fn builds_search_and_detail_urls() {
        let client = client("https://www.omdbapi.com/");
        let url = client.url_with("s", "the matrix");
        assert_eq!(
            url.as_str(),
            "https://www.omdbapi.com/?apikey=secret&s=the+matrix"
        );
        let url = client.url_with("i", "tt0133093");
        assert_eq!(url.as_str(), "https://www.omdbapi.com/?apikey=secret&i=tt0133093");
    }

    #[tokio::test]
    async fn request_errors_do_not_expose_api_key() {
        let client = client("http://127.0.0.1:1/");

        let err = client.search("inception").await.unwrap_err().to_string();
        assert!(!err.contains("secret"), "search error leaked key: {err}");

        let err = client.details("tt1").await.unwrap_err().to_string();
        assert!(!err.contains("secret"), "detail error leaked key: {err}");
    }

    #[tokio::test]
    async fn controllers_surface_redacted_errors() {
        let api: Arc<dyn MovieApi> = Arc::new(client("http://127.0.0.1:1/"));

        let search = crate::search::SearchController::new(api.clone(), 3);
        let state = search.set_query("inception").await;
        let message = state.error.unwrap();
        assert!(!message.is_empty());
        assert!(!message.contains("apikey"), "search state leaked key: {message}");

        let details = crate::details::DetailController::new(api, 10);
        let state = details.toggle("tt1").await;
        match state.status {
            crate::details::DetailStatus::Failed(message) => {
                assert!(!message.contains("apikey"), "detail state leaked key: {message}")
            }
            other => panic!("expected a failed lookup, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let http = HttpClient::new(Duration::from_secs(5)).unwrap();
        assert!(OmdbClient::new(http, "not a url", String::new()).is_err());
    }

    #[test]
    fn not_found_message_is_fixed() {
        let err = ApiError::NotFound {
            reason: Some("Too many results.".to_string()),
        };
        assert_eq!(err.to_string(), "Movie not found");
    }

    #[test]
    fn search_envelope_parses_both_shapes() {
        let found = r#"{"Search":[{"Title":"A","Year":"2001","imdbID":"tt1","Type":"movie","Poster":"N/A"},{"Title":"B","Year":"2002","imdbID":"tt2","Type":"movie","Poster":"N/A"}],"totalResults":"2","Response":"True"}"#;
        let envelope: SearchEnvelope = serde_json::from_str(found).unwrap();
        assert_eq!(envelope.response, "True");
        let ids: Vec<_> = envelope.search.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["tt1", "tt2"]);

        let missing = r#"{"Response":"False","Error":"Movie not found!"}"#;
        let envelope: SearchEnvelope = serde_json::from_str(missing).unwrap();
        assert_eq!(envelope.response, "False");
        assert!(envelope.search.is_empty());
        assert_eq!(envelope.error.as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn detail_payload_derives_runtime_and_rating() {
        let json = r#"{"Title":"Inception","Year":"2010","Runtime":"148 min","Genre":"Action, Adventure, Sci-Fi","Director":"Christopher Nolan","Actors":"Leonardo DiCaprio, Joseph Gordon-Levitt","Plot":"A thief...","Poster":"https://img/x.jpg","imdbRating":"8.8","imdbID":"tt1375666","Response":"True"}"#;
        let payload: OmdbDetail = serde_json::from_str(json).unwrap();
        let detail = payload.into_detail("tt1375666");
        assert_eq!(detail.runtime_minutes, Some(148));
        assert_eq!(detail.rating, Some(8.8));
        assert_eq!(detail.director, "Christopher Nolan");

        let json = r#"{"Title":"Short","Runtime":"N/A","imdbRating":"N/A","Response":"True"}"#;
        let payload: OmdbDetail = serde_json::from_str(json).unwrap();
        let detail = payload.into_detail("tt9");
        assert_eq!(detail.id, "tt9");
        assert_eq!(detail.runtime_minutes, None);
        assert_eq!(detail.rating, None);
    }
}

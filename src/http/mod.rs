use anyhow::Result;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("moviez/0.1.0")
            .build()?;

        Ok(Self { client })
    }

    // Query strings carry the API key: spans record host and path only, and
    // reqwest errors are stripped of their URL.
    #[instrument(skip(self, url), fields(host = url.host_str().unwrap_or_default(), path = url.path()))]
    pub async fn get(&self, url: &Url) -> Result<Response> {
        debug!("Making GET request");
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if !response.status().is_success() {
            error!("HTTP request failed with status: {}", response.status());
            return Err(anyhow::anyhow!("HTTP request failed: {}", response.status()));
        }

        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self.get(url).await?;
        let json = response.json::<T>().await.map_err(|e| e.without_url())?;
        Ok(json)
    }
}

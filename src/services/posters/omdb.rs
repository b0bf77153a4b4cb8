//! OMDb poster provider
//!
//! Looks a title up with `GET {api_url}/?t=<title>&apikey=<key>` and returns the
//! `Poster` field. OMDb reports a missing poster as `"N/A"` and an unknown title
//! as `{"Response": "False", "Error": "..."}`; both map to `None`.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::posters::PosterProvider,
};

/// Raw OMDb lookup response; only the fields we read
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl OmdbResponse {
    fn poster_url(self) -> Option<String> {
        self.poster
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty() && url != "N/A")
    }
}

/// Upper bound on a single OMDb lookup, connect included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct OmdbPosterProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbPosterProvider {
    pub fn new(api_key: String, api_url: String) -> AppResult<Self> {
        Self::with_timeout(api_key, api_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl PosterProvider for OmdbPosterProvider {
    async fn fetch_poster(&self, title: &str) -> AppResult<Option<String>> {
        let url = format!("{}/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("t", title), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let details: OmdbResponse = response.json().await?;

        if details.response.as_deref() == Some("False") {
            tracing::debug!(
                title = %title,
                error = details.error.as_deref().unwrap_or("unknown"),
                "OMDb has no entry for title"
            );
            return Ok(None);
        }

        let poster = details.poster_url();
        tracing::debug!(title = %title, found = poster.is_some(), provider = "omdb", "Poster fetched");

        Ok(poster)
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

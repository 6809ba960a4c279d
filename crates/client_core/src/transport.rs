//! HTTP transport for the TMDB v3 API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, MovieId},
    error::{FetchError, FetchResult},
    protocol::{Credits, MovieDetails, MoviePage, UpstreamErrorBody},
};
use tracing::debug;
use url::Url;

use crate::MovieApi;

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// v4 read access token sent as a bearer credential.
    pub access_token: String,
    pub language: Option<String>,
}

impl ApiConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: access_token.into(),
            language: None,
        }
    }
}

pub struct TmdbClient {
    http: Client,
    base_url: String,
    language: Option<String>,
}

impl TmdbClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid api base url '{}'", config.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("api base url must be http(s): {base}"));
        }
        if config.access_token.trim().is_empty() {
            return Err(anyhow!("api access token is empty"));
        }

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token.trim()))
            .context("api access token is not a valid header value")?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.filter(|language| !language.is_empty()),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> FetchResult<T> {
        let url = format!("{}{path}", self.base_url);
        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }
        debug!(%url, ?query, "GET upstream");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|err| FetchError::transport(format!("GET {path} failed: {err}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::transport(format!("reading {path} body failed: {err}")))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<UpstreamErrorBody>(&body)
                .ok()
                .and_then(|body| body.status_message)
                .unwrap_or_else(|| format!("GET {path} returned {status}"));
            return Err(FetchError::upstream(status.as_u16(), message));
        }

        serde_json::from_slice(&body)
            .map_err(|err| FetchError::malformed(format!("unexpected payload from {path}: {err}")))
    }
}

#[async_trait]
impl MovieApi for TmdbClient {
    async fn list_by_category(&self, category: Category, page: u32) -> FetchResult<MoviePage> {
        self.get_json(
            &format!("/movie/{}", category.as_str()),
            &[("page", page.to_string())],
        )
        .await
    }

    async fn search_by_text(&self, text: &str, page: u32) -> FetchResult<MoviePage> {
        self.get_json(
            "/search/movie",
            &[("query", text.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn get_detail(&self, id: MovieId) -> FetchResult<MovieDetails> {
        self.get_json(&format!("/movie/{}", id.0), &[]).await
    }

    async fn get_credits(&self, id: MovieId) -> FetchResult<Credits> {
        self.get_json(&format!("/movie/{}/credits", id.0), &[]).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;

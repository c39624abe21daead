//! Deezer HTTP client
//!
//! The public search API needs no credentials. Quota is roughly 50 requests
//! per 5 seconds; exceeding it yields an in-body error with code 4, which
//! the shared executor retries like a 429.

use async_trait::async_trait;

use super::{adapter, dto};
use crate::config::ProviderSettings;
use crate::enrichment::domain::{Candidate, ProviderError, ProviderId};
use crate::enrichment::http::ProviderHttp;
use crate::enrichment::traits::MusicProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.deezer.com";

/// Deezer API client
#[derive(Debug)]
pub struct DeezerClient {
    http: ProviderHttp,
    base_url: String,
}

impl DeezerClient {
    pub fn new(http: ProviderHttp) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Client from the `[providers.deezer]` config section
    pub fn from_settings(http: ProviderHttp, settings: &ProviderSettings) -> Self {
        match &settings.base_url {
            Some(base_url) => Self::with_base_url(http, base_url.trim_end_matches('/')),
            None => Self::new(http),
        }
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(http: ProviderHttp, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// GET /search/{kind}?q=...
    async fn search<T>(
        &self,
        kind: &str,
        query: &str,
    ) -> Result<Option<dto::SearchResponse<T>>, ProviderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/search/{}", self.base_url, kind);
        self.http
            .fetch_json(|client| client.get(&url).query(&[("q", query)]))
            .await
    }
}

#[async_trait]
impl MusicProvider for DeezerClient {
    fn id(&self) -> ProviderId {
        ProviderId::Deezer
    }

    async fn search_album(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("artist:\"{artist}\" album:\"{title}\"");
        Ok(self
            .search::<dto::Album>("album", &query)
            .await?
            .map(adapter::albums)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_album_by_title(&self, title: &str) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("album:\"{title}\"");
        Ok(self
            .search::<dto::Album>("album", &query)
            .await?
            .map(adapter::albums)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_track(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("artist:\"{artist}\" track:\"{title}\"");
        Ok(self
            .search::<dto::Track>("track", &query)
            .await?
            .map(adapter::tracks)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_artist(&self, artist: &str) -> Result<Vec<Candidate>, ProviderError> {
        Ok(self
            .search::<dto::Artist>("artist", artist)
            .await?
            .map(adapter::artists)
            .transpose()?
            .unwrap_or_default())
    }
}

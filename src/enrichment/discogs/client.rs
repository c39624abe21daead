//! Discogs HTTP client
//!
//! Database search requires a personal access token sent as
//! `Authorization: Discogs token=...`. Authenticated clients get 60 requests
//! per minute.
//!
//! Discogs has no track-level search, so the cascade goes straight from
//! releases to artists. The tracklist of the first matching release still
//! feeds the track searches of the other providers.

use async_trait::async_trait;
use reqwest::header;

use super::{adapter, dto};
use crate::config::ProviderSettings;
use crate::enrichment::domain::{Candidate, MatchType, ProviderError, ProviderId};
use crate::enrichment::http::ProviderHttp;
use crate::enrichment::traits::MusicProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";

const PER_PAGE: &str = "10";

/// Discogs API client
#[derive(Debug)]
pub struct DiscogsClient {
    http: ProviderHttp,
    base_url: String,
    token: Option<String>,
}

impl DiscogsClient {
    pub fn new(http: ProviderHttp, token: Option<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Client from the `[providers.discogs]` config section
    pub fn from_settings(
        http: ProviderHttp,
        token: Option<String>,
        settings: &ProviderSettings,
    ) -> Self {
        let client = Self::new(http, token);
        match &settings.base_url {
            Some(base_url) => client.with_base_url(base_url.trim_end_matches('/')),
            None => client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn authorization(&self) -> Result<String, ProviderError> {
        self.token
            .as_ref()
            .map(|token| format!("Discogs token={token}"))
            .ok_or_else(|| ProviderError::Auth("Discogs API token is not configured".to_string()))
    }

    /// GET /database/search with the given filters
    async fn search(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Option<dto::SearchResponse>, ProviderError> {
        let authorization = self.authorization()?;
        let url = format!("{}/database/search", self.base_url);

        self.http
            .fetch_json(|client| {
                client
                    .get(&url)
                    .query(params)
                    .query(&[("per_page", PER_PAGE)])
                    .header(header::AUTHORIZATION, authorization.as_str())
            })
            .await
    }
}

#[async_trait]
impl MusicProvider for DiscogsClient {
    fn id(&self) -> ProviderId {
        ProviderId::Discogs
    }

    fn supports(&self, match_type: MatchType) -> bool {
        match_type != MatchType::Track
    }

    async fn search_album(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let params = [("type", "release"), ("artist", artist), ("release_title", title)];
        Ok(self
            .search(&params)
            .await?
            .map(adapter::releases)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_track(
        &self,
        _artist: &str,
        _title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        Ok(vec![])
    }

    async fn search_artist(&self, artist: &str) -> Result<Vec<Candidate>, ProviderError> {
        let params = [("type", "artist"), ("q", artist)];
        Ok(self
            .search(&params)
            .await?
            .map(adapter::artists)
            .transpose()?
            .unwrap_or_default())
    }

    /// Release search, then GET /releases/{id} for the first release hit
    async fn tracklist(&self, artist: &str, album: &str) -> Result<Vec<String>, ProviderError> {
        let params = [("type", "release"), ("artist", artist), ("release_title", album)];
        let Some(response) = self.search(&params).await? else {
            return Ok(vec![]);
        };
        let Some(release_id) = adapter::first_release_id(response)? else {
            return Ok(vec![]);
        };

        let authorization = self.authorization()?;
        let url = format!("{}/releases/{release_id}", self.base_url);
        let release = self
            .http
            .fetch_json::<dto::Release, _>(|client| {
                client
                    .get(&url)
                    .header(header::AUTHORIZATION, authorization.as_str())
            })
            .await?;

        Ok(release.map(adapter::song_titles).unwrap_or_default())
    }

    /// GET /oauth/identity answers 401 for a bad token
    async fn verify(&self) -> Result<(), ProviderError> {
        let authorization = self.authorization()?;
        let url = format!("{}/oauth/identity", self.base_url);

        let identity = self
            .http
            .fetch_json::<dto::Identity, _>(|client| {
                client
                    .get(&url)
                    .header(header::AUTHORIZATION, authorization.as_str())
            })
            .await?;

        match identity {
            Some(identity) => {
                tracing::debug!(
                    provider = %ProviderId::Discogs,
                    user = %identity.username,
                    "Token accepted"
                );
                Ok(())
            }
            None => Err(ProviderError::Auth("Discogs rejected the API token".to_string())),
        }
    }
}

//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API/Search
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.
//! The User-Agent comes from the shared HTTP config; the limit from the
//! provider's rate limiter.

use async_trait::async_trait;

use super::{adapter, dto};
use crate::config::ProviderSettings;
use crate::enrichment::domain::{Candidate, MatchType, ProviderError, ProviderId};
use crate::enrichment::http::{ApiBody, ProviderHttp};
use crate::enrichment::traits::MusicProvider;

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

const SEARCH_LIMIT: u32 = 10;

/// MusicBrainz API client
#[derive(Debug)]
pub struct MusicBrainzClient {
    http: ProviderHttp,
    base_url: String,
}

impl MusicBrainzClient {
    /// Create a new client
    pub fn new(http: ProviderHttp) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Client from the `[providers.musicbrainz]` config section
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

    /// GET /{entity}?query=...&fmt=json&limit=10
    async fn search<T: ApiBody>(
        &self,
        entity: &str,
        lucene: &str,
    ) -> Result<Option<T>, ProviderError> {
        let url = format!(
            "{}/{}?query={}&fmt=json&limit={}",
            self.base_url,
            entity,
            urlencoding::encode(lucene),
            SEARCH_LIMIT
        );

        self.http.fetch_json(|client| client.get(&url)).await
    }
}

/// Quote a value as a Lucene phrase
fn phrase(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[async_trait]
impl MusicProvider for MusicBrainzClient {
    fn id(&self) -> ProviderId {
        ProviderId::MusicBrainz
    }

    fn supports(&self, match_type: MatchType) -> bool {
        match_type != MatchType::Track
    }

    async fn search_album(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let lucene = format!("release:{} AND artist:{}", phrase(title), phrase(artist));
        Ok(self
            .search::<dto::ReleaseSearchResponse>("release", &lucene)
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
        let lucene = format!("artist:{}", phrase(artist));
        Ok(self
            .search::<dto::ArtistSearchResponse>("artist", &lucene)
            .await?
            .map(adapter::artists)
            .transpose()?
            .unwrap_or_default())
    }

    /// Recording titles on releases matching the album
    async fn tracklist(&self, artist: &str, album: &str) -> Result<Vec<String>, ProviderError> {
        let lucene = format!("artist:{} AND release:{}", phrase(artist), phrase(album));
        Ok(self
            .search::<dto::RecordingSearchResponse>("recording", &lucene)
            .await?
            .map(adapter::song_titles)
            .transpose()?
            .unwrap_or_default())
    }
}

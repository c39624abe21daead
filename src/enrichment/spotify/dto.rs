//! Spotify Web API Data Transfer Objects
//!
//! These types match EXACTLY what the Spotify API returns.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api/reference/search

use serde::{Deserialize, Serialize};

use crate::enrichment::http::ApiBody;

/// Client-credentials token response from accounts.spotify.com
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    /// Lifetime in seconds (usually 3600)
    pub expires_in: u64,
}

impl ApiBody for TokenResponse {}

/// `/v1/search` response. Only the page for the requested `type` is present.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub albums: Option<Paging<Album>>,
    pub tracks: Option<Paging<Track>>,
    pub artists: Option<Paging<Artist>>,
}

impl ApiBody for SearchResponse {}

/// One page of results. Spotify occasionally returns `null` entries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
    pub total: Option<u32>,
}

/// Simplified album object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub album_type: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    /// "1997", "1997-05" or "1997-05-21"
    pub release_date: Option<String>,
}

/// Track object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: Option<TrackAlbum>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    /// 30 second MP3 sample, `null` for many tracks
    pub preview_url: Option<String>,
}

/// The album a track belongs to (only the fields we read)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackAlbum {
    pub id: Option<String>,
    pub name: String,
}

/// Full artist object as returned by artist search
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Artist reference embedded in albums and tracks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Error body, e.g. `{"error": {"status": 401, "message": "The access token expired"}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

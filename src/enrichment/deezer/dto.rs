//! Deezer API Data Transfer Objects
//!
//! These types match EXACTLY what the Deezer API returns.
//! DO NOT use these types outside the deezer module - convert to domain types.
//!
//! API Reference: https://developers.deezer.com/api/search
//!
//! Deezer answers errors (including quota exhaustion) with HTTP 200 and an
//! `error` object instead of `data`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::enrichment::http::ApiBody;

/// Error code Deezer uses for "Quota limit exceeded"
pub const QUOTA_EXCEEDED: u32 = 4;

/// Envelope for every `/search/*` endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse<T> {
    pub data: Option<Vec<T>>,
    pub total: Option<u32>,
    pub error: Option<ApiError>,
}

impl<T: DeserializeOwned> ApiBody for SearchResponse<T> {
    fn is_throttled(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|e| e.code == Some(QUOTA_EXCEEDED))
    }
}

/// In-body error object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: Option<String>,
    pub code: Option<u32>,
}

/// Album object from `/search/album`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: u64,
    pub title: String,
    pub link: Option<String>,
    pub artist: Option<ArtistRef>,
    pub record_type: Option<String>,
    /// Only present on some responses ("2001-03-07")
    pub release_date: Option<String>,
}

/// Track object from `/search/track`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub link: Option<String>,
    /// 30 second MP3 sample, empty string when unavailable
    pub preview: Option<String>,
    pub artist: Option<ArtistRef>,
    pub album: Option<AlbumRef>,
}

/// Artist object from `/search/artist`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: u64,
    pub name: String,
    pub link: Option<String>,
}

/// Artist embedded in albums and tracks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    pub id: Option<u64>,
    pub name: String,
}

/// Album embedded in tracks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumRef {
    pub id: Option<u64>,
    pub title: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

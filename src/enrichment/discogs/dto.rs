//! Discogs API Data Transfer Objects
//!
//! These types match EXACTLY what the Discogs API returns.
//! DO NOT use these types outside the discogs module - convert to domain types.
//!
//! API Reference: https://www.discogs.com/developers#page:database,header:database-search

use serde::{Deserialize, Serialize};

use crate::enrichment::http::ApiBody;

/// `/database/search` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub pagination: Option<Pagination>,
    pub results: Option<Vec<SearchResult>>,
}

impl ApiBody for SearchResponse {}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub items: u32,
}

/// One search hit. Releases and masters are titled "Artist - Title";
/// artists are titled with the artist name alone.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: u64,
    #[serde(rename = "type")]
    pub result_type: String,
    pub title: String,
    /// Site-relative path, e.g. "/release/1234-Daft-Punk-Discovery"
    pub uri: Option<String>,
    pub resource_url: Option<String>,
    pub year: Option<String>,
    pub master_id: Option<u64>,
}

/// `/releases/{id}` response, trimmed to what the tracklist needs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub tracklist: Vec<TrackEntry>,
}

impl ApiBody for Release {}

/// Tracklist row. Besides tracks, Discogs lists side and disc headings
/// ("heading") and index tracks ("index") here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackEntry {
    pub position: Option<String>,
    #[serde(rename = "type_")]
    pub entry_type: Option<String>,
    pub title: String,
    pub duration: Option<String>,
}

/// `/oauth/identity` response, used to check the token
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    pub resource_url: Option<String>,
}

impl ApiBody for Identity {}

/// Error body, e.g. `{"message": "You must authenticate to access this resource."}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

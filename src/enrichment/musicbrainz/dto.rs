//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to domain types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API/Search
//!
//! We use the /release, /artist and /recording search endpoints with Lucene
//! queries. Recordings only feed the album's tracklist.

use serde::{Deserialize, Serialize};

use crate::enrichment::http::ApiBody;

/// Release search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseSearchResponse {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    pub releases: Option<Vec<Release>>,
}

impl ApiBody for ReleaseSearchResponse {}

/// Artist search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    pub artists: Option<Vec<Artist>>,
}

impl ApiBody for ArtistSearchResponse {}

/// Recording search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingSearchResponse {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    pub recordings: Option<Vec<Recording>>,
}

impl ApiBody for RecordingSearchResponse {}

/// Recording (a song as it appears on releases)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    /// Track title
    pub title: String,
    /// Duration in milliseconds
    pub length: Option<u64>,
    /// Search relevance 0-100
    pub score: Option<u32>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// The artist
    pub artist: Artist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
    /// Artist type (Person, Group, etc.)
    #[serde(rename = "type")]
    pub artist_type: Option<String>,
    /// Search relevance 0-100 (search results only)
    pub score: Option<u32>,
    /// Disambiguation comment ("French electronic duo")
    pub disambiguation: Option<String>,
}

/// Release (album/single/EP)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Search relevance 0-100
    pub score: Option<u32>,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Country code
    pub country: Option<String>,
    /// Artist credits for the release
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Release group (groups same album across editions)
    pub release_group: Option<ReleaseGroup>,
}

/// Release group (e.g., "Abbey Road" across all editions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    /// MusicBrainz release group ID
    pub id: String,
    /// Title (omitted in some search results)
    pub title: Option<String>,
    /// Primary type (Album, Single, EP, etc.)
    pub primary_type: Option<String>,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

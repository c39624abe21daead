//! Record model and result merging.
//!
//! Input records are JSON objects with at least `artist` and `album`. Any
//! other fields pass through untouched; the five output fields are written
//! next to them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{EnrichmentRequest, MatchType, ProviderId, ProviderResult};

/// Output keys written on every enriched record
pub const OUTPUT_FIELDS: [&str; 5] = [
    "spotify_link",
    "deezer_link",
    "discogs_link",
    "musicbrainz_link",
    "preview_url",
];

/// One catalog entry as read from the input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub artist: String,
    pub album: String,
    /// Everything else in the object, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlbumRecord {
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            extra: Map::new(),
        }
    }

    pub fn request(&self) -> EnrichmentRequest {
        EnrichmentRequest::new(self.artist.clone(), self.album.clone())
    }
}

/// Input record plus one link per provider and at most one preview.
///
/// Missing values serialize as `null` so every output object carries all
/// five keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: AlbumRecord,
    pub spotify_link: Option<String>,
    pub deezer_link: Option<String>,
    pub discogs_link: Option<String>,
    pub musicbrainz_link: Option<String>,
    pub preview_url: Option<String>,
}

impl EnrichedRecord {
    pub fn link(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::Spotify => self.spotify_link.as_deref(),
            ProviderId::Deezer => self.deezer_link.as_deref(),
            ProviderId::Discogs => self.discogs_link.as_deref(),
            ProviderId::MusicBrainz => self.musicbrainz_link.as_deref(),
        }
    }

    /// Number of providers that produced a link
    pub fn links_found(&self) -> usize {
        ProviderId::ALL
            .iter()
            .filter(|p| self.link(**p).is_some())
            .count()
    }
}

/// Fold provider results into the record.
///
/// `results` must be in priority order; the first track-level match that
/// carries a preview supplies `preview_url`. Output keys already present in
/// the input (from an earlier run) are replaced, never duplicated.
pub fn merge(mut record: AlbumRecord, results: &[ProviderResult]) -> EnrichedRecord {
    for field in OUTPUT_FIELDS {
        record.extra.remove(field);
    }

    let link_for = |provider: ProviderId| {
        results
            .iter()
            .find(|r| r.provider == provider)
            .and_then(|r| r.link.clone())
    };

    let preview_url = results
        .iter()
        .filter(|r| r.match_type == Some(MatchType::Track))
        .find_map(|r| r.preview_url.clone());

    EnrichedRecord {
        spotify_link: link_for(ProviderId::Spotify),
        deezer_link: link_for(ProviderId::Deezer),
        discogs_link: link_for(ProviderId::Discogs),
        musicbrainz_link: link_for(ProviderId::MusicBrainz),
        preview_url,
        record,
    }
}

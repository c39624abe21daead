//! Internal domain models for link resolution.
//!
//! These types are OUR types - they don't change when provider APIs change.
//! Every provider response gets converted into a [`Candidate`] by that
//! provider's adapter before anything else looks at it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// External music-metadata service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Spotify,
    Deezer,
    Discogs,
    MusicBrainz,
}

impl ProviderId {
    /// Default priority order used when merging results
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Spotify,
        ProviderId::Deezer,
        ProviderId::Discogs,
        ProviderId::MusicBrainz,
    ];

    /// Lowercase name used in config keys and output field prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Spotify => "spotify",
            ProviderId::Deezer => "deezer",
            ProviderId::Discogs => "discogs",
            ProviderId::MusicBrainz => "musicbrainz",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level at which a candidate matched the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Album,
    Track,
    Artist,
}

impl MatchType {
    /// Cascade order: album first, then track, then artist
    pub const CASCADE: [MatchType; 3] = [MatchType::Album, MatchType::Track, MatchType::Artist];
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchType::Album => "album",
            MatchType::Track => "track",
            MatchType::Artist => "artist",
        };
        f.write_str(s)
    }
}

/// One artist/album pair to resolve.
///
/// Constructed from an input record and discarded after merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub artist: String,
    pub album: String,
    /// Song titles from the album's tracklist, searched at the track level
    pub songs: Vec<String>,
}

impl EnrichmentRequest {
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            songs: Vec::new(),
        }
    }

    pub fn with_songs(mut self, songs: Vec<String>) -> Self {
        self.songs = songs;
        self
    }

    /// Titles to search at the track level.
    ///
    /// Without a known tracklist the album title itself is tried, which
    /// finds title tracks.
    pub fn track_titles(&self) -> Vec<&str> {
        if self.songs.is_empty() {
            vec![self.album.as_str()]
        } else {
            self.songs.iter().map(String::as_str).collect()
        }
    }

    /// Artist with trailing uncertainty markers removed.
    ///
    /// Catalog entries like `"Some Band? (maybe)"` are cut at the first `?`.
    pub fn clean_artist(&self) -> &str {
        self.artist.split('?').next().unwrap_or_default().trim()
    }

    /// Artist names to query with, in order.
    ///
    /// The full cleaned artist comes first, followed by each credited artist
    /// when the string joins several with `&`.
    pub fn artist_variants(&self) -> Vec<String> {
        let full = self.clean_artist();
        let mut variants = vec![full.to_string()];

        if full.contains('&') {
            for part in full.split('&').map(str::trim).filter(|p| !p.is_empty()) {
                if !variants.iter().any(|v| v == part) {
                    variants.push(part.to_string());
                }
            }
        }

        variants
    }
}

/// A raw search hit from one provider, before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub provider: ProviderId,
    pub match_type: MatchType,
    /// Album or track title. For artist hits this is the artist name.
    pub title: String,
    pub artist_name: String,
    /// Canonical link on the provider's site (never empty)
    pub url: String,
    /// 30 second audio sample, only ever set on track hits
    pub preview_url: Option<String>,
}

/// A candidate with its confidence against the request
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

/// Result of one cascade step.
///
/// "Nothing matched" and "the provider failed" are different outcomes and
/// callers branch on the tag instead of inspecting errors.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(ScoredCandidate),
    NotFound,
    Failed(ProviderError),
}

/// Final outcome of the cascade for one provider against one request.
///
/// `link == None` means "not found", which is a valid terminal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: ProviderId,
    pub link: Option<String>,
    pub preview_url: Option<String>,
    pub match_type: Option<MatchType>,
    pub confidence: Option<f64>,
}

impl ProviderResult {
    pub fn not_found(provider: ProviderId) -> Self {
        Self {
            provider,
            link: None,
            preview_url: None,
            match_type: None,
            confidence: None,
        }
    }

    /// Build a result from an accepted candidate.
    ///
    /// Previews are only carried over from track matches.
    pub fn from_match(scored: ScoredCandidate) -> Self {
        let ScoredCandidate {
            candidate,
            confidence,
        } = scored;
        let preview_url = match candidate.match_type {
            MatchType::Track => candidate.preview_url,
            MatchType::Album | MatchType::Artist => None,
        };

        Self {
            provider: candidate.provider,
            link: Some(candidate.url),
            preview_url,
            match_type: Some(candidate.match_type),
            confidence: Some(confidence),
        }
    }

    pub fn is_found(&self) -> bool {
        self.link.is_some()
    }
}

/// Errors a provider can report
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Credentials rejected and a refresh did not help
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// HTTP 429 (or a provider-specific quota signal)
    #[error("Rate limited - try again later")]
    RateLimited,

    /// Network failure, timeout, 5xx, or retry budget exhausted
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Whether the retry policy should try again
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::Unavailable(_))
    }
}

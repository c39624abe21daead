//! Test utilities and fixtures for album-links tests.
//!
//! Shared candidates, requests, and HTTP executors so provider and engine
//! tests don't each rebuild the same boilerplate.
//!
//! # Example
//!
//! ```ignore
//! use album_links::test_utils::{candidate, request};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let hit = candidate(ProviderId::Deezer, MatchType::Album, "Discovery", "Daft Punk");
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::enrichment::domain::{Candidate, EnrichmentRequest, MatchType, ProviderId};
use crate::enrichment::http::ProviderHttp;
use crate::enrichment::merge::AlbumRecord;
use crate::enrichment::ratelimit::{RateLimiter, RetryPolicy};

/// Creates a candidate with a link derived from its fields.
///
/// ```ignore
/// let hit = candidate(ProviderId::Spotify, MatchType::Album, "Discovery", "Daft Punk");
/// assert_eq!(hit.url, "https://spotify.example/album/discovery");
/// ```
pub fn candidate(
    provider: ProviderId,
    match_type: MatchType,
    title: &str,
    artist: &str,
) -> Candidate {
    let slug = title.to_lowercase().replace(' ', "-");
    Candidate {
        provider,
        match_type,
        title: title.to_string(),
        artist_name: artist.to_string(),
        url: format!("https://{provider}.example/{match_type}/{slug}"),
        preview_url: None,
    }
}

/// Creates a track candidate carrying a preview URL.
pub fn track_candidate(
    provider: ProviderId,
    title: &str,
    artist: &str,
    preview: &str,
) -> Candidate {
    Candidate {
        preview_url: Some(preview.to_string()),
        ..candidate(provider, MatchType::Track, title, artist)
    }
}

/// The request most tests resolve.
pub fn request() -> EnrichmentRequest {
    EnrichmentRequest::new("Daft Punk", "Discovery")
}

/// An input record with no extra fields.
pub fn album_record(artist: &str, album: &str) -> AlbumRecord {
    AlbumRecord::new(artist, album)
}

/// Fast retry policy so failure tests finish in milliseconds.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        multiplier: 2.0,
        max_delay: Duration::from_millis(20),
    }
}

/// HTTP executor with a generous limiter and fast retries.
pub fn test_http(provider: ProviderId) -> ProviderHttp {
    ProviderHttp::new(
        provider,
        reqwest::Client::new(),
        Arc::new(RateLimiter::new(1000, Duration::from_secs(1))),
        fast_retry(),
    )
}

/// Config with every provider pointed at `base_url` (a wiremock server).
///
/// Rate limits are lifted and retries shortened; credentials are filled in.
pub fn mock_server_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.credentials.spotify_client_id = Some("client-id".to_string());
    config.credentials.spotify_client_secret = Some("client-secret".to_string());
    config.credentials.discogs_api_token = Some("discogs-token".to_string());

    config.retry.max_attempts = 2;
    config.retry.base_delay_ms = 5;
    config.retry.max_delay_ms = 20;

    config.providers.spotify.token_url = Some(format!("{base_url}/api/token"));
    config.providers.spotify.common.base_url = Some(format!("{base_url}/v1"));
    config.providers.deezer.base_url = Some(format!("{base_url}/deezer"));
    config.providers.discogs.base_url = Some(format!("{base_url}/discogs"));
    config.providers.musicbrainz.base_url = Some(format!("{base_url}/ws/2"));

    for settings in [
        &mut config.providers.spotify.common,
        &mut config.providers.deezer,
        &mut config.providers.discogs,
        &mut config.providers.musicbrainz,
    ] {
        settings.requests = 1000;
        settings.per_secs = 1;
    }

    config
}

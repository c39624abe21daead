//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where Spotify DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{Candidate, MatchType, ProviderError, ProviderId};

/// Album hits from an album search
pub fn albums(response: dto::SearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    let page = response
        .albums
        .ok_or_else(|| missing_page("albums"))?;

    Ok(page
        .items
        .into_iter()
        .flatten()
        .filter_map(|album| {
            Some(Candidate {
                provider: ProviderId::Spotify,
                match_type: MatchType::Album,
                url: link(album.external_urls)?,
                artist_name: primary_artist(&album.artists),
                title: album.name,
                preview_url: None,
            })
        })
        .collect())
}

/// Track hits from a track search.
///
/// The candidate title is the track's album name: a track hit is evidence
/// for the album being resolved, not for the song itself.
pub fn tracks(response: dto::SearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    let page = response
        .tracks
        .ok_or_else(|| missing_page("tracks"))?;

    Ok(page
        .items
        .into_iter()
        .flatten()
        .filter_map(|track| {
            let title = track.album.map(|a| a.name).unwrap_or(track.name);
            Some(Candidate {
                provider: ProviderId::Spotify,
                match_type: MatchType::Track,
                url: link(track.external_urls)?,
                artist_name: primary_artist(&track.artists),
                title,
                preview_url: track.preview_url.filter(|p| !p.is_empty()),
            })
        })
        .collect())
}

/// Artist hits from an artist search
pub fn artists(response: dto::SearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    let page = response
        .artists
        .ok_or_else(|| missing_page("artists"))?;

    Ok(page
        .items
        .into_iter()
        .flatten()
        .filter_map(|artist| {
            Some(Candidate {
                provider: ProviderId::Spotify,
                match_type: MatchType::Artist,
                url: link(artist.external_urls)?,
                title: artist.name.clone(),
                artist_name: artist.name,
                preview_url: None,
            })
        })
        .collect())
}

/// First credited artist, which is how Spotify orders the main artist
fn primary_artist(artists: &[dto::SimpleArtist]) -> String {
    artists.first().map(|a| a.name.clone()).unwrap_or_default()
}

fn link(urls: dto::ExternalUrls) -> Option<String> {
    urls.spotify.filter(|u| !u.is_empty())
}

fn missing_page(kind: &str) -> ProviderError {
    ProviderError::Malformed(format!("Spotify search response has no '{kind}' page"))
}

//! Adapter layer: Convert Deezer DTOs to domain models
//!
//! This is the ONLY place where Deezer DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{Candidate, MatchType, ProviderError, ProviderId};

/// Album hits, newest release first.
///
/// The sort is stable, so albums with the same (or no) release date keep
/// Deezer's ranking.
pub fn albums(response: dto::SearchResponse<dto::Album>) -> Result<Vec<Candidate>, ProviderError> {
    let mut albums = data(response)?;
    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));

    Ok(albums
        .into_iter()
        .filter_map(|album| {
            Some(Candidate {
                provider: ProviderId::Deezer,
                match_type: MatchType::Album,
                url: non_empty(album.link)?,
                artist_name: album.artist.map(|a| a.name).unwrap_or_default(),
                title: album.title,
                preview_url: None,
            })
        })
        .collect())
}

/// Track hits. The candidate title is the album the track appears on.
pub fn tracks(response: dto::SearchResponse<dto::Track>) -> Result<Vec<Candidate>, ProviderError> {
    Ok(data(response)?
        .into_iter()
        .filter_map(|track| {
            Some(Candidate {
                provider: ProviderId::Deezer,
                match_type: MatchType::Track,
                url: non_empty(track.link)?,
                artist_name: track.artist.map(|a| a.name).unwrap_or_default(),
                title: track.album.map(|a| a.title).unwrap_or(track.title),
                preview_url: non_empty(track.preview),
            })
        })
        .collect())
}

/// Artist hits
pub fn artists(
    response: dto::SearchResponse<dto::Artist>,
) -> Result<Vec<Candidate>, ProviderError> {
    Ok(data(response)?
        .into_iter()
        .filter_map(|artist| {
            Some(Candidate {
                provider: ProviderId::Deezer,
                match_type: MatchType::Artist,
                url: non_empty(artist.link)?,
                title: artist.name.clone(),
                artist_name: artist.name,
                preview_url: None,
            })
        })
        .collect())
}

/// Unwrap the envelope. A non-quota error object means "no results".
fn data<T>(response: dto::SearchResponse<T>) -> Result<Vec<T>, ProviderError> {
    if let Some(error) = response.error {
        tracing::debug!(
            provider = %ProviderId::Deezer,
            code = ?error.code,
            "Search error treated as no results: {}",
            error.message.as_deref().unwrap_or("unknown")
        );
        return Ok(vec![]);
    }

    response.data.ok_or_else(|| {
        ProviderError::Malformed("Deezer response has neither data nor error".to_string())
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//! Adapter layer: Convert Discogs DTOs to domain models
//!
//! This is the ONLY place where Discogs DTO types are converted to domain types.

use std::sync::LazyLock;

use regex::Regex;

use super::dto;
use crate::enrichment::domain::{Candidate, MatchType, ProviderError, ProviderId};

const SITE_URL: &str = "https://www.discogs.com";

/// Discogs disambiguates same-named artists with a numeric suffix: "Nirvana (2)"
static NAME_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+\(\d+\)$").expect("artist index pattern is valid")
});

/// Release hits, split into artist and album
pub fn releases(response: dto::SearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    Ok(results(response)?
        .into_iter()
        .filter(|r| r.result_type == "release" || r.result_type == "master")
        .filter_map(|result| {
            let (artist, title) = split_title(&result.title);
            Some(Candidate {
                provider: ProviderId::Discogs,
                match_type: MatchType::Album,
                url: site_link(result.uri.as_deref())?,
                title,
                artist_name: artist,
                preview_url: None,
            })
        })
        .collect())
}

/// Artist hits
pub fn artists(response: dto::SearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    Ok(results(response)?
        .into_iter()
        .filter(|r| r.result_type == "artist")
        .filter_map(|result| {
            let name = strip_index(&result.title);
            Some(Candidate {
                provider: ProviderId::Discogs,
                match_type: MatchType::Artist,
                url: site_link(result.uri.as_deref())?,
                title: name.clone(),
                artist_name: name,
                preview_url: None,
            })
        })
        .collect())
}

/// Id of the first release hit, whose tracklist stands in for the album's
pub fn first_release_id(response: dto::SearchResponse) -> Result<Option<u64>, ProviderError> {
    Ok(results(response)?
        .into_iter()
        .find(|r| r.result_type == "release")
        .map(|r| r.id))
}

/// Track titles of a release, without headings
pub fn song_titles(release: dto::Release) -> Vec<String> {
    release
        .tracklist
        .into_iter()
        .filter(|entry| entry.entry_type.as_deref().is_none_or(|t| t == "track"))
        .map(|entry| entry.title)
        .filter(|title| !title.trim().is_empty())
        .collect()
}

fn results(response: dto::SearchResponse) -> Result<Vec<dto::SearchResult>, ProviderError> {
    response.results.ok_or_else(|| {
        ProviderError::Malformed("Discogs search response has no 'results'".to_string())
    })
}

/// Split "Artist - Album" at the first separator.
///
/// Titles without a separator are treated as album-only.
fn split_title(title: &str) -> (String, String) {
    match title.split_once(" - ") {
        Some((artist, album)) => (strip_index(artist), album.trim().to_string()),
        None => (String::new(), title.trim().to_string()),
    }
}

fn strip_index(name: &str) -> String {
    NAME_INDEX.replace(name.trim(), "").into_owned()
}

/// Absolute link on discogs.com for a site-relative `uri`
fn site_link(uri: Option<&str>) -> Option<String> {
    let uri = uri?.trim();
    if uri.is_empty() {
        return None;
    }
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Some(uri.to_string());
    }
    Some(format!("{SITE_URL}/{}", uri.trim_start_matches('/')))
}

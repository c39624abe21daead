//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::enrichment::domain::{Candidate, MatchType, ProviderError, ProviderId};

const SITE_URL: &str = "https://musicbrainz.org";

/// Convert a release search into album candidates
pub fn releases(response: dto::ReleaseSearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    let releases = response
        .releases
        .ok_or_else(|| missing("releases"))?;

    Ok(releases
        .into_iter()
        .filter(|release| !release.id.is_empty())
        .map(|release| Candidate {
            provider: ProviderId::MusicBrainz,
            match_type: MatchType::Album,
            url: format!("{SITE_URL}/release/{}", release.id),
            artist_name: build_artist_string(&release.artist_credit).unwrap_or_default(),
            title: release.title,
            preview_url: None,
        })
        .collect())
}

/// Convert an artist search into artist candidates
pub fn artists(response: dto::ArtistSearchResponse) -> Result<Vec<Candidate>, ProviderError> {
    let artists = response
        .artists
        .ok_or_else(|| missing("artists"))?;

    Ok(artists
        .into_iter()
        .filter(|artist| !artist.id.is_empty())
        .map(|artist| Candidate {
            provider: ProviderId::MusicBrainz,
            match_type: MatchType::Artist,
            url: format!("{SITE_URL}/artist/{}", artist.id),
            title: artist.name.clone(),
            artist_name: artist.name,
            preview_url: None,
        })
        .collect())
}

/// Song titles from a recording search, in result order
pub fn song_titles(response: dto::RecordingSearchResponse) -> Result<Vec<String>, ProviderError> {
    let recordings = response
        .recordings
        .ok_or_else(|| missing("recordings"))?;

    Ok(recordings
        .into_iter()
        .map(|recording| recording.title)
        .filter(|title| !title.trim().is_empty())
        .collect())
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        // Add join phrase if present (e.g., " & ", " feat. ")
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

fn missing(field: &str) -> ProviderError {
    ProviderError::Malformed(format!("MusicBrainz search response has no '{field}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_artist(name: &str) -> dto::Artist {
        dto::Artist {
            id: format!("{}-id", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            sort_name: None,
            artist_type: None,
            score: None,
            disambiguation: None,
        }
    }

    fn make_artist_credit(name: &str, join: Option<&str>) -> dto::ArtistCredit {
        dto::ArtistCredit {
            artist: make_artist(name),
            name: Some(name.to_string()),
            joinphrase: join.map(String::from),
        }
    }

    fn make_release(id: &str, title: &str, credits: Vec<dto::ArtistCredit>) -> dto::Release {
        dto::Release {
            id: id.to_string(),
            title: title.to_string(),
            score: Some(100),
            status: Some("Official".to_string()),
            date: None,
            country: None,
            artist_credit: credits,
            release_group: None,
        }
    }

    #[test]
    fn test_build_single_artist() {
        let credits = vec![make_artist_credit("Queen", None)];

        let artist = build_artist_string(&credits);

        assert_eq!(artist, Some("Queen".to_string()));
    }

    #[test]
    fn test_build_collaboration_artist() {
        let credits = vec![
            make_artist_credit("Queen", Some(" & ")),
            make_artist_credit("David Bowie", None),
        ];

        let artist = build_artist_string(&credits);

        assert_eq!(artist, Some("Queen & David Bowie".to_string()));
    }

    #[test]
    fn test_credited_name_wins_over_official_name() {
        let mut credit = make_artist_credit("Prince", None);
        credit.name = Some("The Artist".to_string());

        assert_eq!(build_artist_string(&[credit]), Some("The Artist".to_string()));
    }

    #[test]
    fn test_release_links() {
        let response = dto::ReleaseSearchResponse {
            count: Some(1),
            offset: Some(0),
            releases: Some(vec![make_release(
                "48117b82",
                "Discovery",
                vec![make_artist_credit("Daft Punk", None)],
            )]),
        };

        let candidates = releases(response).unwrap();

        assert_eq!(candidates[0].url, "https://musicbrainz.org/release/48117b82");
        assert_eq!(candidates[0].artist_name, "Daft Punk");
        assert_eq!(candidates[0].match_type, MatchType::Album);
    }

    #[test]
    fn test_artist_links() {
        let response = dto::ArtistSearchResponse {
            count: Some(1),
            offset: Some(0),
            artists: Some(vec![make_artist("Daft Punk")]),
        };

        let candidates = artists(response).unwrap();

        assert_eq!(candidates[0].url, "https://musicbrainz.org/artist/daft-punk-id");
        assert_eq!(candidates[0].title, "Daft Punk");
    }

    #[test]
    fn test_song_titles_skip_blank() {
        let recording = |title: &str| dto::Recording {
            id: format!("{title}-id"),
            title: title.to_string(),
            length: None,
            score: None,
        };
        let response = dto::RecordingSearchResponse {
            count: Some(3),
            offset: Some(0),
            recordings: Some(vec![
                recording("One More Time"),
                recording(" "),
                recording("Digital Love"),
            ]),
        };

        assert_eq!(song_titles(response).unwrap(), vec!["One More Time", "Digital Love"]);
    }

    #[test]
    fn test_missing_list_is_malformed() {
        let response = dto::ArtistSearchResponse {
            count: None,
            offset: None,
            artists: None,
        };
        assert!(matches!(artists(response), Err(ProviderError::Malformed(_))));
    }
}

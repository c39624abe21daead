//! Album → track → artist fallback per provider.
//!
//! ```text
//! SEARCH_ALBUM --accepted--> DONE(album)
//!      | no match (artist-qualified, then title only)
//!      v
//! SEARCH_TRACK --accepted--> DONE(track, with preview)
//!      | no match (every tracklist song)
//!      v
//! SEARCH_ARTIST --accepted--> DONE(artist)
//!      | no match
//!      v
//! DONE(not found)
//! ```
//!
//! A provider failure in any state jumps straight to DONE with the failure
//! attached; the caller turns that into a "not found" result.

use super::domain::{EnrichmentRequest, MatchType, ProviderResult, SearchOutcome};
use super::matcher::FuzzyMatcher;
use super::traits::MusicProvider;

/// Cascade position
#[derive(Debug)]
enum CascadeState {
    Search(MatchType),
    Done(SearchOutcome),
}

/// One search issued inside a cascade state
#[derive(Debug, Clone, PartialEq)]
enum Query {
    Album { artist: String },
    AlbumTitle,
    Track { artist: String, song: String },
    Artist { artist: String },
}

/// Searches for one cascade state, in the order they are tried.
///
/// Album: each artist variant, then the title alone. Track: each song, each
/// artist variant per song. Artist: each artist variant.
fn queries(request: &EnrichmentRequest, level: MatchType) -> Vec<Query> {
    let artists = request.artist_variants();
    match level {
        MatchType::Album => artists
            .into_iter()
            .map(|artist| Query::Album { artist })
            .chain(std::iter::once(Query::AlbumTitle))
            .collect(),
        MatchType::Track => request
            .track_titles()
            .into_iter()
            .flat_map(|song| {
                artists.iter().map(move |artist| Query::Track {
                    artist: artist.clone(),
                    song: song.to_string(),
                })
            })
            .collect(),
        MatchType::Artist => artists
            .into_iter()
            .map(|artist| Query::Artist { artist })
            .collect(),
    }
}

/// Runs the fallback cascade for one provider at a time
#[derive(Debug, Clone, Default)]
pub struct FallbackOrchestrator {
    matcher: FuzzyMatcher,
}

impl FallbackOrchestrator {
    pub fn new(matcher: FuzzyMatcher) -> Self {
        Self { matcher }
    }

    /// Run the cascade and report the tagged outcome
    pub async fn resolve(
        &self,
        provider: &dyn MusicProvider,
        request: &EnrichmentRequest,
    ) -> SearchOutcome {
        let mut state = CascadeState::Search(MatchType::CASCADE[0]);

        loop {
            state = match state {
                CascadeState::Search(level) => match self.step(provider, request, level).await {
                    SearchOutcome::NotFound => match next_level(level) {
                        Some(next) => CascadeState::Search(next),
                        None => CascadeState::Done(SearchOutcome::NotFound),
                    },
                    terminal => CascadeState::Done(terminal),
                },
                CascadeState::Done(outcome) => return outcome,
            };
        }
    }

    /// Run the cascade and collapse the outcome into a provider result
    pub async fn resolve_result(
        &self,
        provider: &dyn MusicProvider,
        request: &EnrichmentRequest,
    ) -> ProviderResult {
        match self.resolve(provider, request).await {
            SearchOutcome::Found(scored) => ProviderResult::from_match(scored),
            SearchOutcome::NotFound | SearchOutcome::Failed(_) => {
                ProviderResult::not_found(provider.id())
            }
        }
    }

    /// One cascade state: run its queries until something clears the
    /// threshold
    async fn step(
        &self,
        provider: &dyn MusicProvider,
        request: &EnrichmentRequest,
        level: MatchType,
    ) -> SearchOutcome {
        if !provider.supports(level) {
            return SearchOutcome::NotFound;
        }

        for query in queries(request, level) {
            let searched = match &query {
                Query::Album { artist } => provider.search_album(artist, &request.album).await,
                Query::AlbumTitle => provider.search_album_by_title(&request.album).await,
                Query::Track { artist, song } => provider.search_track(artist, song).await,
                Query::Artist { artist } => provider.search_artist(artist).await,
            };

            let candidates = match searched {
                Ok(candidates) => candidates,
                Err(e) => return SearchOutcome::Failed(e),
            };

            if let Some(scored) = self.matcher.accept(request, level, candidates) {
                return SearchOutcome::Found(scored);
            }
        }

        SearchOutcome::NotFound
    }
}

fn next_level(level: MatchType) -> Option<MatchType> {
    MatchType::CASCADE
        .iter()
        .skip_while(|l| **l != level)
        .nth(1)
        .copied()
}

//! Trait definitions for provider clients.
//!
//! The cascade and the service only see `dyn MusicProvider`, so tests can
//! substitute the scripted mocks below for the real HTTP clients.
//!
//! # Example
//!
//! ```ignore
//! use album_links::enrichment::traits::MusicProvider;
//!
//! async fn first_album<P: MusicProvider>(provider: &P) -> Option<Candidate> {
//!     provider.search_album("Daft Punk", "Discovery").await.ok()?.into_iter().next()
//! }
//! ```

use async_trait::async_trait;

use super::domain::{Candidate, MatchType, ProviderError, ProviderId};

/// One music-metadata provider.
///
/// Every search returns the provider's hits already normalized into
/// [`Candidate`]s. A clean "no results" answer is `Ok(vec![])`, never an error.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Which provider this is
    fn id(&self) -> ProviderId;

    /// Whether this provider can search at the given level.
    ///
    /// The cascade skips unsupported levels without issuing a request.
    fn supports(&self, _match_type: MatchType) -> bool {
        true
    }

    /// Search albums by artist and title
    async fn search_album(&self, artist: &str, title: &str)
    -> Result<Vec<Candidate>, ProviderError>;

    /// Search albums by title alone.
    ///
    /// Tried once after every artist-qualified album search missed, for
    /// albums the provider files under a different artist spelling.
    /// Providers without such a search find nothing.
    async fn search_album_by_title(&self, _title: &str) -> Result<Vec<Candidate>, ProviderError> {
        Ok(vec![])
    }

    /// Search tracks by artist and song title
    async fn search_track(&self, artist: &str, title: &str)
    -> Result<Vec<Candidate>, ProviderError>;

    /// Search artists by name
    async fn search_artist(&self, artist: &str) -> Result<Vec<Candidate>, ProviderError>;

    /// Song titles on the given album, used to drive the track-level
    /// search on every provider.
    async fn tracklist(&self, _artist: &str, _album: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![])
    }

    /// Check credentials before the run starts.
    ///
    /// Providers without credentials have nothing to check.
    async fn verify(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

//! Link enrichment - finds each album on Spotify, Deezer, Discogs and MusicBrainz.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`spotify/dto.rs`, `deezer/dto.rs`, ...) - Exact API response shapes
//! - **Adapters** - Convert DTOs to [`Candidate`]s
//! - **Clients** - HTTP clients for external APIs, behind [`MusicProvider`]
//! - **Matcher** - Normalization and fuzzy scoring of candidates
//! - **Cascade** - Album → track → artist fallback per provider
//! - **Service** - High-level orchestration of a batch run
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. We can swap providers without changing business logic
//!
//! # Usage
//!
//! ```ignore
//! use album_links::enrichment::{AlbumRecord, EnrichmentService, TracingSink};
//!
//! let config = album_links::config::load();
//! let service = EnrichmentService::from_config(&config, Arc::new(TracingSink))?;
//! service.verify().await?;
//!
//! let enriched = service.enrich(AlbumRecord::new("Daft Punk", "Discovery")).await;
//! println!("Spotify: {:?}", enriched.spotify_link);
//! ```

pub mod cascade;
pub mod deezer;
pub mod discogs;
pub mod domain;
pub mod events;
pub mod http;
pub mod matcher;
pub mod merge;
pub mod musicbrainz;
pub mod ratelimit;
pub mod service;
pub mod spotify;
pub mod traits;

pub use domain::{
    Candidate, EnrichmentRequest, MatchType, ProviderError, ProviderId, ProviderResult,
    SearchOutcome,
};
pub use events::{CollectingSink, EnrichmentEvent, EventSink, TracingSink};
pub use merge::{AlbumRecord, EnrichedRecord};
pub use service::EnrichmentService;
pub use traits::MusicProvider;

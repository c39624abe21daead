//! Enrichment service - resolves album records against every provider
//!
//! This is the high-level API for enriching records:
//! 1. Check credentials once before the run (`verify`)
//! 2. For each record, gather the album's song titles from the providers
//!    that know tracklists
//! 3. Run the album → track → artist cascade against every provider
//!    concurrently
//! 4. Merge the per-provider results into the record
//!
//! Records are processed with bounded concurrency; each provider's rate
//! limiter is shared by all records in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use futures::stream::{self, Stream, StreamExt};

use crate::config::Config;
use crate::enrichment::{
    cascade::FallbackOrchestrator,
    deezer::DeezerClient,
    discogs::DiscogsClient,
    domain::{EnrichmentRequest, ProviderError, ProviderId, ProviderResult, SearchOutcome},
    events::{EnrichmentEvent, EventSink},
    http::{ProviderHttp, build_client},
    matcher::FuzzyMatcher,
    merge::{AlbumRecord, EnrichedRecord, merge},
    musicbrainz::MusicBrainzClient,
    ratelimit::{RateLimiter, RetryPolicy},
    spotify::SpotifyClient,
    traits::MusicProvider,
};

/// Songs tried at the track level, per record
const MAX_SONGS: usize = 10;

/// One provider plus its run-time state
struct ProviderSlot {
    provider: Arc<dyn MusicProvider>,
    /// Turned off in config
    enabled: bool,
    /// Credentials rejected during this run
    disabled: AtomicBool,
}

impl ProviderSlot {
    fn new(provider: Arc<dyn MusicProvider>, enabled: bool) -> Self {
        Self {
            provider,
            enabled,
            disabled: AtomicBool::new(false),
        }
    }

    fn is_active(&self) -> bool {
        self.enabled && !self.disabled.load(Ordering::Acquire)
    }
}

/// Service for enriching album records with provider links
pub struct EnrichmentService {
    /// In priority order
    slots: Vec<ProviderSlot>,
    orchestrator: FallbackOrchestrator,
    sink: Arc<dyn EventSink>,
    concurrency: usize,
}

impl EnrichmentService {
    /// Build every provider client from the config.
    ///
    /// Fails only if the HTTP client cannot be constructed; missing
    /// credentials surface from [`EnrichmentService::verify`].
    pub fn from_config(config: &Config, sink: Arc<dyn EventSink>) -> Result<Self, ProviderError> {
        let client = build_client(&config.http)?;
        let retry = RetryPolicy::new(&config.retry);

        let slots = config
            .providers
            .normalized_order()
            .into_iter()
            .map(|id| {
                let settings = config.providers.settings(id);
                let http = ProviderHttp::new(
                    id,
                    client.clone(),
                    Arc::new(RateLimiter::from_settings(settings)),
                    retry.clone(),
                );
                ProviderSlot::new(build_provider(id, config, http), settings.enabled)
            })
            .collect();

        Ok(Self {
            slots,
            orchestrator: FallbackOrchestrator::new(FuzzyMatcher::new(config.matching.clone())),
            sink,
            concurrency: config.batch.concurrency.max(1),
        })
    }

    /// Service over explicit providers (in priority order), all enabled
    pub fn with_providers(
        providers: Vec<Arc<dyn MusicProvider>>,
        matcher: FuzzyMatcher,
        sink: Arc<dyn EventSink>,
        concurrency: usize,
    ) -> Self {
        Self {
            slots: providers
                .into_iter()
                .map(|provider| ProviderSlot::new(provider, true))
                .collect(),
            orchestrator: FallbackOrchestrator::new(matcher),
            sink,
            concurrency: concurrency.max(1),
        }
    }

    /// Providers that will actually be queried
    pub fn active_providers(&self) -> Vec<ProviderId> {
        self.slots
            .iter()
            .filter(|slot| slot.is_active())
            .map(|slot| slot.provider.id())
            .collect()
    }

    /// Check credentials of every enabled provider before any record.
    ///
    /// Rejected or missing credentials abort the run. Anything else (network
    /// trouble, an outage) is logged and left to the per-record path.
    pub async fn verify(&self) -> Result<(), ProviderError> {
        for slot in self.slots.iter().filter(|slot| slot.enabled) {
            let id = slot.provider.id();
            match slot.provider.verify().await {
                Ok(()) => tracing::debug!(provider = %id, "Credentials ok"),
                Err(ProviderError::Auth(reason)) => {
                    return Err(ProviderError::Auth(format!("{id}: {reason}")));
                }
                Err(e) => {
                    tracing::warn!(provider = %id, "Startup check failed, continuing: {}", e)
                }
            }
        }
        Ok(())
    }

    /// Resolve one request against every provider.
    ///
    /// Returns exactly one result per provider, in priority order.
    pub async fn resolve(&self, request: &EnrichmentRequest) -> Vec<ProviderResult> {
        let request = if request.songs.is_empty() {
            request.clone().with_songs(self.songs(request).await)
        } else {
            request.clone()
        };
        join_all(self.slots.iter().map(|slot| self.resolve_with(slot, &request))).await
    }

    /// Song titles of the album, merged from every active provider's
    /// tracklist in priority order. Failures only cost the track level its
    /// songs, so they are logged and skipped.
    async fn songs(&self, request: &EnrichmentRequest) -> Vec<String> {
        let lookups = self
            .slots
            .iter()
            .filter(|slot| slot.is_active())
            .map(|slot| async move {
                let id = slot.provider.id();
                match slot.provider.tracklist(&request.artist, &request.album).await {
                    Ok(songs) => songs,
                    Err(e) => {
                        tracing::debug!(
                            provider = %id,
                            album = %request.album,
                            "No tracklist: {}",
                            e
                        );
                        vec![]
                    }
                }
            });

        let mut songs: Vec<String> = Vec::new();
        for song in join_all(lookups).await.into_iter().flatten() {
            if songs.len() == MAX_SONGS {
                break;
            }
            if !songs.iter().any(|known| known.eq_ignore_ascii_case(&song)) {
                songs.push(song);
            }
        }
        songs
    }

    async fn resolve_with(
        &self,
        slot: &ProviderSlot,
        request: &EnrichmentRequest,
    ) -> ProviderResult {
        let id = slot.provider.id();
        if !slot.is_active() {
            return ProviderResult::not_found(id);
        }

        match self.orchestrator.resolve(slot.provider.as_ref(), request).await {
            SearchOutcome::Found(scored) => {
                self.sink.emit(EnrichmentEvent::MatchFound {
                    provider: id,
                    artist: request.artist.clone(),
                    album: request.album.clone(),
                    match_type: scored.candidate.match_type,
                    confidence: scored.confidence,
                    link: scored.candidate.url.clone(),
                });
                ProviderResult::from_match(scored)
            }
            SearchOutcome::NotFound => {
                self.sink.emit(EnrichmentEvent::NotFound {
                    provider: id,
                    artist: request.artist.clone(),
                    album: request.album.clone(),
                });
                ProviderResult::not_found(id)
            }
            SearchOutcome::Failed(error) => {
                let auth_reason = match &error {
                    ProviderError::Auth(reason) => Some(reason.clone()),
                    _ => None,
                };
                self.sink.emit(EnrichmentEvent::ProviderFailed {
                    provider: id,
                    artist: request.artist.clone(),
                    album: request.album.clone(),
                    error,
                });

                // Only the first caller to flip the flag reports it
                if let Some(reason) = auth_reason
                    && !slot.disabled.swap(true, Ordering::AcqRel)
                {
                    self.sink.emit(EnrichmentEvent::ProviderDisabled { provider: id, reason });
                }

                ProviderResult::not_found(id)
            }
        }
    }

    /// Resolve and merge one record
    pub async fn enrich(&self, record: AlbumRecord) -> EnrichedRecord {
        let results = self.resolve(&record.request()).await;
        merge(record, &results)
    }

    /// Enrich records in input order, `concurrency` at a time.
    ///
    /// Items come out in input order, so after `n` items the first `n`
    /// records are done and the rest have not been yielded.
    pub fn enrich_stream(
        &self,
        records: Vec<AlbumRecord>,
    ) -> impl Stream<Item = EnrichedRecord> + '_ {
        stream::iter(records)
            .map(move |record| self.enrich(record))
            .buffered(self.concurrency)
    }

    /// Enrich every record and collect the results
    pub async fn enrich_all(&self, records: Vec<AlbumRecord>) -> Vec<EnrichedRecord> {
        self.enrich_stream(records).collect().await
    }
}

fn build_provider(id: ProviderId, config: &Config, http: ProviderHttp) -> Arc<dyn MusicProvider> {
    let providers = &config.providers;
    match id {
        ProviderId::Spotify => Arc::new(SpotifyClient::from_settings(
            http,
            &config.credentials,
            &providers.spotify,
        )),
        ProviderId::Deezer => Arc::new(DeezerClient::from_settings(http, &providers.deezer)),
        ProviderId::Discogs => Arc::new(DiscogsClient::from_settings(
            http,
            config.credentials.discogs_api_token.clone(),
            &providers.discogs,
        )),
        ProviderId::MusicBrainz => {
            Arc::new(MusicBrainzClient::from_settings(http, &providers.musicbrainz))
        }
    }
}

//! Structured resolution events.
//!
//! The engine reports what happened as data. Formatting is the sink's job:
//! the CLI uses [`TracingSink`], tests use [`CollectingSink`].

use parking_lot::Mutex;

use super::domain::{MatchType, ProviderError, ProviderId};

/// Something worth reporting about one provider and one request
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentEvent {
    MatchFound {
        provider: ProviderId,
        artist: String,
        album: String,
        match_type: MatchType,
        confidence: f64,
        link: String,
    },
    NotFound {
        provider: ProviderId,
        artist: String,
        album: String,
    },
    /// The provider failed for this request; its result is "not found"
    ProviderFailed {
        provider: ProviderId,
        artist: String,
        album: String,
        error: ProviderError,
    },
    /// Credentials were rejected; the provider is skipped for the rest of the run
    ProviderDisabled {
        provider: ProviderId,
        reason: String,
    },
}

/// Receiver of resolution events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EnrichmentEvent);
}

/// Writes events to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: EnrichmentEvent) {
        match event {
            EnrichmentEvent::MatchFound {
                provider,
                artist,
                album,
                match_type,
                confidence,
                link,
            } => tracing::info!(
                %provider,
                %match_type,
                confidence = %format!("{confidence:.2}"),
                "Found {} link for '{}' - '{}': {}",
                provider,
                artist,
                album,
                link
            ),
            EnrichmentEvent::NotFound {
                provider,
                artist,
                album,
            } => tracing::info!(
                %provider,
                "No {} link found for '{}' - '{}'",
                provider,
                artist,
                album
            ),
            EnrichmentEvent::ProviderFailed {
                provider,
                artist,
                album,
                error,
            } => tracing::warn!(
                %provider,
                "{} lookup failed for '{}' - '{}': {}",
                provider,
                artist,
                album,
                error
            ),
            EnrichmentEvent::ProviderDisabled { provider, reason } => {
                tracing::error!(
                    %provider,
                    "Disabling {} for the rest of the run: {}",
                    provider,
                    reason
                )
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<EnrichmentEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far
    pub fn events(&self) -> Vec<EnrichmentEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: EnrichmentEvent) {
        self.events.lock().push(event);
    }
}

//! MusicBrainz API integration
//!
//! Release and artist search through the Lucene query endpoints. The public
//! service allows one request per second per client and insists on a
//! descriptive User-Agent.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use client::MusicBrainzClient;

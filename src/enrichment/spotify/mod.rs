//! Spotify Web API integration
//!
//! Album, track, and artist search behind the client-credentials flow.
//! Track hits carry 30 second preview URLs when Spotify has one.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use client::SpotifyClient;

//! Discogs API integration
//!
//! Release and artist search against the Discogs database. Links point at
//! the discogs.com site, not the API.
//!
//! API docs: https://www.discogs.com/developers

pub mod dto;
mod adapter;
mod client;

pub use client::DiscogsClient;

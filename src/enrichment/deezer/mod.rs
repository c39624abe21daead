//! Deezer API integration
//!
//! Album, track, and artist search. No credentials needed; track hits are
//! the main source of preview URLs.
//!
//! API docs: https://developers.deezer.com/api

pub mod dto;
mod adapter;
mod client;

pub use client::DeezerClient;

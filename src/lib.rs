#![forbid(unsafe_code)]

//! Stremio-style addon exposing YouTube channel uploads through public RSS
//! feeds and oEmbed lookups. No API keys involved.

pub mod addon;
pub mod config;
pub mod embed;
pub mod feed;
pub mod fetch;
pub mod manifest;
pub mod models;
pub mod registry;

//! Records exchanged with the media-center host.
//!
//! All structs in this module mirror the JSON shapes of the addon protocol.
//! Nothing here outlives a single request.

use std::fmt;

use serde::Serialize;

/// Prefix shared by every item id this addon hands out.
pub const ITEM_ID_PREFIX: &str = "yt";

/// The only content type the addon advertises.
pub const CONTENT_TYPE: &str = "series";

const POSTER_SHAPE: &str = "landscape";

/// Builds the `yt:<videoId>` item id for a raw video id.
pub fn item_id(video_id: &str) -> String {
    format!("{ITEM_ID_PREFIX}:{video_id}")
}

/// Lightweight catalog row produced from one feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub description: String,
    pub poster_shape: String,
}

impl VideoSummary {
    pub fn new(video_id: &str, name: String, poster: Option<String>) -> Self {
        Self {
            id: item_id(video_id),
            kind: CONTENT_TYPE.to_string(),
            name,
            poster,
            description: String::new(),
            poster_shape: POSTER_SHAPE.to_string(),
        }
    }
}

/// The single playable entry attached to a detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeEntry {
    pub id: String,
    pub title: String,
    pub season: u32,
    pub episode: u32,
}

/// Detail record returned for a meta request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub poster_shape: String,
    pub videos: Vec<EpisodeEntry>,
}

impl VideoDetail {
    /// Detail record with one episode whose title is `episode_title`.
    pub fn new(item_id: &str, name: String, episode_title: String) -> Self {
        Self {
            id: item_id.to_string(),
            kind: CONTENT_TYPE.to_string(),
            name,
            poster: None,
            background: None,
            description: None,
            poster_shape: POSTER_SHAPE.to_string(),
            videos: vec![EpisodeEntry {
                id: item_id.to_string(),
                title: episode_title,
                season: 1,
                episode: 1,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLink {
    pub title: String,
    pub external_url: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<VideoSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetaResponse {
    pub meta: VideoDetail,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StreamResponse {
    pub streams: Vec<StreamLink>,
}

/// Why an outbound lookup produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The provider answered with a non-success HTTP status.
    Status(u16),
    /// The request never completed.
    Transport(String),
    /// The body arrived but could not be interpreted.
    Malformed(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "provider returned HTTP {code}"),
            Self::Transport(reason) => write!(f, "request failed: {reason}"),
            Self::Malformed(reason) => write!(f, "unreadable response: {reason}"),
        }
    }
}

/// Outcome of an outbound lookup.
///
/// Lookups never fail the request that triggered them; callers decide how an
/// `Unavailable` outcome degrades (empty list, placeholder record, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Ok(T),
    Unavailable(Unavailable),
}

impl<T> Fetched<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }
}

impl<T: Default> Fetched<T> {
    pub fn unwrap_or_default(self) -> T {
        self.ok().unwrap_or_default()
    }
}

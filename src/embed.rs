//! oEmbed lookups for single videos.

use serde::Deserialize;

use crate::config::AddonSettings;
use crate::fetch::HttpFetch;
use crate::models::{Fetched, Unavailable};

pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// The parts of an oEmbed payload the addon reads. The provider owns the
/// schema, so every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmbedInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}

/// Only the video id is percent-encoded; the watch URL around it is passed
/// through as the provider expects.
pub fn embed_url(base_url: &str, video_id: &str) -> String {
    format!(
        "{base_url}?url={}&format=json",
        watch_url(&urlencoding::encode(video_id))
    )
}

pub async fn fetch_embed_info<F: HttpFetch>(
    fetcher: &F,
    settings: &AddonSettings,
    video_id: &str,
) -> Fetched<EmbedInfo> {
    let url = embed_url(&settings.oembed_base_url, video_id);
    let response = match fetcher.get(&url).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(video_id, error = %format!("{err:#}"), "oembed request failed");
            return Fetched::Unavailable(Unavailable::Transport(format!("{err:#}")));
        }
    };
    if !response.is_success() {
        tracing::debug!(video_id, status = response.status, "oembed request rejected");
        return Fetched::Unavailable(Unavailable::Status(response.status));
    }
    match serde_json::from_str::<EmbedInfo>(&response.body) {
        Ok(info) => Fetched::Ok(info),
        Err(err) => {
            tracing::debug!(video_id, error = %err, "oembed payload unreadable");
            Fetched::Unavailable(Unavailable::Malformed(err.to_string()))
        }
    }
}

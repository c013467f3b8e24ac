//! The three request handlers behind the addon protocol.
//!
//! Each resolver answers with a well-formed record no matter what happens
//! upstream: unknown ids and provider failures degrade to empty lists or
//! placeholder text instead of errors.

use crate::config::AddonSettings;
use crate::embed::{fetch_embed_info, watch_url};
use crate::feed::fetch_channel_videos;
use crate::fetch::HttpFetch;
use crate::models::{Fetched, ITEM_ID_PREFIX, StreamLink, VideoDetail, VideoSummary};
use crate::registry::ChannelRegistry;

const STREAM_TITLE: &str = "Open on YouTube";

pub struct Addon<F> {
    registry: ChannelRegistry,
    settings: AddonSettings,
    fetcher: F,
}

impl<F: HttpFetch> Addon<F> {
    pub fn new(registry: ChannelRegistry, settings: AddonSettings, fetcher: F) -> Self {
        Self {
            registry,
            settings,
            fetcher,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Latest uploads of the channel behind `catalog_id`. Every request
    /// re-fetches the feed.
    pub async fn resolve_catalog(&self, catalog_id: &str) -> Vec<VideoSummary> {
        let Some((group, channel)) = self.registry.lookup_catalog(catalog_id) else {
            tracing::debug!(catalog_id, "unknown catalog id");
            return Vec::new();
        };
        tracing::debug!(catalog_id, group = %group.name, channel = %channel.name, "resolving catalog");
        fetch_channel_videos(
            &self.fetcher,
            &self.settings,
            &channel.id,
            self.settings.videos_per_channel,
        )
        .await
        .unwrap_or_default()
    }

    /// Detail record for `item_id`, falling back to placeholder text when the
    /// embed lookup is unavailable.
    pub async fn resolve_item(&self, item_id: &str) -> VideoDetail {
        let video_id = strip_item_prefix(item_id);
        match fetch_embed_info(&self.fetcher, &self.settings, video_id).await {
            Fetched::Ok(info) => {
                let title = info
                    .title
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| placeholder_name(video_id));
                let description = match info.author_name.as_deref() {
                    Some(author) if !author.is_empty() => format!("{title}\nby {author}"),
                    _ => title.clone(),
                };
                let mut detail = VideoDetail::new(item_id, title.clone(), title);
                detail.poster = info.thumbnail_url.clone();
                detail.background = info.thumbnail_url;
                detail.description = Some(description);
                detail
            }
            Fetched::Unavailable(reason) => {
                tracing::debug!(item_id, %reason, "using placeholder detail");
                VideoDetail::new(
                    item_id,
                    placeholder_name(video_id),
                    format!("Video {video_id}"),
                )
            }
        }
    }

    /// External playback link for `item_id`. No network access.
    ///
    /// Ids without a `:`-separated video id produce no links rather than a
    /// watch URL with a missing id.
    pub fn resolve_stream(&self, item_id: &str) -> Vec<StreamLink> {
        match item_id.split(':').nth(1).filter(|id| !id.is_empty()) {
            Some(video_id) => vec![StreamLink {
                title: STREAM_TITLE.to_string(),
                external_url: watch_url(video_id),
            }],
            None => {
                tracing::debug!(item_id, "stream id has no video id");
                Vec::new()
            }
        }
    }
}

fn strip_item_prefix(item_id: &str) -> &str {
    item_id
        .strip_prefix(ITEM_ID_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(item_id)
}

fn placeholder_name(video_id: &str) -> String {
    format!("YouTube Video {video_id}")
}

//! Channel upload feeds.
//!
//! YouTube publishes the latest uploads of every channel as an Atom document
//! at `feeds/videos.xml?channel_id=...`. The document is only ever read
//! through [`parse_entry`], which turns one `<entry>` block into a
//! [`FeedEntry`] with every field optional.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AddonSettings;
use crate::fetch::HttpFetch;
use crate::models::{Fetched, Unavailable, VideoSummary};

/// A single feed page never carries more entries than this.
pub const MAX_FEED_ENTRIES: usize = 50;

const ENTRY_DELIMITER: &str = "<entry>";

static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<yt:videoId>([^<]+)</yt:videoId>").expect("video id pattern is valid")
});
static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^<]+)</title>").expect("title pattern is valid"));
static THUMBNAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"media:thumbnail[^>]+url="([^"]+)""#).expect("thumbnail pattern is valid")
});

/// Fields recovered from one `<entry>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

impl FeedEntry {
    /// Catalog row for this entry, or `None` when no video id was found.
    pub fn into_summary(self) -> Option<VideoSummary> {
        let video_id = self.video_id?;
        let name = self.title.unwrap_or_else(|| video_id.clone());
        Some(VideoSummary::new(&video_id, name, self.thumbnail))
    }
}

pub fn feed_url(base_url: &str, channel_id: &str) -> String {
    format!("{base_url}?channel_id={channel_id}")
}

/// Extracts the fields of a single entry block. Missing fields stay `None`.
pub fn parse_entry(block: &str) -> FeedEntry {
    FeedEntry {
        video_id: capture(&VIDEO_ID_PATTERN, block),
        title: capture(&TITLE_PATTERN, block),
        thumbnail: capture(&THUMBNAIL_PATTERN, block),
    }
}

fn capture(pattern: &Regex, block: &str) -> Option<String> {
    pattern
        .captures(block)
        .and_then(|captures| captures.get(1))
        .map(|value| decode_xml_entities(value.as_str().trim()))
        .filter(|value| !value.is_empty())
}

/// Turns a feed document into catalog rows.
///
/// Header material before the first entry is ignored. At most
/// `min(limit, MAX_FEED_ENTRIES)` entries are inspected and entries without a
/// video id are dropped, so the result may be shorter than the cap.
pub fn extract_videos(body: &str, limit: usize) -> Vec<VideoSummary> {
    body.split(ENTRY_DELIMITER)
        .skip(1)
        .take(limit.min(MAX_FEED_ENTRIES))
        .map(parse_entry)
        .filter_map(FeedEntry::into_summary)
        .collect()
}

/// Fetches the upload feed for `channel_id` and extracts up to `limit` videos.
pub async fn fetch_channel_videos<F: HttpFetch>(
    fetcher: &F,
    settings: &AddonSettings,
    channel_id: &str,
    limit: usize,
) -> Fetched<Vec<VideoSummary>> {
    let url = feed_url(&settings.feed_base_url, channel_id);
    let response = match fetcher.get(&url).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(channel_id, error = %format!("{err:#}"), "feed request failed");
            return Fetched::Unavailable(Unavailable::Transport(format!("{err:#}")));
        }
    };
    if !response.is_success() {
        tracing::warn!(channel_id, status = response.status, "feed request rejected");
        return Fetched::Unavailable(Unavailable::Status(response.status));
    }

    let videos = extract_videos(&response.body, limit);
    tracing::debug!(channel_id, count = videos.len(), "feed parsed");
    Fetched::Ok(videos)
}

/// Decodes the predefined XML entities and numeric character references.
/// Unknown or malformed references are left as written.
fn decode_xml_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

//! Channel registry: which YouTube channels are exposed, grouped for display.
//!
//! The registry is built once at startup (either the built-in table or a TOML
//! file) and handed to the resolvers by reference. It is never mutated.

use std::{collections::HashSet, fs, path::Path, sync::LazyLock};

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;

const CATALOG_ID_PREFIX: &str = "youtube";

static CATALOG_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^youtube-(.+?)-([A-Za-z0-9_-]+)$").expect("catalog id pattern is valid")
});

static CHANNEL_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("channel id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelGroup {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<ChannelRef>,
}

/// Ordered list of channel groups. Order drives the manifest's catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelRegistry {
    #[serde(default)]
    groups: Vec<ChannelGroup>,
}

/// Catalog id advertised for `channel` inside `group`.
pub fn catalog_id(group: &str, channel: &ChannelRef) -> String {
    format!(
        "{CATALOG_ID_PREFIX}-{}-{}",
        group.to_lowercase(),
        channel.id
    )
}

fn channel(id: &str, name: &str) -> ChannelRef {
    ChannelRef {
        id: id.to_string(),
        name: name.to_string(),
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self {
            groups: vec![
                ChannelGroup {
                    name: "Tech".into(),
                    channels: vec![
                        channel("UCXuqSBlHAE6Xw-yeJA0Tunw", "Linus Tech Tips"),
                        channel("UCBJycsmduvYEL83R_U4JriQ", "MKBHD"),
                        channel("UCdBK94H6oZT2Q7l0-b0xmMg", "Short Circuit - LTT"),
                    ],
                },
                ChannelGroup {
                    name: "Automotive".into(),
                    channels: vec![channel("UCyXiDU5qjfOPxgOPeFWGwKw", "Throttle House")],
                },
                ChannelGroup {
                    name: "Podcasts".into(),
                    channels: vec![channel("UCFP1dDbFt0B7X6M2xPDj1bA", "WVFRM Podcast")],
                },
                ChannelGroup {
                    name: "Entertainment".into(),
                    channels: vec![channel("UCSpFnDQr88xCZ80N-X7t0nQ", "Corridor Crew MAIN")],
                },
            ],
        }
    }
}

impl ChannelRegistry {
    pub fn new(groups: Vec<ChannelGroup>) -> Result<Self> {
        let registry = Self { groups };
        registry.validate()?;
        Ok(registry)
    }

    /// Loads the registry from a TOML file with `[[groups]]` tables.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Loading channels from {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let registry: Self = toml::from_str(raw).context("parsing channel registry")?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn groups(&self) -> &[ChannelGroup] {
        &self.groups
    }

    /// Every `(group, channel)` pair in registry order.
    pub fn channels(&self) -> impl Iterator<Item = (&ChannelGroup, &ChannelRef)> {
        self.groups
            .iter()
            .flat_map(|group| group.channels.iter().map(move |channel| (group, channel)))
    }

    /// Maps a catalog id back to the channel it was derived from.
    ///
    /// The group part of the id is lowercased at advertisement time, so the
    /// candidate channel's id is re-derived and compared whole instead of
    /// indexing by the captured suffix.
    pub fn lookup_catalog(&self, catalog_id: &str) -> Option<(&ChannelGroup, &ChannelRef)> {
        let captures = CATALOG_ID_PATTERN.captures(catalog_id)?;
        let group_part = captures.get(1)?.as_str();
        let group = self
            .groups
            .iter()
            .find(|group| group.name.to_lowercase() == group_part)?;
        let channel = group
            .channels
            .iter()
            .find(|channel| catalog_id_matches(group_part, channel, catalog_id))?;
        Some((group, channel))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            let name = group.name.trim();
            if name.is_empty() {
                bail!("channel group names must not be empty");
            }
            // The catalog id parser splits the group off at the first '-'.
            if name.contains('-') {
                bail!("channel group {name:?} must not contain '-'");
            }
            if !seen.insert(name.to_lowercase()) {
                bail!("channel group {name:?} is declared more than once");
            }
            for channel in &group.channels {
                if !CHANNEL_ID_PATTERN.is_match(&channel.id) {
                    bail!(
                        "channel {:?} in group {name:?} has an invalid id {:?}",
                        channel.name,
                        channel.id
                    );
                }
            }
        }
        Ok(())
    }
}

fn catalog_id_matches(group_part: &str, channel: &ChannelRef, catalog_id: &str) -> bool {
    format!("{CATALOG_ID_PREFIX}-{group_part}-{}", channel.id) == catalog_id
}

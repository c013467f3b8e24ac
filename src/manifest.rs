//! Addon descriptor served at `/manifest.json`.

use serde::Serialize;

use crate::models::{CONTENT_TYPE, ITEM_ID_PREFIX};
use crate::registry::{ChannelRegistry, catalog_id};

pub const ADDON_ID: &str = "community.youtube.rss.clean";
pub const ADDON_NAME: &str = "YouTube Universe (Clean RSS)";
const ADDON_DESCRIPTION: &str =
    "Zero-API, RSS-only YouTube catalogs per channel.\nStable baseline. No API keys. Streams open on YouTube.";
const ADDON_LOGO: &str = "https://www.youtube.com/s/desktop/d743f786/img/favicon_144x144.png";

/// Resources the host may request from this addon.
pub const RESOURCES: [&str; 3] = ["catalog", "meta", "stream"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<CatalogDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

impl Manifest {
    /// One catalog per configured channel, one channel per catalog, in
    /// registry order.
    pub fn for_registry(registry: &ChannelRegistry) -> Self {
        let catalogs = registry
            .channels()
            .map(|(group, channel)| CatalogDescriptor {
                kind: CONTENT_TYPE.to_string(),
                id: catalog_id(&group.name, channel),
                name: format!("YouTube: {} – {}", group.name, channel.name),
            })
            .collect();

        Self {
            id: ADDON_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: ADDON_NAME.to_string(),
            description: ADDON_DESCRIPTION.to_string(),
            logo: ADDON_LOGO.to_string(),
            resources: RESOURCES.iter().map(|resource| resource.to_string()).collect(),
            types: vec![CONTENT_TYPE.to_string()],
            id_prefixes: vec![ITEM_ID_PREFIX.to_string()],
            catalogs,
        }
    }
}

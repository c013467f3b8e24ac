#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_ADDON_PORT: u16 = 7000;
pub const DEFAULT_ADDON_HOST: &str = "0.0.0.0";
pub const DEFAULT_VIDEOS_PER_CHANNEL: usize = 20;
pub const DEFAULT_FEED_BASE_URL: &str = "https://www.youtube.com/feeds/videos.xml";
pub const DEFAULT_OEMBED_BASE_URL: &str = "https://www.youtube.com/oembed";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Knobs the resolvers read on every request.
#[derive(Debug, Clone)]
pub struct AddonSettings {
    pub videos_per_channel: usize,
    pub feed_base_url: String,
    pub oembed_base_url: String,
    pub user_agent: String,
    pub http_timeout: Duration,
}

impl Default for AddonSettings {
    fn default() -> Self {
        Self {
            videos_per_channel: DEFAULT_VIDEOS_PER_CHANNEL,
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            oembed_base_url: DEFAULT_OEMBED_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub host: String,
    pub port: u16,
    pub channels_file: Option<PathBuf>,
    pub settings: AddonSettings,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub channels_file: Option<PathBuf>,
    pub videos_per_channel: Option<usize>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_runtime_config(overrides: RuntimeOverrides) -> Result<RuntimeConfig> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    resolve_runtime_config_with(env_path.to_path_buf(), env_var_string, overrides)
}

fn resolve_runtime_config_with(
    env_path: PathBuf,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: RuntimeOverrides,
) -> Result<RuntimeConfig> {
    let file_vars = read_env_file(&env_path)?;
    Ok(build_runtime_config_with_overrides(
        &file_vars, env_lookup, overrides,
    ))
}

#[cfg(test)]
fn build_runtime_config(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> RuntimeConfig {
    build_runtime_config_with_overrides(file_vars, env_lookup, RuntimeOverrides::default())
}

fn build_runtime_config_with_overrides(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: RuntimeOverrides,
) -> RuntimeConfig {
    let lookup = |key: &str| {
        lookup_value(key, file_vars, &env_lookup).filter(|value| !value.trim().is_empty())
    };

    let host = overrides
        .host
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| lookup("RSSTUBE_HOST"))
        .unwrap_or_else(|| DEFAULT_ADDON_HOST.to_string());
    let port = overrides
        .port
        .or_else(|| lookup("PORT").and_then(|value| value.trim().parse::<u16>().ok()))
        .unwrap_or(DEFAULT_ADDON_PORT);
    let channels_file = overrides
        .channels_file
        .or_else(|| lookup("RSSTUBE_CHANNELS_FILE").map(PathBuf::from));
    let videos_per_channel = overrides
        .videos_per_channel
        .or_else(|| {
            lookup("RSSTUBE_VIDEOS_PER_CHANNEL").and_then(|value| value.trim().parse().ok())
        })
        .unwrap_or(DEFAULT_VIDEOS_PER_CHANNEL);
    let http_timeout = lookup("RSSTUBE_HTTP_TIMEOUT_SECS")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

    RuntimeConfig {
        host,
        port,
        channels_file,
        settings: AddonSettings {
            videos_per_channel,
            feed_base_url: lookup("RSSTUBE_FEED_URL")
                .unwrap_or_else(|| DEFAULT_FEED_BASE_URL.to_string()),
            oembed_base_url: lookup("RSSTUBE_OEMBED_URL")
                .unwrap_or_else(|| DEFAULT_OEMBED_BASE_URL.to_string()),
            user_agent: lookup("RSSTUBE_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            http_timeout: Duration::from_secs(http_timeout),
        },
    }
}

fn env_var_string(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| file_vars.get(key).cloned())
}

/// Reads a dotenv-style file. A missing file is treated as empty.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    fn config_from(contents: &str) -> RuntimeConfig {
        let cfg = make_config(contents);
        let vars = read_env_file(cfg.path()).unwrap();
        build_runtime_config(&vars, |_| None)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = config_from("");
        assert_eq!(config.host, DEFAULT_ADDON_HOST);
        assert_eq!(config.port, DEFAULT_ADDON_PORT);
        assert!(config.channels_file.is_none());
        assert_eq!(config.settings.videos_per_channel, DEFAULT_VIDEOS_PER_CHANNEL);
        assert_eq!(config.settings.feed_base_url, DEFAULT_FEED_BASE_URL);
        assert_eq!(config.settings.oembed_base_url, DEFAULT_OEMBED_BASE_URL);
        assert_eq!(config.settings.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(
            config.settings.http_timeout,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        );
    }

    #[test]
    fn reads_port_and_limit_from_file() {
        let config = config_from("PORT=\"4242\"\nRSSTUBE_VIDEOS_PER_CHANNEL=35\n");
        assert_eq!(config.port, 4242);
        assert_eq!(config.settings.videos_per_channel, 35);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = config_from(
            "PORT=\"nope\"\nRSSTUBE_VIDEOS_PER_CHANNEL=-3\nRSSTUBE_HTTP_TIMEOUT_SECS=0\n",
        );
        assert_eq!(config.port, DEFAULT_ADDON_PORT);
        assert_eq!(config.settings.videos_per_channel, DEFAULT_VIDEOS_PER_CHANNEL);
        assert_eq!(
            config.settings.http_timeout,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        );
    }

    #[test]
    fn env_wins_over_file() {
        let vars = read_env_file(
            make_config("RSSTUBE_FEED_URL=\"http://file/feed\"\nRSSTUBE_HOST=0.0.0.0\n").path(),
        )
        .unwrap();
        let config = build_runtime_config(&vars, |key| {
            if key == "RSSTUBE_FEED_URL" {
                Some("http://env/feed".to_string())
            } else {
                None
            }
        });
        assert_eq!(config.settings.feed_base_url, "http://env/feed");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn overrides_win_over_env_and_file() {
        let mut vars = HashMap::new();
        vars.insert("PORT".to_string(), "7001".to_string());
        vars.insert("RSSTUBE_CHANNELS_FILE".to_string(), "/file.toml".to_string());
        vars.insert("RSSTUBE_HOST".to_string(), "file-host".to_string());

        let config = build_runtime_config_with_overrides(
            &vars,
            |key| match key {
                "PORT" => Some("8000".to_string()),
                "RSSTUBE_VIDEOS_PER_CHANNEL" => Some("10".to_string()),
                _ => None,
            },
            RuntimeOverrides {
                port: Some(9000),
                channels_file: Some(PathBuf::from("/override.toml")),
                videos_per_channel: Some(5),
                ..RuntimeOverrides::default()
            },
        );

        assert_eq!(config.port, 9000);
        assert_eq!(config.channels_file, Some(PathBuf::from("/override.toml")));
        assert_eq!(config.settings.videos_per_channel, 5);
        assert_eq!(config.host, "file-host");
    }

    #[test]
    fn blank_host_override_is_ignored() {
        let config = build_runtime_config_with_overrides(
            &HashMap::new(),
            |_| None,
            RuntimeOverrides {
                host: Some("   ".into()),
                ..RuntimeOverrides::default()
            },
        );
        assert_eq!(config.host, DEFAULT_ADDON_HOST);
    }

    #[test]
    fn read_env_file_handles_export_and_quotes() {
        let cfg = make_config(
            r#"
            export PORT="7100"
            RSSTUBE_USER_AGENT='Mozilla/5.0 (X11)'
            RSSTUBE_HOST =  "0.0.0.0"
            # comment
            INVALID_LINE
            "#,
        );
        let vars = read_env_file(cfg.path()).unwrap();
        assert_eq!(vars.get("PORT").unwrap(), "7100");
        assert_eq!(vars.get("RSSTUBE_USER_AGENT").unwrap(), "Mozilla/5.0 (X11)");
        assert_eq!(vars.get("RSSTUBE_HOST").unwrap(), "0.0.0.0");
        assert!(!vars.contains_key("INVALID_LINE"));
    }

    #[test]
    fn read_env_file_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&dir.path().join("missing.env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn resolve_runtime_config_reads_given_env_path() {
        let cfg = make_config("RSSTUBE_OEMBED_URL=http://localhost:9/oembed\nPORT=7300\n");
        let config = resolve_runtime_config_with(
            cfg.path().to_path_buf(),
            |_| None,
            RuntimeOverrides {
                port: Some(7400),
                ..RuntimeOverrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.settings.oembed_base_url, "http://localhost:9/oembed");
        assert_eq!(config.port, 7400);
    }

    #[test]
    fn default_host_listens_on_all_interfaces() {
        let config = config_from("PORT=8123\n");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8123);
    }
}

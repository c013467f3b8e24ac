//! Outbound HTTP used by the feed and embed lookups.

use std::future::Future;

use anyhow::{Context, Result, anyhow};

use crate::config::AddonSettings;

/// Raw answer from the provider, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single GET against a public endpoint.
///
/// Implementations return `Ok` for every response that arrived (including
/// 4xx/5xx) and `Err` only when no response was received.
pub trait HttpFetch: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send;
}

/// Production fetcher backed by a shared `ureq` agent.
///
/// `ureq` is blocking, so each call runs on tokio's blocking pool and the
/// request task suspends exactly once while waiting for it.
#[derive(Clone)]
pub struct UreqFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqFetcher {
    pub fn new(settings: &AddonSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.http_timeout)
            .build();
        Self {
            agent,
            user_agent: settings.user_agent.clone(),
        }
    }
}

impl HttpFetch for UreqFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &user_agent, &url))
            .await
            .context("joining HTTP fetch task")?
    }
}

fn fetch_blocking(agent: &ureq::Agent, user_agent: &str, url: &str) -> Result<FetchResponse> {
    // Some providers reject default client identifiers, so always send one.
    let response = match agent.get(url).set("User-Agent", user_agent).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(err) => return Err(anyhow!(err).context(format!("requesting {url}"))),
    };
    let status = response.status();
    let body = response
        .into_string()
        .with_context(|| format!("reading body of {url}"))?;
    Ok(FetchResponse { status, body })
}

//! Agent Card Client (C1): fetches a remote agent's self-description.

use sb_domain::{Error, Result};
use sb_protocol::AgentCard;
use std::time::Duration;

const WELL_KNOWN_PATH: &str = "/.well-known/agent.json";

/// Stateless HTTP client that resolves agent cards. One instance may serve
/// concurrent fetches; it owns a single pooled `reqwest::Client` built once
/// with a fixed timeout, the same pattern as the LLM provider adapters'
/// `from_config` constructors.
pub struct AgentCardClient {
    client: reqwest::Client,
}

impl AgentCardClient {
    pub fn new(fetch_timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch_timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetches and parses the agent card at `base_url`. Tries the canonical
    /// `.well-known/agent.json` discovery path first; if that does not
    /// return a usable descriptor, falls back to treating `base_url` itself
    /// as a direct JSON descriptor endpoint.
    pub async fn fetch(&self, base_url: &str) -> Result<AgentCard> {
        let base = base_url.trim_end_matches('/');
        let well_known = format!("{base}{WELL_KNOWN_PATH}");

        match self.try_fetch(&well_known).await {
            Ok(card) => Ok(card),
            Err(_) => self
                .try_fetch(base)
                .await
                .map_err(|e| Error::Registration(format!("FETCH_FAILED: {base}: {e}"))),
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<AgentCard> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Http(format!("{} returned {}", url, resp.status())));
        }

        resp.json::<AgentCard>()
            .await
            .map_err(|e| Error::Http(format!("malformed agent card from {url}: {e}")))
    }
}

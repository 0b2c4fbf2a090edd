use serde::{Deserialize, Serialize};

/// Timeouts governing outbound calls to downstream agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "d_send_timeout_secs")]
    pub send_timeout_secs: u64,

    #[serde(default = "d_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "d_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    #[serde(default = "d_poll_http_timeout_secs")]
    pub poll_http_timeout_secs: u64,

    #[serde(default = "d_card_fetch_timeout_secs")]
    pub card_fetch_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: d_send_timeout_secs(),
            poll_interval_secs: d_poll_interval_secs(),
            poll_timeout_secs: d_poll_timeout_secs(),
            poll_http_timeout_secs: d_poll_http_timeout_secs(),
            card_fetch_timeout_secs: d_card_fetch_timeout_secs(),
        }
    }
}

fn d_send_timeout_secs() -> u64 {
    60
}
fn d_poll_interval_secs() -> u64 {
    1
}
fn d_poll_timeout_secs() -> u64 {
    120
}
fn d_poll_http_timeout_secs() -> u64 {
    5
}
fn d_card_fetch_timeout_secs() -> u64 {
    5
}

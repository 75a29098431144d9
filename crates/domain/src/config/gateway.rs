use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound gateway transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where to reach the third-party messaging gateway and how long to wait
/// on it. The gateway itself — its wire protocol, its credentials — is out
/// of scope (§1); this only configures the one concrete HTTP adapter this
/// repo ships. The bearer token value is never stored here, only the name
/// of the environment variable that holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_token_env")]
    pub token_env: String,
    #[serde(default = "d_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { base_url: d_base_url(), token_env: d_token_env(), send_timeout_ms: d_timeout_ms() }
    }
}

fn d_base_url() -> String {
    "http://localhost:9090".into()
}

fn d_token_env() -> String {
    "CB_GATEWAY_TOKEN".into()
}

fn d_timeout_ms() -> u64 {
    5_000
}

//! Outbound message delivery (A3). The wire format and credentials of the
//! real messaging provider are out of scope; this is the one concrete HTTP
//! adapter this repo ships, plus a logging stand-in for tests and local
//! runs without a configured provider.

use async_trait::async_trait;

use cb_domain::config::GatewayConfig;

#[derive(Debug, thiserror::Error)]
pub enum OutboundError {
    #[error("sending to {to}: {source}")]
    Transport { to: String, #[source] source: reqwest::Error },
}

/// Delivers one outbound text message to one recipient. Implementations
/// must not block the caller's tenant lock — `handle_inbound` only invokes
/// this after the lock has already been released (§5).
#[async_trait]
pub trait OutboundGateway: Send + Sync {
    async fn send(&self, to: &str, text: &str) -> Result<(), OutboundError>;
}

/// Posts to the configured HTTP endpoint, bearer-authenticated from the
/// env var named in `GatewayConfig::token_env`.
pub struct HttpOutboundGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpOutboundGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.send_timeout_ms))
            .build()
            .expect("reqwest client builder");
        let token = std::env::var(&config.token_env).ok();
        Self { client, base_url: config.base_url.clone(), token }
    }
}

#[async_trait]
impl OutboundGateway for HttpOutboundGateway {
    async fn send(&self, to: &str, text: &str) -> Result<(), OutboundError> {
        let url = format!("{}/send", self.base_url.trim_end_matches('/'));
        let mut req = self.client.post(&url).json(&serde_json::json!({ "to": to, "text": text }));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| OutboundError::Transport { to: to.to_owned(), source })?;
        Ok(())
    }
}

/// Logs instead of sending — used when no gateway is configured and by
/// tests that exercise `handle_inbound` without a real transport.
#[derive(Default)]
pub struct LoggingOutboundGateway;

#[async_trait]
impl OutboundGateway for LoggingOutboundGateway {
    async fn send(&self, to: &str, text: &str) -> Result<(), OutboundError> {
        tracing::info!(to, text, "outbound message (no transport configured)");
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Logging configuration. The core never ships a telemetry backend of its
/// own; it only decides the `tracing-subscriber` format and filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `"json"` for structured logs (production default) or `"pretty"` for
    /// local development.
    #[serde(default = "d_format")]
    pub log_format: String,
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "d_filter")]
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: d_format(),
            log_filter: d_filter(),
        }
    }
}

fn d_format() -> String {
    "json".into()
}

fn d_filter() -> String {
    "info,cb_gateway=debug".into()
}

//! Tracing/logging initialization.
//!
//! Filtering comes from `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_VAR: &str = "PAYDESK_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, for log shipping.
    #[default]
    Json,
    /// Human-readable single-line output, for terminals and tests.
    Compact,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "compact" | "text" | "pretty" => Some(Self::Compact),
            _ => None,
        }
    }

    /// Reads `PAYDESK_LOG_FORMAT`; unset or unrecognized means JSON.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_VAR)
            .ok()
            .and_then(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init(),
    };
}

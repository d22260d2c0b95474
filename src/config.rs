//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Invalid or missing values fall back to
//! defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;
use crate::ws::ReconnectPolicy;

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (e.g. `http://localhost:5000`).
    pub api_url: String,

    /// URL of the real-time endpoint. Derived from `api_url` when unset.
    pub ws_url: String,

    /// File holding the persisted auth token.
    pub token_file: PathBuf,

    /// Idle period after the last keystroke before `typing_stop` is sent.
    pub typing_idle: Duration,

    /// Timeout applied to every REST request.
    pub http_timeout: Duration,

    /// Capacity of the [`crate::domain::EventBus`] broadcast channel.
    pub event_bus_capacity: usize,

    /// What to do after the connection drops.
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let api_url = "http://localhost:5000".to_string();
        Self {
            ws_url: derive_ws_url(&api_url),
            api_url,
            token_file: PathBuf::from(".dealroom-token"),
            typing_idle: Duration::from_millis(3_000),
            http_timeout: Duration::from_secs(15),
            event_bus_capacity: 1_024,
            reconnect: ReconnectPolicy::Never,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `API_URL` or `WS_URL` is set but
    /// is not an `http(s)` / `ws(s)` URL, or if `RECONNECT_POLICY` names an
    /// unknown policy.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let api_url = std::env::var("API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ClientError::Config(format!("API_URL must be http(s): {api_url}")));
        }

        let ws_url = std::env::var("WS_URL").unwrap_or_else(|_| derive_ws_url(&api_url));
        if !ws_url.starts_with("ws://") && !ws_url.starts_with("wss://") {
            return Err(ClientError::Config(format!("WS_URL must be ws(s): {ws_url}")));
        }

        let token_file = std::env::var("TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_file);

        let typing_idle = Duration::from_millis(parse_env("TYPING_IDLE_MS", 3_000));
        let http_timeout = Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 15));
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity);

        let reconnect = match std::env::var("RECONNECT_POLICY").ok().as_deref() {
            None | Some("never") | Some("none") => ReconnectPolicy::Never,
            Some("backoff") => ReconnectPolicy::Backoff {
                base: Duration::from_millis(parse_env("RECONNECT_BASE_MS", 500)),
                max: Duration::from_millis(parse_env("RECONNECT_MAX_MS", 30_000)),
                max_attempts: std::env::var("RECONNECT_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok()),
            },
            Some(other) => {
                return Err(ClientError::Config(format!(
                    "unknown RECONNECT_POLICY: {other}"
                )));
            }
        };

        Ok(Self {
            api_url,
            ws_url,
            token_file,
            typing_idle,
            http_timeout,
            event_bus_capacity,
            reconnect,
        })
    }
}

/// Maps `http(s)://host` to `ws(s)://host/ws`.
fn derive_ws_url(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}/ws")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}/ws")
    } else {
        format!("{base}/ws")
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

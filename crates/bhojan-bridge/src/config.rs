use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feed::Role;

/// Connection settings for the notification API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root URL of the web application. Endpoint paths are joined onto it.
    pub base_url: String,
    /// Role of the signed-in account.
    pub role: Role,
    /// Anti-forgery token. When absent it is scraped from `csrf_page`.
    pub csrf_token: Option<String>,
    /// Page that embeds the anti-forgery token, relative to `base_url`.
    pub csrf_page: String,
    /// Raw `Cookie` header value carrying the session, if any.
    pub session_cookie: Option<String>,
    /// Upper bound for a single HTTP request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            role: Role::default(),
            csrf_token: None,
            csrf_page: String::new(),
            session_cookie: None,
            request_timeout_secs: 15,
        }
    }
}

/// Poller settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between polls. The role's default is used when absent.
    pub interval_secs: Option<u64>,
    /// Maximum number of records requested per poll.
    pub limit: Option<u32>,
}

impl PollingConfig {
    /// Effective polling period for `role`.
    pub fn interval(&self, role: Role) -> Duration {
        match self.interval_secs {
            Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
            _ => role.default_poll_interval(),
        }
    }
}

/// Alert sound settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Persisted mute preference.
    pub muted: bool,
    /// Output gain applied to pre-recorded assets, `0.0..=1.0`.
    pub volume: f32,
    /// Location of the sound assets, relative to the server base URL.
    pub assets_path: String,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 0.5,
            assets_path: "static/sounds/".to_string(),
        }
    }
}

/// Dropdown presentation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DropdownConfig {
    /// Notification bodies longer than this many characters are truncated.
    pub body_max_chars: usize,
    /// Badge counts above this value render as `{cap}+`. Delivery agents get
    /// a cap of 9 when unset.
    pub badge_cap: Option<u32>,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            body_max_chars: 80,
            badge_cap: None,
        }
    }
}

impl DropdownConfig {
    /// Effective badge cap for `role`.
    pub fn badge_cap(&self, role: Role) -> Option<u32> {
        match (self.badge_cap, role) {
            (Some(cap), _) => Some(cap),
            (None, Role::Delivery) => Some(9),
            (None, _) => None,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings of the notification API.
    pub server: ServerConfig,
    /// Poller settings.
    pub polling: PollingConfig,
    /// Alert sound settings, including the mute preference.
    pub sound: SoundConfig,
    /// Dropdown presentation settings.
    pub dropdown: DropdownConfig,
}

use std::{env, path::PathBuf, str::FromStr};

use crate::error::GatilhoError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Mirrors the browser's `Notification.permission` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyPermission {
    Granted,
    Denied,
    Default,
}

impl FromStr for NotifyPermission {
    type Err = GatilhoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            "default" => Ok(Self::Default),
            other => Err(GatilhoError::Config(format!(
                "unknown notification permission: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub ws_url: String,
    pub session_file: PathBuf,
    pub notify_permission: NotifyPermission,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            session_file: default_session_file(),
            notify_permission: NotifyPermission::Granted,
        }
    }
}

fn default_session_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => {
            PathBuf::from(home).join(".gatilho").join("session.json")
        }
        _ => PathBuf::from(".gatilho").join("session.json"),
    }
}

fn trim_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let api_url = env::var("GATILHO_API_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(trim_url)
        .unwrap_or(defaults.api_url);

    let ws_url = env::var("GATILHO_WS_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(trim_url)
        .unwrap_or(defaults.ws_url);

    let session_file = env::var("GATILHO_SESSION_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or(defaults.session_file);

    let notify_permission = env::var("GATILHO_NOTIFY_PERMISSION")
        .ok()
        .and_then(|s| s.parse::<NotifyPermission>().ok())
        .unwrap_or(defaults.notify_permission);

    Settings {
        api_url,
        ws_url,
        session_file,
        notify_permission,
    }
}

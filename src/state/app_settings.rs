use dugout_api::ViewMode;
use dugout_api::client::DEFAULT_BASE_URL;
use log::{LevelFilter, warn};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);
const DEBOUNCE_RANGE_MS: (u64, u64) = (300, 500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    pub debounce: Duration,
    pub timeout: Duration,
    /// Players compared on startup; empty skips the initial comparison.
    pub initial_players: [String; 2],
    pub initial_view: ViewMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: Some(LevelFilter::Info),
            api_url: DEFAULT_BASE_URL.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            timeout: DEFAULT_TIMEOUT,
            initial_players: ["Mike Trout".to_string(), "Kyle Tucker".to_string()],
            initial_view: ViewMode::default(),
        }
    }
}

impl AppSettings {
    /// Read `DUGOUT_*` environment variables over the defaults.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(url) = get("DUGOUT_API_URL").filter(|u| !u.is_empty()) {
            settings.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(level) = get("DUGOUT_LOG_LEVEL") {
            match LevelFilter::from_str(&level) {
                Ok(level) => settings.log_level = Some(level),
                Err(_) => warn!("ignoring DUGOUT_LOG_LEVEL={level}"),
            }
        }

        if let Some(ms) = get("DUGOUT_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => {
                    let (lo, hi) = DEBOUNCE_RANGE_MS;
                    settings.debounce = Duration::from_millis(ms.clamp(lo, hi));
                }
                Err(_) => warn!("ignoring DUGOUT_DEBOUNCE_MS={ms}"),
            }
        }

        if let Some(secs) = get("DUGOUT_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout = Duration::from_secs(secs),
                _ => warn!("ignoring DUGOUT_TIMEOUT_SECS={secs}"),
            }
        }

        if let Some(a) = get("DUGOUT_PLAYER_A") {
            settings.initial_players[0] = a;
        }
        if let Some(b) = get("DUGOUT_PLAYER_B") {
            settings.initial_players[1] = b;
        }

        if let Some(view) = get("DUGOUT_VIEW") {
            match ViewMode::parse(&view) {
                Some(view) => settings.initial_view = view,
                None => warn!("ignoring DUGOUT_VIEW={view}"),
            }
        }

        settings
    }
}

use std::env;
use std::time::Duration;

pub const DEFAULT_GRID_SIZE: usize = 10;
pub const MAX_GRID_SIZE: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    Api,
    Demo,
}

/// Startup configuration, resolved once from the environment and handed
/// to the provider. Call sites never re-read env vars.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub heatmap_poll: Duration,
    pub stats_poll: Duration,
    pub grid_size: usize,
    pub feed: FeedSource,
}

impl Config {
    pub fn from_env() -> Self {
        let base_url = env::var("KORFBAL_API_BASE_URL")
            .ok()
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| "http://127.0.0.1:8000/api".to_string());

        let heatmap_poll = Duration::from_secs(poll_secs_env("HEATMAP_POLL_SECS"));
        let stats_poll = Duration::from_secs(poll_secs_env("STATS_POLL_SECS"));

        let grid_size = env::var("GRID_SIZE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_GRID_SIZE)
            .clamp(1, MAX_GRID_SIZE);

        let feed = match env::var("KORFBAL_FEED")
            .unwrap_or_else(|_| "api".to_string())
            .to_lowercase()
            .as_str()
        {
            "demo" | "fake" => FeedSource::Demo,
            _ => FeedSource::Api,
        };

        Self {
            base_url,
            heatmap_poll,
            stats_poll,
            grid_size,
            feed,
        }
    }
}

fn poll_secs_env(key: &str) -> u64 {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(3)
        .max(1)
}

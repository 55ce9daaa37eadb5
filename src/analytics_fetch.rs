use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// One observed shot position, normalized to the court. `value` is the
/// intensity weight the analytics service attaches to the cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapResponse {
    #[serde(default)]
    pub points: Vec<ShotPoint>,
    pub grid_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStat {
    pub player_id: String,
    #[serde(default)]
    pub player_name: Option<String>,
    pub attempts: u32,
    pub goals: u32,
    pub accuracy: f64,
}

impl PlayerStat {
    pub fn display_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or(&self.player_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotRecord {
    pub player_id: String,
    #[serde(default)]
    pub player_name: Option<String>,
    pub scored: bool,
    pub timestamp: String,
    pub confidence: f64,
}

impl ShotRecord {
    pub fn display_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or(&self.player_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub shots: Vec<ShotRecord>,
    #[serde(default)]
    pub players: Vec<PlayerStat>,
}

pub fn fetch_heatmap(base_url: &str, grid_size: usize) -> Result<HeatmapResponse> {
    let url = format!("{}/heatmap?grid_size={grid_size}", base_url.trim_end_matches('/'));
    let body = fetch_body(&url).context("heatmap request failed")?;
    parse_heatmap_json(&body)
}

pub fn fetch_stats(base_url: &str) -> Result<StatsResponse> {
    let url = format!("{}/stats", base_url.trim_end_matches('/'));
    let body = fetch_body(&url).context("stats request failed")?;
    parse_stats_json(&body)
}

fn fetch_body(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("API fout ({})", status.as_u16()));
    }
    resp.text().context("failed reading body")
}

pub fn parse_heatmap_json(raw: &str) -> Result<HeatmapResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(HeatmapResponse {
            points: Vec::new(),
            grid_size: 0,
        });
    }
    serde_json::from_str(trimmed).context("invalid heatmap json")
}

pub fn parse_stats_json(raw: &str) -> Result<StatsResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(StatsResponse {
            shots: Vec::new(),
            players: Vec::new(),
        });
    }
    serde_json::from_str(trimmed).context("invalid stats json")
}

use std::collections::VecDeque;
use std::time::SystemTime;

use crate::analytics_fetch::{PlayerStat, ShotPoint, ShotRecord};
use crate::heatmap::{self, BucketMode};

pub const LAST_SHOTS_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Goals,
    Accuracy,
    Attempts,
    Name,
}

/// Last successful heatmap poll. The grid is bucketed fresh from the
/// points on every refresh; nothing carries over between polls.
#[derive(Debug, Clone)]
pub struct HeatmapSnapshot {
    pub points: Vec<ShotPoint>,
    pub grid_size: usize,
    pub grid: Vec<Vec<f64>>,
    pub fetched_at: SystemTime,
}

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub shots: Vec<ShotRecord>,
    pub players: Vec<PlayerStat>,
    pub fetched_at: SystemTime,
}

impl StatsSnapshot {
    /// Most recent shots first, capped for the tape display.
    pub fn recent_shots(&self) -> Vec<&ShotRecord> {
        self.shots.iter().rev().take(LAST_SHOTS_SHOWN).collect()
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetHeatmap {
        points: Vec<ShotPoint>,
        grid_size: usize,
    },
    SetStats {
        shots: Vec<ShotRecord>,
        players: Vec<PlayerStat>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchHeatmap,
    FetchStats,
    SetGridSize(usize),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub heatmap: Option<HeatmapSnapshot>,
    pub stats: Option<StatsSnapshot>,
    pub sort: SortMode,
    pub selected: usize,
    pub grid_size: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(grid_size: usize) -> Self {
        Self {
            heatmap: None,
            stats: None,
            sort: SortMode::Goals,
            selected: 0,
            grid_size,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort = match self.sort {
            SortMode::Goals => SortMode::Accuracy,
            SortMode::Accuracy => SortMode::Attempts,
            SortMode::Attempts => SortMode::Name,
            SortMode::Name => SortMode::Goals,
        };
        self.sort_players();
    }

    pub fn sort_players(&mut self) {
        let selected_id = self.selected_player_id();
        self.sort_players_with_selected_id(selected_id);
    }

    pub fn selected_player_id(&self) -> Option<String> {
        self.stats
            .as_ref()
            .and_then(|s| s.players.get(self.selected))
            .map(|p| p.player_id.clone())
    }

    pub fn sort_players_with_selected_id(&mut self, selected_id: Option<String>) {
        let Some(stats) = self.stats.as_mut() else {
            return;
        };

        match self.sort {
            SortMode::Goals => stats.players.sort_by(|a, b| {
                b.goals.cmp(&a.goals).then_with(|| {
                    b.accuracy
                        .partial_cmp(&a.accuracy)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            }),
            SortMode::Accuracy => stats.players.sort_by(|a, b| {
                b.accuracy
                    .partial_cmp(&a.accuracy)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.goals.cmp(&a.goals))
            }),
            SortMode::Attempts => stats
                .players
                .sort_by(|a, b| b.attempts.cmp(&a.attempts).then(b.goals.cmp(&a.goals))),
            SortMode::Name => stats
                .players
                .sort_by(|a, b| a.display_name().cmp(b.display_name())),
        }

        // Keep the cursor on the same player across re-sorts.
        if let Some(id) = selected_id
            && let Some(pos) = stats.players.iter().position(|p| p.player_id == id)
        {
            self.selected = pos;
            return;
        }
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let total = self.player_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.player_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.player_count();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    fn player_count(&self) -> usize {
        self.stats.as_ref().map_or(0, |s| s.players.len())
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetHeatmap { points, grid_size } => {
            let grid = heatmap::bucket_points(&points, grid_size, BucketMode::Overwrite);
            state.heatmap = Some(HeatmapSnapshot {
                points,
                grid_size,
                grid,
                fetched_at: SystemTime::now(),
            });
        }
        Delta::SetStats { shots, players } => {
            // Capture the cursor before the snapshot is replaced wholesale.
            let selected_id = state.selected_player_id();
            state.stats = Some(StatsSnapshot {
                shots,
                players,
                fetched_at: SystemTime::now(),
            });
            state.sort_players_with_selected_id(selected_id);
            state.clamp_selection();
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Goals => "DOELPUNTEN",
        SortMode::Accuracy => "NAUWKEURIGHEID",
        SortMode::Attempts => "POGINGEN",
        SortMode::Name => "NAAM",
    }
}

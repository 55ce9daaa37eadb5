use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use rand::Rng;

use crate::analytics_fetch::{PlayerStat, ShotPoint, ShotRecord};
use crate::config::Config;
use crate::provider::ProviderHandle;
use crate::state::{Delta, ProviderCommand};

const TICK: Duration = Duration::from_millis(300);
const RETENTION: Duration = Duration::from_secs(120);
const MAX_SHOTS: usize = 400;

// Jersey-tracked ids, some without a resolved name so the table falls
// back to the raw id.
const PLAYER_POOL: &[(&str, Option<&str>)] = &[
    ("tracker-7", Some("Daan de Vries")),
    ("tracker-8", Some("Sanne Bakker")),
    ("tracker-9", Some("Luuk Visser")),
    ("tracker-10", Some("Femke Jansen")),
    ("tracker-11", None),
    ("tracker-12", Some("Bram Mulder")),
    ("tracker-14", Some("Lotte Smit")),
    ("tracker-16", None),
];

struct FakeShot {
    seen_at: Instant,
    x: f64,
    y: f64,
    record: ShotRecord,
}

/// Synthetic stand-in for the analytics API: generates a rolling window
/// of shots and answers the same commands the real provider does.
pub fn spawn_fake_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: Config,
) -> ProviderHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let join = thread::spawn(move || run_fake_provider(tx, cmd_rx, config, flag));
    ProviderHandle::new(shutdown, join)
}

fn run_fake_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: Config,
    shutdown: Arc<AtomicBool>,
) {
    let mut rng = rand::thread_rng();
    let mut shots: VecDeque<FakeShot> = VecDeque::with_capacity(64);
    let mut grid_size = config.grid_size;

    let mut last_heatmap = Instant::now() - config.heatmap_poll;
    let mut last_stats = Instant::now() - config.stats_poll;

    let _ = tx.send(Delta::Log("[INFO] Demo feed actief (geen API)".to_string()));

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        if rng.gen_bool(0.35) {
            shots.push_back(random_shot(&mut rng));
        }
        prune(&mut shots);

        loop {
            match cmd_rx.try_recv() {
                Ok(ProviderCommand::FetchHeatmap) => {
                    send_heatmap(&tx, &shots, grid_size);
                    last_heatmap = Instant::now();
                }
                Ok(ProviderCommand::FetchStats) => {
                    send_stats(&tx, &shots);
                    last_stats = Instant::now();
                }
                Ok(ProviderCommand::SetGridSize(size)) => {
                    grid_size = size;
                    send_heatmap(&tx, &shots, grid_size);
                    last_heatmap = Instant::now();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        if last_heatmap.elapsed() >= config.heatmap_poll {
            send_heatmap(&tx, &shots, grid_size);
            last_heatmap = Instant::now();
        }
        if last_stats.elapsed() >= config.stats_poll {
            send_stats(&tx, &shots);
            last_stats = Instant::now();
        }

        thread::sleep(TICK);
    }
}

fn random_shot(rng: &mut impl Rng) -> FakeShot {
    let (player_id, player_name) = PLAYER_POOL[rng.gen_range(0..PLAYER_POOL.len())];
    let scored = rng.gen_bool(0.3);
    FakeShot {
        seen_at: Instant::now(),
        x: rng.gen_range(0.0..1.0),
        y: rng.gen_range(0.0..1.0),
        record: ShotRecord {
            player_id: player_id.to_string(),
            player_name: player_name.map(str::to_string),
            scored,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            confidence: rng.gen_range(0.55..0.99),
        },
    }
}

fn prune(shots: &mut VecDeque<FakeShot>) {
    while let Some(front) = shots.front() {
        if front.seen_at.elapsed() <= RETENTION && shots.len() <= MAX_SHOTS {
            break;
        }
        shots.pop_front();
    }
}

// Same aggregation the analytics service applies: scored shots weigh 1.0,
// misses 0.5, summed per cell, emitted as cell-center points.
fn send_heatmap(tx: &Sender<Delta>, shots: &VecDeque<FakeShot>, grid_size: usize) {
    let mut grid = vec![vec![0.0_f64; grid_size]; grid_size];
    for shot in shots {
        let gx = ((shot.x * grid_size as f64) as usize).min(grid_size - 1);
        let gy = ((shot.y * grid_size as f64) as usize).min(grid_size - 1);
        grid[gy][gx] += if shot.record.scored { 1.0 } else { 0.5 };
    }

    let mut points = Vec::new();
    for (y, row) in grid.iter().enumerate() {
        for (x, value) in row.iter().enumerate() {
            if *value <= 0.0 {
                continue;
            }
            points.push(ShotPoint {
                x: (x as f64 + 0.5) / grid_size as f64,
                y: (y as f64 + 0.5) / grid_size as f64,
                value: *value,
            });
        }
    }

    let _ = tx.send(Delta::SetHeatmap { points, grid_size });
}

fn send_stats(tx: &Sender<Delta>, shots: &VecDeque<FakeShot>) {
    let mut players: Vec<PlayerStat> = Vec::new();
    for shot in shots {
        let record = &shot.record;
        match players.iter_mut().find(|p| p.player_id == record.player_id) {
            Some(entry) => {
                entry.attempts += 1;
                if record.scored {
                    entry.goals += 1;
                }
            }
            None => players.push(PlayerStat {
                player_id: record.player_id.clone(),
                player_name: record.player_name.clone(),
                attempts: 1,
                goals: u32::from(record.scored),
                accuracy: 0.0,
            }),
        }
    }
    for player in &mut players {
        player.accuracy = if player.attempts > 0 {
            f64::from(player.goals) / f64::from(player.attempts)
        } else {
            0.0
        };
    }
    players.sort_by(|a, b| b.goals.cmp(&a.goals));

    let records = shots.iter().map(|s| s.record.clone()).collect();
    let _ = tx.send(Delta::SetStats {
        shots: records,
        players,
    });
}

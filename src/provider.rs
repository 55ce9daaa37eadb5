use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::analytics_fetch;
use crate::config::Config;
use crate::state::{Delta, ProviderCommand};

const TICK: Duration = Duration::from_millis(150);

/// Handle owned by the UI. Dropping the command sender alone would also
/// stop the provider, but teardown calls `stop` explicitly so the loop
/// exits before the terminal is restored.
pub struct ProviderHandle {
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ProviderHandle {
    pub(crate) fn new(shutdown: Arc<AtomicBool>, join: JoinHandle<()>) -> Self {
        Self {
            shutdown,
            join: Some(join),
        }
    }

    pub fn stop(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: Config,
) -> ProviderHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let join = thread::spawn(move || run_provider(tx, cmd_rx, config, flag));
    ProviderHandle::new(shutdown, join)
}

fn run_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: Config,
    shutdown: Arc<AtomicBool>,
) {
    let mut grid_size = config.grid_size;

    // Seed both timers in the past so the first tick fetches immediately.
    let mut last_heatmap = Instant::now() - config.heatmap_poll;
    let mut last_stats = Instant::now() - config.stats_poll;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(ProviderCommand::FetchHeatmap) => {
                    dispatch_heatmap(&tx, &config.base_url, grid_size);
                    last_heatmap = Instant::now();
                }
                Ok(ProviderCommand::FetchStats) => {
                    dispatch_stats(&tx, &config.base_url);
                    last_stats = Instant::now();
                }
                Ok(ProviderCommand::SetGridSize(size)) => {
                    grid_size = size;
                    dispatch_heatmap(&tx, &config.base_url, grid_size);
                    last_heatmap = Instant::now();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        // Each interval fires regardless of whether the prior fetch finished;
        // overlapping requests are allowed and the snapshot layer lets the
        // most recently completed response win.
        if last_heatmap.elapsed() >= config.heatmap_poll {
            dispatch_heatmap(&tx, &config.base_url, grid_size);
            last_heatmap = Instant::now();
        }
        if last_stats.elapsed() >= config.stats_poll {
            dispatch_stats(&tx, &config.base_url);
            last_stats = Instant::now();
        }

        thread::sleep(TICK);
    }
}

fn dispatch_heatmap(tx: &Sender<Delta>, base_url: &str, grid_size: usize) {
    let tx = tx.clone();
    let base_url = base_url.to_string();
    thread::spawn(move || match analytics_fetch::fetch_heatmap(&base_url, grid_size) {
        Ok(resp) => {
            let _ = tx.send(Delta::SetHeatmap {
                points: resp.points,
                grid_size: resp.grid_size,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Heatmap fetch: {err:#}")));
        }
    });
}

fn dispatch_stats(tx: &Sender<Delta>, base_url: &str) {
    let tx = tx.clone();
    let base_url = base_url.to_string();
    thread::spawn(move || match analytics_fetch::fetch_stats(&base_url) {
        Ok(resp) => {
            let _ = tx.send(Delta::SetStats {
                shots: resp.shots,
                players: resp.players,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Stats fetch: {err:#}")));
        }
    });
}

use korfbal_terminal::analytics_fetch::{PlayerStat, ShotPoint, ShotRecord};
use korfbal_terminal::state::{AppState, Delta, apply_delta};

fn player(id: &str, attempts: u32, goals: u32) -> PlayerStat {
    PlayerStat {
        player_id: id.to_string(),
        player_name: None,
        attempts,
        goals,
        accuracy: if attempts > 0 {
            f64::from(goals) / f64::from(attempts)
        } else {
            0.0
        },
    }
}

fn shot(id: &str, scored: bool, timestamp: &str) -> ShotRecord {
    ShotRecord {
        player_id: id.to_string(),
        player_name: None,
        scored,
        timestamp: timestamp.to_string(),
        confidence: 0.8,
    }
}

#[test]
fn set_heatmap_buckets_fresh_grid() {
    let mut state = AppState::new(10);
    apply_delta(
        &mut state,
        Delta::SetHeatmap {
            points: vec![ShotPoint {
                x: 0.15,
                y: 0.25,
                value: 4.2,
            }],
            grid_size: 10,
        },
    );

    let snapshot = state.heatmap.as_ref().expect("heatmap loaded");
    assert_eq!(snapshot.grid_size, 10);
    assert_eq!(snapshot.grid[2][1], 4.2);

    // The next poll replaces the snapshot wholesale.
    apply_delta(
        &mut state,
        Delta::SetHeatmap {
            points: vec![ShotPoint {
                x: 0.95,
                y: 0.95,
                value: 1.0,
            }],
            grid_size: 4,
        },
    );
    let snapshot = state.heatmap.as_ref().expect("heatmap loaded");
    assert_eq!(snapshot.grid_size, 4);
    assert_eq!(snapshot.grid.len(), 4);
    assert_eq!(snapshot.grid[3][3], 1.0);
    assert_eq!(snapshot.points.len(), 1);
}

#[test]
fn set_stats_replaces_wholesale_and_sorts() {
    let mut state = AppState::new(10);
    apply_delta(
        &mut state,
        Delta::SetStats {
            shots: vec![shot("a", true, "2026-05-17T14:03:21Z")],
            players: vec![player("a", 4, 1), player("b", 6, 5)],
        },
    );

    let snapshot = state.stats.as_ref().expect("stats loaded");
    // Default sort is goals, descending.
    assert_eq!(snapshot.players[0].player_id, "b");
    assert_eq!(snapshot.players[1].player_id, "a");

    apply_delta(
        &mut state,
        Delta::SetStats {
            shots: Vec::new(),
            players: vec![player("c", 2, 2)],
        },
    );
    let snapshot = state.stats.as_ref().expect("stats loaded");
    assert_eq!(snapshot.players.len(), 1);
    assert!(snapshot.shots.is_empty());
    assert_eq!(state.selected, 0);
}

#[test]
fn log_delta_keeps_existing_snapshots() {
    let mut state = AppState::new(10);
    apply_delta(
        &mut state,
        Delta::SetHeatmap {
            points: vec![ShotPoint {
                x: 0.5,
                y: 0.5,
                value: 2.0,
            }],
            grid_size: 10,
        },
    );
    apply_delta(
        &mut state,
        Delta::SetStats {
            shots: Vec::new(),
            players: vec![player("a", 1, 1)],
        },
    );

    // A failed poll only logs; stale data stays on screen.
    apply_delta(
        &mut state,
        Delta::Log("[WARN] Heatmap fetch: API fout (503)".to_string()),
    );
    assert!(state.heatmap.is_some());
    assert!(state.stats.is_some());
    assert_eq!(state.logs.len(), 1);
}

#[test]
fn log_is_capped() {
    let mut state = AppState::new(10);
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] melding {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] melding 50"));
}

#[test]
fn selection_clamps_when_players_shrink() {
    let mut state = AppState::new(10);
    apply_delta(
        &mut state,
        Delta::SetStats {
            shots: Vec::new(),
            players: vec![player("a", 1, 0), player("b", 2, 1), player("c", 3, 2)],
        },
    );
    state.select_next();
    state.select_next();
    assert_eq!(state.selected, 2);

    apply_delta(
        &mut state,
        Delta::SetStats {
            shots: Vec::new(),
            players: vec![player("d", 1, 0)],
        },
    );
    assert_eq!(state.selected, 0);
}

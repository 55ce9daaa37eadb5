use korfbal_terminal::analytics_fetch::{PlayerStat, ShotRecord};
use korfbal_terminal::state::{AppState, Delta, SortMode, StatsSnapshot, apply_delta, sort_label};

fn player(id: &str, name: Option<&str>, attempts: u32, goals: u32, accuracy: f64) -> PlayerStat {
    PlayerStat {
        player_id: id.to_string(),
        player_name: name.map(str::to_string),
        attempts,
        goals,
        accuracy,
    }
}

fn shot(id: &str, timestamp: &str) -> ShotRecord {
    ShotRecord {
        player_id: id.to_string(),
        player_name: None,
        scored: false,
        timestamp: timestamp.to_string(),
        confidence: 0.7,
    }
}

fn loaded_state() -> AppState {
    let mut state = AppState::new(10);
    apply_delta(
        &mut state,
        Delta::SetStats {
            shots: Vec::new(),
            players: vec![
                player("p1", Some("Anna"), 10, 2, 0.2),
                player("p2", Some("Bo"), 4, 3, 0.75),
                player("p3", None, 8, 3, 0.375),
            ],
        },
    );
    state
}

#[test]
fn cycle_sort_walks_all_modes() {
    let mut state = loaded_state();
    assert_eq!(state.sort, SortMode::Goals);
    state.cycle_sort();
    assert_eq!(state.sort, SortMode::Accuracy);
    state.cycle_sort();
    assert_eq!(state.sort, SortMode::Attempts);
    state.cycle_sort();
    assert_eq!(state.sort, SortMode::Name);
    state.cycle_sort();
    assert_eq!(state.sort, SortMode::Goals);
}

#[test]
fn goals_sort_breaks_ties_on_accuracy() {
    let state = loaded_state();
    let players = &state.stats.as_ref().unwrap().players;
    // p2 and p3 both have 3 goals; p2 has the better accuracy.
    assert_eq!(players[0].player_id, "p2");
    assert_eq!(players[1].player_id, "p3");
    assert_eq!(players[2].player_id, "p1");
}

#[test]
fn name_sort_uses_display_name_fallback() {
    let mut state = loaded_state();
    state.sort = SortMode::Name;
    state.sort_players();
    let players = &state.stats.as_ref().unwrap().players;
    // "p3" has no name and sorts on its raw id.
    assert_eq!(players[0].display_name(), "Anna");
    assert_eq!(players[1].display_name(), "Bo");
    assert_eq!(players[2].display_name(), "p3");
}

#[test]
fn sort_keeps_cursor_on_same_player() {
    let mut state = loaded_state();
    // Move the cursor to p1, last under the goals sort.
    state.select_next();
    state.select_next();
    assert_eq!(state.selected_player_id().as_deref(), Some("p1"));

    // Attempts sort puts p1 (10 attempts) first; the cursor follows.
    state.cycle_sort();
    state.cycle_sort();
    assert_eq!(state.sort, SortMode::Attempts);
    assert_eq!(state.selected, 0);
    assert_eq!(state.selected_player_id().as_deref(), Some("p1"));
}

#[test]
fn selection_wraps_both_ways() {
    let mut state = loaded_state();
    assert_eq!(state.selected, 0);
    state.select_prev();
    assert_eq!(state.selected, 2);
    state.select_next();
    assert_eq!(state.selected, 0);
}

#[test]
fn selection_is_noop_without_data() {
    let mut state = AppState::new(10);
    state.select_next();
    state.select_prev();
    assert_eq!(state.selected, 0);
}

#[test]
fn recent_shots_are_most_recent_first_capped_at_five() {
    let snapshot = StatsSnapshot {
        shots: (0..8)
            .map(|i| shot(&format!("p{i}"), &format!("2026-05-17T14:00:0{i}Z")))
            .collect(),
        players: Vec::new(),
        fetched_at: std::time::SystemTime::now(),
    };

    let recent = snapshot.recent_shots();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].player_id, "p7");
    assert_eq!(recent[4].player_id, "p3");
}

#[test]
fn sort_labels_are_stable() {
    assert_eq!(sort_label(SortMode::Goals), "DOELPUNTEN");
    assert_eq!(sort_label(SortMode::Name), "NAAM");
}

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDateTime};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use korfbal_terminal::config::{Config, FeedSource, MAX_GRID_SIZE};
use korfbal_terminal::fake_feed;
use korfbal_terminal::heatmap::max_intensity;
use korfbal_terminal::provider;
use korfbal_terminal::state::{
    AppState, Delta, HeatmapSnapshot, LAST_SHOTS_SHOWN, ProviderCommand, StatsSnapshot,
    apply_delta, sort_label,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    feed: FeedSource,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>, config: &Config) -> Self {
        Self {
            state: AppState::new(config.grid_size),
            should_quit: false,
            cmd_tx,
            feed: config.feed,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('s') => self.state.cycle_sort(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_grid_size(1),
            KeyCode::Char('-') => self.adjust_grid_size(-1),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_refresh(&mut self) {
        let ok = self.cmd_tx.send(ProviderCommand::FetchHeatmap).is_ok()
            && self.cmd_tx.send(ProviderCommand::FetchStats).is_ok();
        if ok {
            self.state.push_log("[INFO] Verversen aangevraagd");
        } else {
            self.state.push_log("[WARN] Feed niet bereikbaar");
        }
    }

    fn adjust_grid_size(&mut self, step: i64) {
        let next = (self.state.grid_size as i64 + step).clamp(1, MAX_GRID_SIZE as i64) as usize;
        if next == self.state.grid_size {
            return;
        }
        self.state.grid_size = next;
        if self
            .cmd_tx
            .send(ProviderCommand::SetGridSize(next))
            .is_err()
        {
            self.state.push_log("[WARN] Feed niet bereikbaar");
            return;
        }
        self.state.push_log(format!("[INFO] Raster {next}x{next}"));
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = match config.feed {
        FeedSource::Api => provider::spawn_provider(tx, cmd_rx, config.clone()),
        FeedSource::Demo => fake_feed::spawn_fake_provider(tx, cmd_rx, config.clone()),
    };

    let mut app = App::new(cmd_tx, &config);
    let res = run_app(&mut terminal, &mut app, rx);

    // Stop polling before the terminal is handed back.
    drop(app);
    handle.stop();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_heatmap_card(frame, columns[0], &app.state);
    render_stats_card(frame, columns[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text()).block(Block::default());
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let feed = match app.feed {
        FeedSource::Api => "API",
        FeedSource::Demo => "DEMO",
    };
    let line1 = format!(
        "  KORFBAL LIVE ANALYTICS | Feed: {feed} | Raster: {n}x{n} | Sort: {sort}",
        n = app.state.grid_size,
        sort = sort_label(app.state.sort)
    );
    let line2 = "  Heatmaps tonen waar schoten genomen worden; de tabel de efficiëntie per speler."
        .to_string();
    format!("{line1}\n{line2}")
}

fn footer_text() -> String {
    "j/k/↑/↓ Speler | s Sorteer | r Ververs | +/- Raster | ? Help | q Stop".to_string()
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Nog geen meldingen".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(1)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_heatmap_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Schot heatmap").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(snapshot) = &state.heatmap else {
        let loading =
            Paragraph::new("Heatmap laden...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, inner);
        return;
    };

    if snapshot.grid_size == 0 || snapshot.points.is_empty() {
        let empty = Paragraph::new("Nog geen schoten geregistreerd.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let badge = Paragraph::new(heatmap_badge(snapshot))
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(badge, sections[0]);

    render_heatmap_grid(frame, sections[1], snapshot);
}

fn heatmap_badge(snapshot: &HeatmapSnapshot) -> String {
    let age = snapshot
        .fetched_at
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "Live geüpdatet {age}s geleden · {} schotzones · piek {:.1}",
        snapshot.points.len(),
        max_intensity(&snapshot.grid)
    )
}

fn render_heatmap_grid(frame: &mut Frame, area: Rect, snapshot: &HeatmapSnapshot) {
    let n = u16::try_from(snapshot.grid_size).unwrap_or(u16::MAX);
    let cell_w = area.width / n;
    let cell_h = area.height / n;
    if cell_w == 0 || cell_h == 0 {
        let cramped = Paragraph::new("Heatmap heeft meer ruimte nodig")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(cramped, area);
        return;
    }

    for (row, cells) in snapshot.grid.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            let cell_area = Rect {
                x: area.x + col as u16 * cell_w,
                y: area.y + row as u16 * cell_h,
                width: cell_w,
                height: cell_h,
            };
            let style = Style::default().bg(intensity_color(*value));
            frame.render_widget(Block::default().style(style), cell_area);

            if *value > 0.0 && cell_w >= 4 {
                let label = Rect {
                    x: cell_area.x,
                    y: cell_area.y + cell_area.height / 2,
                    width: cell_area.width,
                    height: 1,
                };
                let text = Paragraph::new(format!("{value:.1}"))
                    .style(style.fg(Color::White))
                    .alignment(Alignment::Center);
                frame.render_widget(text, label);
            }
        }
    }
}

// Sky-blue ramp against the dark background, saturating at 5 shots per
// cell, matching rgba(56, 189, 248, value / 5).
fn intensity_color(value: f64) -> Color {
    let alpha = (value / 5.0).clamp(0.0, 1.0);
    Color::Rgb(
        (56.0 * alpha) as u8,
        (189.0 * alpha) as u8,
        (248.0 * alpha) as u8,
    )
}

fn render_stats_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Spelerstatistieken")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(snapshot) = &state.stats else {
        let loading = Paragraph::new("Statistieken laden...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, inner);
        return;
    };

    if snapshot.players.is_empty() {
        let empty = Paragraph::new("Nog geen data beschikbaar.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let tape_height = (LAST_SHOTS_SHOWN as u16 + 1).min(inner.height / 2);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(tape_height)])
        .split(inner);

    render_player_table(frame, sections[0], state, snapshot);
    render_shot_tape(frame, sections[1], snapshot);
}

fn player_columns() -> [Constraint; 4] {
    [
        Constraint::Min(14),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(15),
    ]
}

fn render_player_table(frame: &mut Frame, area: Rect, state: &AppState, snapshot: &StatsSnapshot) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = player_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "Speler", header_style);
    render_cell_text(frame, header_cols[1], "Pogingen", header_style);
    render_cell_text(frame, header_cols[2], "Doelpunten", header_style);
    render_cell_text(frame, header_cols[3], "Nauwkeurigheid", header_style);

    let list_area = sections[1];
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, snapshot.players.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let player = &snapshot.players[idx];
        render_cell_text(frame, cols[0], player.display_name(), row_style);
        render_cell_text(frame, cols[1], &player.attempts.to_string(), row_style);
        render_cell_text(frame, cols[2], &player.goals.to_string(), row_style);
        render_cell_text(
            frame,
            cols[3],
            &format!("{:.1}%", player.accuracy * 100.0),
            row_style,
        );
    }
}

fn render_shot_tape(frame: &mut Frame, area: Rect, snapshot: &StatsSnapshot) {
    if area.height == 0 {
        return;
    }

    let title = Paragraph::new("Laatste schoten")
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(
        title,
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    let recent = snapshot.recent_shots();
    if recent.is_empty() {
        if area.height > 1 {
            let empty = Paragraph::new("Nog geen schoten")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(
                empty,
                Rect {
                    x: area.x,
                    y: area.y + 1,
                    width: area.width,
                    height: 1,
                },
            );
        }
        return;
    }

    for (i, shot) in recent.iter().enumerate() {
        let y = area.y + 1 + i as u16;
        if y >= area.y + area.height {
            break;
        }
        let row_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height: 1,
        };

        let badge = if shot.scored {
            Span::styled("Score", Style::default().fg(Color::Green))
        } else {
            Span::styled("Gemist", Style::default().fg(Color::DarkGray))
        };
        let line = Line::from(vec![
            Span::raw(format!("{} ", format_shot_time(&shot.timestamp))),
            Span::raw(format!("{} ", shot.display_name())),
            badge,
        ]);
        frame.render_widget(Paragraph::new(line), row_area);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn format_shot_time(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%H:%M:%S").to_string();
    }
    if let Some(dt) = parse_naive_timestamp(raw) {
        return dt.format("%H:%M:%S").to_string();
    }
    let cleaned = raw.trim();
    if cleaned.len() >= 19 {
        return cleaned[11..19].to_string();
    }
    cleaned.to_string()
}

fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw.trim(), fmt) {
            return Some(dt);
        }
    }
    None
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Korfbal Live Analytics - Help",
        "",
        "  j/k of ↑/↓   Speler selecteren",
        "  s            Sorteermodus wisselen",
        "  r            Beide widgets verversen",
        "  + / -        Rasterresolutie aanpassen",
        "  ?            Help tonen/verbergen",
        "  q            Stoppen",
        "",
        "De heatmap en statistieken verversen elke 3 seconden.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

//! Interactive player view
//!
//! Draws the station list and the session state, turns key presses into
//! `AppCommand`s, and redraws from the snapshots the controller publishes.

use std::io;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::*;

use airwave::library::Station;
use airwave::session::{PlaybackStatus, SessionState};
use airwave_app::app::AppCommand;

const VOLUME_STEP: f32 = 0.05;

/// A key press, decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Up,
    Down,
    Select,
    TogglePlayback,
    VolumeUp,
    VolumeDown,
    ToggleFavorite,
    Stop,
}

fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Action::TogglePlayback),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::VolumeUp),
        KeyCode::Char('-') => Some(Action::VolumeDown),
        KeyCode::Char('f') => Some(Action::ToggleFavorite),
        KeyCode::Char('s') => Some(Action::Stop),
        _ => None,
    }
}

struct App {
    stations: Vec<Station>,
    selected: usize,
    session: SessionState,
    running: bool,
}

impl App {
    fn new(stations: Vec<Station>, session: SessionState) -> Self {
        Self {
            stations,
            selected: 0,
            session,
            running: true,
        }
    }

    fn highlighted(&self) -> Option<&Station> {
        self.stations.get(self.selected)
    }

    /// Apply a key action; returns the command to send, if any
    fn handle(&mut self, action: Action) -> Option<AppCommand> {
        match action {
            Action::Quit => {
                self.running = false;
                None
            }
            Action::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            Action::Down => {
                if self.selected + 1 < self.stations.len() {
                    self.selected += 1;
                }
                None
            }
            Action::Select => self.highlighted().cloned().map(AppCommand::Select),
            Action::TogglePlayback => Some(AppCommand::TogglePlayback),
            Action::VolumeUp => Some(AppCommand::SetVolume(self.session.volume + VOLUME_STEP)),
            Action::VolumeDown => Some(AppCommand::SetVolume(self.session.volume - VOLUME_STEP)),
            Action::ToggleFavorite => self
                .highlighted()
                .or(self.session.current_station.as_ref())
                .cloned()
                .map(AppCommand::ToggleFavorite),
            Action::Stop => Some(AppCommand::Stop),
        }
    }
}

/// Run the view until the user quits
pub fn run(
    stations: Vec<Station>,
    initial: SessionState,
    commands: &Sender<AppCommand>,
    updates: &Receiver<SessionState>,
) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let result = match Terminal::new(backend) {
        Ok(mut terminal) => {
            let app = App::new(stations, initial);
            event_loop(&mut terminal, app, commands, updates)
        }
        Err(e) => Err(e),
    };

    // Restore terminal even when the loop failed
    terminal::disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    commands: &Sender<AppCommand>,
    updates: &Receiver<SessionState>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    while app.running {
        terminal.draw(|f| draw_ui(f, &app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = action_for(key.code).and_then(|a| app.handle(a)) {
                        if commands.send(cmd).is_err() {
                            // Controller is gone
                            app.running = false;
                        }
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            // Only the latest snapshot matters
            while let Ok(state) = updates.try_recv() {
                app.session = state;
            }
        }
    }
    Ok(())
}

// =============================================================================
// Drawing
// =============================================================================

fn draw_ui(f: &mut Frame, app: &App) {
    let area = f.area();

    let outer = Block::default()
        .title(format!(" Airwave v{} ", env!("CARGO_PKG_VERSION")))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // now playing
        Constraint::Min(3),    // station list
        Constraint::Length(1), // help bar
    ])
    .split(inner);

    draw_now_playing(f, app, chunks[0]);
    draw_stations(f, app, chunks[1]);
    draw_help(f, app, chunks[2]);
}

fn status_color(status: PlaybackStatus) -> Color {
    match status {
        PlaybackStatus::Playing => Color::Green,
        PlaybackStatus::Loading => Color::Yellow,
        PlaybackStatus::Paused => Color::Cyan,
        PlaybackStatus::Errored => Color::Red,
        PlaybackStatus::Idle => Color::DarkGray,
    }
}

fn draw_now_playing(f: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let (name, details, url) = match &session.current_station {
        Some(station) => {
            let max_url_len = area.width.saturating_sub(9) as usize;
            (
                station.name.as_str(),
                station_details(station),
                truncate_str(station.stream_url(), max_url_len),
            )
        }
        None => ("---", String::new(), String::new()),
    };

    let mut status = session.status.to_string();
    if session.buffering {
        status.push_str(" (buffering)");
    }

    let mut status_line = vec![
        Span::styled("  Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(status, Style::default().fg(status_color(session.status)).bold()),
    ];
    if let Some(error) = &session.last_error {
        status_line.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }

    let text = vec![
        Line::from(vec![
            Span::styled("  Station: ", Style::default().fg(Color::DarkGray)),
            Span::styled(name, Style::default().fg(Color::White).bold()),
        ]),
        Line::from(status_line),
        Line::from(vec![
            Span::styled("  Info: ", Style::default().fg(Color::DarkGray)),
            Span::styled(details, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("  URL: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url, Style::default().fg(Color::DarkGray)),
        ]),
    ];
    f.render_widget(Paragraph::new(text), area);
}

fn draw_stations(f: &mut Frame, app: &App, area: Rect) {
    let current = app.session.current_id();
    let items: Vec<ListItem> = app
        .stations
        .iter()
        .map(|station| {
            let marker = if app.session.is_favorite(&station.id) { "* " } else { "  " };
            let style = if Some(station.id.as_str()) == current {
                Style::default().fg(status_color(app.session.status))
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(station.name.clone(), style),
                Span::styled(
                    format!("  {}", station_details(station)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(format!(" Stations ({}) ", app.stations.len()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_help(f: &mut Frame, app: &App, area: Rect) {
    let help = Line::from(vec![
        Span::styled("  'q' ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  |  "),
        Span::styled("Enter ", Style::default().fg(Color::Yellow)),
        Span::raw("play  |  "),
        Span::styled("Space ", Style::default().fg(Color::Yellow)),
        Span::raw("pause  |  "),
        Span::styled("'s' ", Style::default().fg(Color::Yellow)),
        Span::raw("stop  |  "),
        Span::styled("'f' ", Style::default().fg(Color::Yellow)),
        Span::raw("favorite  |  "),
        Span::styled("'+'/'-' ", Style::default().fg(Color::Yellow)),
        Span::raw("volume  |  "),
        Span::styled(
            format!("Vol: {}%", (app.session.volume * 100.0).round() as u32),
            Style::default().fg(Color::Cyan).bold(),
        ),
    ]);

    f.render_widget(Paragraph::new(help).alignment(Alignment::Left), area);
}

/// Location, codec, and bitrate for one line of display
pub fn station_details(station: &Station) -> String {
    let mut parts = Vec::new();
    match station.location() {
        Some(location) => parts.push(location),
        None => parts.push(extract_host(station.stream_url()).to_string()),
    }
    let mut audio = station.codec.clone();
    if let Some(kbps) = station.bitrate_kbps() {
        if !audio.is_empty() {
            audio.push(' ');
        }
        audio.push_str(&format!("{kbps} kbps"));
    }
    if !audio.is_empty() {
        parts.push(audio);
    }
    parts.join("  |  ")
}

fn extract_host(url: &str) -> &str {
    url.split("//")
        .nth(1)
        .and_then(|s| s.split('/').next())
        .unwrap_or(url)
}

/// Shorten to `max` characters, marking the cut with "..."
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}

//! Airwave CLI: browse the Radio Browser directory and play stations

mod player;

use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use airwave::library::{Persistence, RecentList, Station};
use airwave_app::config::app::LOG_FILE;
use airwave_app::config::directory::RADIO_BROWSER_SERVERS;
use airwave_app::data::{ensure_config_dir, FileStore, Settings};
use airwave_app::directory::{Category, RadioBrowserDirectory, StationDirectory};
use airwave_app::error::{AppError, Result};

/// Environment variable holding the log filter
const LOG_ENV: &str = "AIRWAVE_LOG";

#[derive(Parser)]
#[command(name = "airwave", about = "Terminal internet radio directory and player", version)]
struct Cli {
    /// Directory server to try before the built-in list
    #[arg(long, global = true)]
    server: Option<String>,

    /// Media player executable
    #[arg(long, global = true)]
    player: Option<String>,

    /// Number of results per listing
    #[arg(long, global = true)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search stations by name
    Search { name: String },
    /// Stations carrying a tag (genre)
    Tag { tag: String },
    /// Stations from a country
    Country { country: String },
    /// Stations broadcasting in a language
    Language { language: String },
    /// Most popular stations
    Top {
        #[arg(long, value_enum, default_value_t = TopBy::Votes)]
        by: TopBy,
    },
    /// List tags by station count
    Tags,
    /// List countries by station count
    Countries,
    /// List languages by station count
    Languages,
    /// Show favorite stations
    Favorites,
    /// Show recently played stations
    Recent {
        /// Forget the listening history
        #[arg(long)]
        clear: bool,
    },
    /// Add or remove a favorite by station id
    Favorite { id: String },
    /// Open the interactive player
    Play {
        /// Station id to start playing
        id: Option<String>,
        /// Browse search results instead of the library
        #[arg(long, conflicts_with = "id")]
        search: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TopBy {
    Votes,
    Clicks,
}

/// Settings with command-line overrides applied
struct Options {
    servers: Vec<String>,
    player: String,
    limit: usize,
}

impl Options {
    fn resolve(cli: &Cli, settings: &Settings) -> Self {
        let mut settings = settings.clone();
        if let Some(server) = &cli.server {
            settings.directory_server = Some(server.clone());
        }
        Self {
            servers: settings.directory_servers(RADIO_BROWSER_SERVERS),
            player: cli.player.clone().unwrap_or(settings.player_command),
            limit: cli.limit.unwrap_or(settings.list_limit),
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Command::Play { .. }));

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

/// Install the tracing subscriber. The player view owns the terminal, so it
/// logs to a file in the config directory.
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let writer = if to_file {
        log_file_writer().unwrap_or_else(|| BoxMakeWriter::new(io::sink))
    } else {
        BoxMakeWriter::new(io::stderr)
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!to_file)
        .try_init();
}

fn log_file_writer() -> Option<BoxMakeWriter> {
    let path = ensure_config_dir().ok()?.join(LOG_FILE);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(BoxMakeWriter::new(Mutex::new(file))),
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            None
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load().unwrap_or_else(|e| {
        warn!(error = %e, "settings unreadable, using defaults");
        Settings::default()
    });
    let options = Options::resolve(&cli, &settings);
    let directory = Arc::new(RadioBrowserDirectory::with_servers(options.servers.clone())?);
    let limit = options.limit;

    match cli.command {
        Command::Search { name } => print_stations(&directory.search(&name, limit)?),
        Command::Tag { tag } => print_stations(&directory.by_tag(&tag, limit)?),
        Command::Country { country } => print_stations(&directory.by_country(&country, limit)?),
        Command::Language { language } => {
            print_stations(&directory.by_language(&language, limit)?)
        }
        Command::Top { by: TopBy::Votes } => print_stations(&directory.top_voted(limit)?),
        Command::Top { by: TopBy::Clicks } => print_stations(&directory.top_clicked(limit)?),
        Command::Tags => print_categories(&directory.tags(limit)?),
        Command::Countries => print_categories(&directory.countries(limit)?),
        Command::Languages => print_categories(&directory.languages(limit)?),
        Command::Favorites => {
            let persistence = Persistence::new(FileStore::open_default()?);
            print_stations(persistence.load_favorites().as_slice());
        }
        Command::Recent { clear } => {
            let mut persistence = Persistence::new(FileStore::open_default()?);
            if clear {
                persistence.save_recent(&RecentList::new())?;
                println!("Listening history cleared");
            } else {
                print_stations(persistence.load_recent().as_slice());
            }
        }
        Command::Favorite { id } => toggle_favorite(&*directory, &id)?,
        Command::Play { id, search } => {
            play(&options, directory, &mut settings, id, search)?;
        }
    }
    Ok(())
}

/// Flip a station's favorite flag, looking it up locally before asking the directory
fn toggle_favorite(directory: &dyn StationDirectory, id: &str) -> Result<()> {
    let mut persistence = Persistence::new(FileStore::open_default()?);
    let mut favorites = persistence.load_favorites();

    let known = favorites
        .iter()
        .chain(persistence.load_recent().iter())
        .find(|s| s.id == id)
        .cloned();
    let station = match known {
        Some(station) => station,
        None => directory
            .get_station(id)?
            .ok_or_else(|| AppError::NotFound(format!("station {id}")))?,
    };

    let added = favorites.toggle(&station);
    persistence.save_favorites(&favorites)?;
    if added {
        println!("Added '{}' to favorites", station.name);
    } else {
        println!("Removed '{}' from favorites", station.name);
    }
    Ok(())
}

#[cfg(unix)]
fn play(
    options: &Options,
    directory: Arc<RadioBrowserDirectory>,
    settings: &mut Settings,
    id: Option<String>,
    search: Option<String>,
) -> Result<()> {
    use airwave::media::MpvHandle;
    use airwave::session::SessionStore;
    use airwave_app::app::{AppCommand, AppController};

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let media = MpvHandle::with_player(options.player.as_str(), event_tx);
    let store = SessionStore::new(media, FileStore::open_default()?).with_volume(settings.volume);
    let initial = store.snapshot();

    let (stations, autoplay) = match (id, search) {
        (Some(id), _) => {
            let known = initial
                .favorites
                .iter()
                .chain(initial.recent.iter())
                .find(|s| s.id == id)
                .cloned();
            let station = match known {
                Some(station) => station,
                None => directory
                    .get_station(&id)?
                    .ok_or_else(|| AppError::NotFound(format!("station {id}")))?,
            };
            (vec![station], true)
        }
        (None, Some(query)) => (directory.search(&query, options.limit)?, false),
        (None, None) if !initial.favorites.is_empty() => {
            (initial.favorites.as_slice().to_vec(), false)
        }
        (None, None) if !initial.recent.is_empty() => {
            (initial.recent.as_slice().to_vec(), false)
        }
        (None, None) => (directory.top_voted(options.limit)?, false),
    };
    if stations.is_empty() {
        return Err(AppError::NotFound("no stations to play".to_string()));
    }

    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
    let mut controller = AppController::new(store, cmd_rx, event_rx).with_directory(directory);
    let updates = controller.subscribe();
    let handle = controller.spawn()?;

    if autoplay {
        let _ = cmd_tx.send(AppCommand::Select(stations[0].clone()));
    }
    let view = player::run(stations, initial, &cmd_tx, &updates);

    let _ = cmd_tx.send(AppCommand::Shutdown);
    match handle.join() {
        Ok(last) => {
            settings.set_volume(last.volume);
            if let Err(e) = settings.save() {
                warn!(error = %e, "settings not saved");
            }
            info!(favorites = last.favorites.len(), recent = last.recent.len(), "session closed");
        }
        Err(_) => warn!("controller thread panicked"),
    }
    view?;
    Ok(())
}

#[cfg(not(unix))]
fn play(
    _options: &Options,
    _directory: Arc<RadioBrowserDirectory>,
    _settings: &mut Settings,
    _id: Option<String>,
    _search: Option<String>,
) -> Result<()> {
    Err(AppError::Config("playback needs mpv IPC, which requires a unix platform".to_string()))
}

// =============================================================================
// Listing output
// =============================================================================

fn print_stations(stations: &[Station]) {
    if stations.is_empty() {
        println!("No stations found");
        return;
    }
    for (i, station) in stations.iter().enumerate() {
        println!("{}", format_station(i + 1, station));
    }
}

fn format_station(index: usize, station: &Station) -> String {
    let mut line = format!("{index:>3}. {}  [{}]", station.name, player::station_details(station));
    if !station.tags.is_empty() {
        line.push_str(&format!("  #{}", station.tags.join(" #")));
    }
    line.push_str(&format!("\n     id: {}", station.id));
    line
}

fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("Nothing found");
        return;
    }
    for category in categories {
        println!("{}", format_category(category));
    }
}

fn format_category(category: &Category) -> String {
    let name = player::truncate_str(&category.name, 40);
    match &category.code {
        Some(code) => format!("{name:<40} {:>7}  {code}", category.station_count),
        None => format!("{name:<40} {:>7}", category.station_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwave_app::directory::CategoryKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "airwave",
            "tag",
            "jazz",
            "--limit",
            "5",
            "--server",
            "https://m.example",
        ])
        .unwrap();
        assert_eq!(cli.limit, Some(5));
        assert_eq!(cli.server.as_deref(), Some("https://m.example"));
        assert!(matches!(cli.command, Command::Tag { ref tag } if tag == "jazz"));
    }

    #[test]
    fn test_parse_top_by_clicks() {
        let cli = Cli::try_parse_from(["airwave", "top", "--by", "clicks"]).unwrap();
        assert!(matches!(cli.command, Command::Top { by: TopBy::Clicks }));
    }

    #[test]
    fn test_play_id_conflicts_with_search() {
        assert!(Cli::try_parse_from(["airwave", "play", "abc", "--search", "bbc"]).is_err());
        assert!(Cli::try_parse_from(["airwave", "play", "--search", "bbc"]).is_ok());
    }

    #[test]
    fn test_options_apply_overrides() {
        let cli = Cli::try_parse_from([
            "airwave",
            "--player",
            "/opt/mpv",
            "--server",
            "https://m.example",
            "tags",
        ])
        .unwrap();
        let options = Options::resolve(&cli, &Settings::default());
        assert_eq!(options.player, "/opt/mpv");
        assert_eq!(options.limit, 50);
        assert_eq!(options.servers[0], "https://m.example");
        assert_eq!(options.servers.len(), RADIO_BROWSER_SERVERS.len() + 1);
    }

    #[test]
    fn test_format_station() {
        let station = Station::new("uuid-1", "Jazz FM", "http://jazz/stream")
            .with_country("France", "FR")
            .with_tags(["jazz", "smooth"]);
        assert_eq!(
            format_station(3, &station),
            "  3. Jazz FM  [France]  #jazz #smooth\n     id: uuid-1"
        );
    }

    #[test]
    fn test_format_category() {
        let cat = Category::new("Germany", CategoryKind::Country, 3000).with_code("DE");
        let line = format_category(&cat);
        assert!(line.starts_with("Germany "));
        assert!(line.ends_with("3000  DE"));
    }
}

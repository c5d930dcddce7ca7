//! Genreshelf - Browse books by genre from a rolling cache of catalog results
//!
//! A terminal UI that keeps a queue of books per genre, refilled from the
//! Google Books catalog, plus one-shot commands that print catalog results as
//! JSON.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use tracing::{info, warn};

use genreshelf::app::{App, AppState};
use genreshelf::cache::CacheManager;
use genreshelf::cli::{apply_overrides, Cli, Command, StartupConfig};
use genreshelf::config::Config;
use genreshelf::data::{AuthorClient, CatalogClient, SimilarQuery};
use genreshelf::logging::{self, LogTarget};
use genreshelf::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Loading => {
            render_loading(frame);
        }
        AppState::GenreList => {
            ui::render_genre_list(frame, app);
        }
        AppState::BookList(genre) => {
            ui::render_book_list(frame, app, genre);
        }
        AppState::BookDetail { index, .. } => {
            ui::render_book_detail(frame, app, *index);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while the cache warms up
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Filling the shelves...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs a one-shot catalog command and prints the result as JSON
async fn run_command(command: Command, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CatalogClient::from_config(&config.catalog)?;

    match command {
        Command::Browse { genre, limit } => {
            let books = catalog.browse(&genre, limit).await?;
            info!(genre = %genre, count = books.len(), "Browsed catalog");
            print_json(&books)
        }
        Command::Search { query, limit } => {
            let books = catalog.search(&query, limit).await?;
            info!(count = books.len(), "Searched catalog");
            print_json(&books)
        }
        Command::Similar {
            authors,
            categories,
            language,
            limit,
        } => {
            let query = SimilarQuery {
                authors,
                categories,
                language,
                limit,
            };
            print_json(&catalog.similar(&query).await?)
        }
        Command::Author { name } => {
            let details = author_client(config)?.fetch_author(&name).await?;
            if details.is_none() {
                warn!(name = %name, "No author details found");
            }
            print_json(&details)
        }
    }
}

/// Builds the author client with the catalog's user agent and timeout
fn author_client(config: &Config) -> Result<AuthorClient, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(&config.catalog.user_agent)
        .timeout(Duration::from_secs(config.catalog.timeout_secs))
        .build()?;
    Ok(AuthorClient::with_client(client, &config.author.base_url))
}

/// Runs the terminal UI until the user quits
async fn run_tui(config: Config, startup: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Arc::new(CatalogClient::from_config(&config.catalog)?);
    let cache = Arc::new(CacheManager::from_config(catalog, &config.cache));
    let mut app = App::new(cache, author_client(&config)?, config.cache.warm_limit)
        .with_startup_config(&startup);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, &app))?;

    app.start(startup.warm_on_start).await;

    // Main event loop
    loop {
        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Run cache work requested by the last key press
        if let Some(action) = app.take_pending_action() {
            app.perform(action).await;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => apply_overrides(&cli, config),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Validate genre before touching the terminal
    let startup = match StartupConfig::from_cli(&cli, &config) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    match cli.command {
        Some(command) => {
            logging::init(&config.logging, &LogTarget::Stderr)?;
            log_config_source(&cli.config);
            run_command(command, &config).await
        }
        None => {
            // Logging must stay off the screen while the UI owns it
            if let Some(target) = LogTarget::for_tui(&config.logging) {
                if let Err(e) = logging::init(&config.logging, &target) {
                    eprintln!("Warning: logging disabled: {}", e);
                }
            }
            log_config_source(&cli.config);
            run_tui(config, startup).await
        }
    }
}

/// Records which config file was used; call once the subscriber is installed
fn log_config_source(path: &Option<PathBuf>) {
    match Config::existing_file(path.as_deref()) {
        Some(file) => info!(path = %file.display(), "Loaded config file"),
        None => info!(?path, "No config file found, using defaults"),
    }
}

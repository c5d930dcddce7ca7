//! Application state management for Genreshelf
//!
//! This module contains the main application state, handling keyboard input,
//! cache operations, and state transitions between the different views.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::cache::{CacheManager, CategorySnapshot, ExtendOutcome};
use crate::cli::StartupConfig;
use crate::data::{AuthorClient, AuthorDetails, Book};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while the cache warms up
    Loading,
    /// List view showing every genre and its cache state
    GenreList,
    /// Books from the last drain of a genre
    BookList(String),
    /// Detail view for one drained book
    BookDetail { genre: String, index: usize },
}

/// Cache or lookup work requested by a key press, run by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    WarmUp,
    Drain(String),
    Extend(String),
    FetchAuthor(String),
}

/// One-line feedback shown at the bottom of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Author biography shown in the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorPanel {
    pub name: String,
    /// `None` when no biography was found
    pub details: Option<AuthorDetails>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of currently selected genre in list view
    pub selected_genre: usize,
    /// Index of currently selected book in the book list
    pub selected_book: usize,
    /// Cache state per genre, refreshed after every cache operation
    pub shelf: Vec<CategorySnapshot>,
    /// Books handed out by the last drain
    pub drained: Vec<Book>,
    /// Biography for the book in the detail view
    pub author: Option<AuthorPanel>,
    /// Feedback from the last operation
    pub status: Option<StatusMessage>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Timestamp of last cache refresh
    pub last_refresh: Option<DateTime<Local>>,
    /// Work to run on the next event loop turn
    pending: Option<PendingAction>,
    /// Batch limit for warm-ups and extends
    warm_limit: u32,
    cache: Arc<CacheManager>,
    author_client: AuthorClient,
}

impl App {
    /// Creates a new App instance in the loading state
    pub fn new(cache: Arc<CacheManager>, author_client: AuthorClient, warm_limit: u32) -> Self {
        let shelf = cache
            .categories()
            .map(|category| CategorySnapshot {
                category: category.to_string(),
                cursor: 0,
                queued: None,
            })
            .collect();

        Self {
            state: AppState::Loading,
            selected_genre: 0,
            selected_book: 0,
            shelf,
            drained: Vec::new(),
            author: None,
            status: None,
            should_quit: false,
            show_help: false,
            last_refresh: None,
            pending: None,
            warm_limit,
            cache,
            author_client,
        }
    }

    /// Applies CLI startup options such as `--genre`
    pub fn with_startup_config(mut self, config: &StartupConfig) -> Self {
        if let Some(ref genre) = config.initial_genre {
            if let Some(index) = self.shelf.iter().position(|s| &s.category == genre) {
                self.selected_genre = index;
            }
        }
        self
    }

    /// Returns the total number of genres
    pub fn genre_count(&self) -> usize {
        self.shelf.len()
    }

    /// Returns the currently selected genre, if any
    pub fn selected_genre(&self) -> Option<&str> {
        self.shelf
            .get(self.selected_genre)
            .map(|s| s.category.as_str())
    }

    /// Returns the book shown in the detail view, if any
    pub fn detail_book(&self) -> Option<&Book> {
        match self.state {
            AppState::BookDetail { index, .. } => self.drained.get(index),
            _ => None,
        }
    }

    /// Batch limit used for warm-ups and extends
    pub fn warm_limit(&self) -> u32 {
        self.warm_limit
    }

    /// Books handed out per drain
    pub fn drain_size(&self) -> usize {
        self.cache.drain_size()
    }

    /// Takes the action requested by the last key press
    pub fn take_pending_action(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Leaves the loading screen, warming the cache first when asked to
    pub async fn start(&mut self, warm: bool) {
        if warm {
            self.perform(PendingAction::WarmUp).await;
        } else {
            self.refresh_shelf().await;
        }
        self.state = AppState::GenreList;
    }

    /// Runs a cache or lookup action and records its outcome in the status line
    pub async fn perform(&mut self, action: PendingAction) {
        debug!(?action, "Performing action");

        match action {
            PendingAction::WarmUp => match self.cache.warm_up(self.warm_limit).await {
                Ok(summary) => {
                    let mut text = format!(
                        "Cached up to {} books in {} genres",
                        summary.limit,
                        summary.warmed.len()
                    );
                    if !summary.empty.is_empty() {
                        text.push_str(&format!(" (nothing new for {})", summary.empty.join(", ")));
                    }
                    self.status = Some(StatusMessage::info(text));
                }
                Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
            },
            PendingAction::Drain(genre) => match self.cache.consume(&genre).await {
                Ok(books) => {
                    self.status = Some(StatusMessage::info(format!(
                        "{} {} books",
                        books.len(),
                        genre
                    )));
                    self.drained = books;
                    self.selected_book = 0;
                    self.author = None;
                    self.state = AppState::BookList(genre);
                }
                Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
            },
            PendingAction::Extend(genre) => {
                match self.cache.extend(&genre, self.warm_limit).await {
                    Ok(ExtendOutcome::Appended { count }) => {
                        self.status = Some(StatusMessage::info(format!(
                            "Added {} books to {}",
                            count, genre
                        )));
                    }
                    Ok(ExtendOutcome::NoNewItems) => {
                        self.status = Some(StatusMessage::info(format!(
                            "No new books for {}",
                            genre
                        )));
                    }
                    Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
                }
            }
            PendingAction::FetchAuthor(name) => {
                match self.author_client.fetch_author(&name).await {
                    Ok(details) => {
                        if details.is_none() {
                            self.status = Some(StatusMessage::info(format!(
                                "No details found for {}",
                                name
                            )));
                        }
                        self.author = Some(AuthorPanel { name, details });
                    }
                    Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
                }
            }
        }

        self.refresh_shelf().await;
    }

    /// Reloads the per-genre cache state shown in the genre list
    pub async fn refresh_shelf(&mut self) {
        self.shelf = self.cache.snapshot().await;
        self.last_refresh = Some(Local::now());
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application (`Esc` too, in GenreList)
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Enter`/`c` (in GenreList): Drain the selected genre
    /// - `n` (in BookList): Drain the next batch of the same genre
    /// - `e`: Extend the current genre's cache
    /// - `w` (in GenreList): Warm up every genre
    /// - `Enter` (in BookList): Open book details
    /// - `a` (in BookDetail): Look up the first author
    /// - `Esc`: Go back one view
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match self.state.clone() {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::GenreList => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_genre = wrap_up(self.selected_genre, self.genre_count());
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.selected_genre = wrap_down(self.selected_genre, self.genre_count());
                }
                KeyCode::Enter | KeyCode::Char('c') => {
                    if let Some(genre) = self.selected_genre() {
                        self.pending = Some(PendingAction::Drain(genre.to_string()));
                    }
                }
                KeyCode::Char('e') => {
                    if let Some(genre) = self.selected_genre() {
                        self.pending = Some(PendingAction::Extend(genre.to_string()));
                    }
                }
                KeyCode::Char('w') => {
                    self.pending = Some(PendingAction::WarmUp);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::BookList(genre) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.state = AppState::GenreList;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_book = wrap_up(self.selected_book, self.drained.len());
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.selected_book = wrap_down(self.selected_book, self.drained.len());
                }
                KeyCode::Enter => {
                    if self.selected_book < self.drained.len() {
                        self.author = None;
                        self.state = AppState::BookDetail {
                            genre,
                            index: self.selected_book,
                        };
                    }
                }
                KeyCode::Char('n') => {
                    self.pending = Some(PendingAction::Drain(genre));
                }
                KeyCode::Char('e') => {
                    self.pending = Some(PendingAction::Extend(genre));
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::BookDetail { genre, .. } => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.author = None;
                    self.state = AppState::BookList(genre);
                }
                KeyCode::Char('a') => {
                    let author = self
                        .detail_book()
                        .and_then(|book| book.primary_author())
                        .map(str::to_string);
                    match author {
                        Some(name) => {
                            self.pending = Some(PendingAction::FetchAuthor(name));
                        }
                        None => {
                            self.status = Some(StatusMessage::error("This book lists no author"));
                        }
                    }
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }
}

/// Moves an index up, wrapping to the bottom if at the top
fn wrap_up(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else if index == 0 {
        count - 1
    } else {
        index - 1
    }
}

/// Moves an index down, wrapping to the top if at the bottom
fn wrap_down(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (index + 1) % count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::MockCatalog;
    use crate::config::CategoryConfig;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn create_app_with(mock: MockCatalog) -> (App, Arc<MockCatalog>) {
        let mock = Arc::new(mock);
        let categories = vec![
            CategoryConfig::new("romance", 7),
            CategoryConfig::new("fiction", 7),
            CategoryConfig::new("horror", 7),
        ];
        let cache = Arc::new(CacheManager::new(mock.clone(), &categories).with_drain_size(3));
        let author_client = AuthorClient::with_base_url("http://127.0.0.1:9");
        (App::new(cache, author_client, 5), mock)
    }

    fn create_app() -> App {
        create_app_with(MockCatalog::new()).0
    }

    async fn started_app() -> App {
        let mut app = create_app();
        app.start(true).await;
        app
    }

    #[test]
    fn test_initial_state_is_loading() {
        let app = create_app();
        assert_eq!(app.state, AppState::Loading);
        assert_eq!(app.genre_count(), 3);
        assert_eq!(app.selected_genre(), Some("romance"));
        assert!(app.shelf.iter().all(|s| s.queued.is_none()));
    }

    #[test]
    fn test_keys_ignored_during_loading() {
        let mut app = create_app();
        app.handle_key(key_event(KeyCode::Char('j')));
        app.handle_key(key_event(KeyCode::Enter));
        assert_eq!(app.selected_genre, 0);
        assert!(app.take_pending_action().is_none());

        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_start_warms_cache_and_shows_genre_list() {
        let app = started_app().await;

        assert_eq!(app.state, AppState::GenreList);
        assert!(app.shelf.iter().all(|s| s.queued == Some(5)));
        assert!(app.shelf.iter().all(|s| s.cursor == 12));
        assert!(app.last_refresh.is_some());
        assert!(!app.status.as_ref().unwrap().is_error);
    }

    #[tokio::test]
    async fn test_start_without_warm_leaves_cache_cold() {
        let (mut app, mock) = create_app_with(MockCatalog::new());

        app.start(false).await;

        assert_eq!(app.state, AppState::GenreList);
        assert!(mock.calls().is_empty());
        assert!(app.shelf.iter().all(|s| s.queued.is_none() && s.cursor == 7));
    }

    #[tokio::test]
    async fn test_partial_warm_up_failure_is_reported_but_others_are_warm() {
        let (mut app, _mock) = create_app_with(MockCatalog::new().failing("fiction", 503));

        app.start(true).await;

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("fiction"));
        assert_eq!(app.shelf[0].queued, Some(5));
        assert_eq!(app.shelf[1].queued, None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = create_app();
        app.state = AppState::GenreList;

        app.handle_key(key_event(KeyCode::Char('k')));
        assert_eq!(app.selected_genre, 2);

        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_genre, 0);

        app.handle_key(key_event(KeyCode::Char('j')));
        assert_eq!(app.selected_genre(), Some("fiction"));
    }

    #[test]
    fn test_genre_list_keys_request_actions() {
        let mut app = create_app();
        app.state = AppState::GenreList;

        app.handle_key(key_event(KeyCode::Enter));
        assert_eq!(
            app.take_pending_action(),
            Some(PendingAction::Drain("romance".to_string()))
        );

        app.handle_key(key_event(KeyCode::Char('e')));
        assert_eq!(
            app.take_pending_action(),
            Some(PendingAction::Extend("romance".to_string()))
        );

        app.handle_key(key_event(KeyCode::Char('w')));
        assert_eq!(app.take_pending_action(), Some(PendingAction::WarmUp));
        assert!(app.take_pending_action().is_none());
    }

    #[tokio::test]
    async fn test_drain_moves_to_book_list() {
        let mut app = started_app().await;

        app.perform(PendingAction::Drain("romance".to_string())).await;

        assert_eq!(app.state, AppState::BookList("romance".to_string()));
        let ids: Vec<&str> = app.drained.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["romance-9", "romance-10", "romance-11"]);
        assert_eq!(app.shelf[0].queued, Some(2));
    }

    #[tokio::test]
    async fn test_drain_next_batch_empties_genre() {
        let mut app = started_app().await;
        app.perform(PendingAction::Drain("romance".to_string())).await;

        app.handle_key(key_event(KeyCode::Char('n')));
        let action = app.take_pending_action().unwrap();
        app.perform(action).await;

        assert_eq!(app.drained.len(), 2);
        assert_eq!(app.shelf[0].queued, None);

        app.perform(PendingAction::Drain("romance".to_string())).await;
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("No cached books"));
        // The previous batch stays on screen
        assert_eq!(app.drained.len(), 2);
    }

    #[tokio::test]
    async fn test_extend_updates_shelf_and_status() {
        let mut app = started_app().await;

        app.perform(PendingAction::Extend("horror".to_string())).await;

        assert_eq!(app.shelf[2].queued, Some(10));
        assert_eq!(app.shelf[2].cursor, 17);
        assert_eq!(app.status.as_ref().unwrap().text, "Added 5 books to horror");
    }

    #[tokio::test]
    async fn test_extend_cold_genre_reports_not_cached() {
        let (mut app, _mock) = create_app_with(MockCatalog::new());
        app.start(false).await;

        app.perform(PendingAction::Extend("horror".to_string())).await;

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("does not exist in the cache"));
    }

    #[tokio::test]
    async fn test_book_list_navigation_and_detail() {
        let mut app = started_app().await;
        app.perform(PendingAction::Drain("fiction".to_string())).await;

        app.handle_key(key_event(KeyCode::Char('j')));
        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(
            app.state,
            AppState::BookDetail {
                genre: "fiction".to_string(),
                index: 1
            }
        );
        assert_eq!(app.detail_book().map(|b| b.id.as_str()), Some("fiction-10"));

        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.state, AppState::BookList("fiction".to_string()));

        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.state, AppState::GenreList);
    }

    #[tokio::test]
    async fn test_author_lookup_without_author_sets_error() {
        let mut app = started_app().await;
        app.perform(PendingAction::Drain("fiction".to_string())).await;
        app.handle_key(key_event(KeyCode::Enter));

        // Mock volumes carry no authors
        app.handle_key(key_event(KeyCode::Char('a')));

        assert!(app.take_pending_action().is_none());
        assert!(app.status.as_ref().unwrap().is_error);
    }

    #[tokio::test]
    async fn test_author_lookup_requests_primary_author() {
        let mut app = started_app().await;
        app.perform(PendingAction::Drain("fiction".to_string())).await;
        app.drained[0].authors = vec!["Shirley Jackson".to_string()];
        app.handle_key(key_event(KeyCode::Enter));

        app.handle_key(key_event(KeyCode::Char('a')));

        assert_eq!(
            app.take_pending_action(),
            Some(PendingAction::FetchAuthor("Shirley Jackson".to_string()))
        );
    }

    #[test]
    fn test_help_overlay_intercepts_keys() {
        let mut app = create_app();
        app.state = AppState::GenreList;

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Char('w')));
        assert!(app.take_pending_action().is_none());

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_with_startup_config_selects_genre() {
        let config = StartupConfig {
            warm_on_start: true,
            initial_genre: Some("horror".to_string()),
        };
        let app = create_app().with_startup_config(&config);
        assert_eq!(app.selected_genre(), Some("horror"));
    }

    #[test]
    fn test_quit_from_each_view() {
        for state in [
            AppState::GenreList,
            AppState::BookList("romance".to_string()),
            AppState::BookDetail {
                genre: "romance".to_string(),
                index: 0,
            },
        ] {
            let mut app = create_app();
            app.state = state;
            app.handle_key(key_event(KeyCode::Char('q')));
            assert!(app.should_quit);
        }
    }
}

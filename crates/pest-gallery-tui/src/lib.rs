//! Library entry point for the pest gallery TUI.
//!
//! Provides a reusable [`run`] function that launches the Ratatui terminal UI
//! against a pre-configured [`GalleryActions`].

mod app;
mod event;
mod ui;

use anyhow::anyhow;
use app::{App, Command};
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use log::{debug, info};
use pest_gallery_core::cache::KeyState;
use pest_gallery_core::flows::{CreateSubmission, EditSubmission};
use pest_gallery_core::gallery::DEFAULT_DESCRIPTION_LIMIT;
use pest_gallery_core::{FlowTask, GalleryActions, Route};
use pest_gallery_protocol::{CategoryFilter, RecordId};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Presentation settings for the TUI session.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Filter applied when the gallery first opens.
    pub default_filter: CategoryFilter,
    /// Characters of description shown before "read more".
    pub description_limit: usize,
    /// Screen to open on launch.
    pub start_route: Route,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            default_filter: CategoryFilter::All,
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            start_route: Route::Gallery,
        }
    }
}

/// Background tasks owned by the event loop.
#[derive(Default)]
struct Watchers {
    /// Forwards collection updates for the whole session.
    collection: Option<FlowTask>,
    /// Forwards updates for the record on the detail screen.
    detail: Option<(RecordId, FlowTask)>,
}

/// Launch the pest gallery TUI.
///
/// The caller initializes logging before calling `run`; stderr logging
/// should be redirected since the terminal is in raw mode.
///
/// # Errors
/// Returns an error if terminal setup or the event loop fails.
pub async fn run(actions: GalleryActions, config: TuiConfig) -> anyhow::Result<()> {
    let mut app = App::new(
        config.default_filter,
        config.description_limit,
        config.start_route,
    );

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::channel(256);
    spawn_input_handler(tx.clone());
    spawn_tick(tx.clone());

    let mut watchers = Watchers {
        collection: Some(spawn_watch(
            "collection-watch",
            actions.store().subscribe(),
            tx.clone(),
            AppEvent::Collection,
        )),
        detail: None,
    };
    sync_detail_watch(&actions, &app, &mut watchers, &tx);
    info!("tui started (route={})", app.route());

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;
        let event = rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("event channel closed unexpectedly"))?;
        if handle_app_event(event, &actions, &mut app, &tx) {
            break;
        }
        sync_detail_watch(&actions, &app, &mut watchers, &tx);
    }

    drop(watchers);
    restore_terminal(&mut terminal)?;
    Ok(())
}

/// Dispatch a UI event and return true when the app should exit.
fn handle_app_event(
    event: AppEvent,
    actions: &GalleryActions,
    app: &mut App,
    sender: &mpsc::Sender<AppEvent>,
) -> bool {
    match event {
        AppEvent::Input(key) => match app.handle_key(key) {
            Command::Quit => return true,
            Command::None => {}
            Command::Refresh => actions.store().invalidate(),
            Command::Create(submission) => {
                app.create_task = Some(spawn_create(actions.clone(), submission, sender.clone()));
            }
            Command::Update(submission) => {
                app.edit_task = Some(spawn_update(actions.clone(), submission, sender.clone()));
            }
            Command::Delete(id) => {
                app.delete_task = Some(spawn_delete(actions.clone(), id, sender.clone()));
            }
        },
        AppEvent::Tick => {}
        AppEvent::Collection(state) => app.apply_collection(state),
        AppEvent::Record(id, state) => app.apply_record(&id, state),
        AppEvent::Created(result) => app.finish_create(result),
        AppEvent::Updated(result) => app.finish_update(result),
        AppEvent::Deleted(result) => app.finish_delete(result),
    }
    false
}

/// Keep exactly one record watcher alive, for the record on screen.
fn sync_detail_watch(
    actions: &GalleryActions,
    app: &App,
    watchers: &mut Watchers,
    sender: &mpsc::Sender<AppEvent>,
) {
    let wanted = match app.route() {
        Route::Detail(id) => Some(id),
        _ => None,
    };
    let current = watchers.detail.as_ref().map(|(id, _)| id);
    if wanted == current {
        return;
    }
    watchers.detail = wanted.map(|id| {
        debug!("watching record (id={})", id);
        let owned = id.clone();
        let task = spawn_watch(
            "record-watch",
            actions.store().subscribe_record(id),
            sender.clone(),
            move |state| AppEvent::Record(owned.clone(), state),
        );
        (id.clone(), task)
    });
}

/// Forward every state of a cache key into the event loop.
fn spawn_watch<T, F>(
    name: &'static str,
    mut receiver: watch::Receiver<KeyState<T>>,
    sender: mpsc::Sender<AppEvent>,
    wrap: F,
) -> FlowTask
where
    T: Clone + Send + Sync + 'static,
    F: Fn(KeyState<T>) -> AppEvent + Send + 'static,
{
    FlowTask::spawn(name, async move {
        loop {
            let state = receiver.borrow_and_update().clone();
            if sender.send(wrap(state)).await.is_err() {
                break;
            }
            if receiver.changed().await.is_err() {
                break;
            }
        }
    })
}

fn spawn_create(
    actions: GalleryActions,
    submission: CreateSubmission,
    sender: mpsc::Sender<AppEvent>,
) -> FlowTask {
    FlowTask::spawn("create", async move {
        let result = actions.create(submission).await;
        let _ = sender.send(AppEvent::Created(result)).await;
    })
}

fn spawn_update(
    actions: GalleryActions,
    submission: EditSubmission,
    sender: mpsc::Sender<AppEvent>,
) -> FlowTask {
    FlowTask::spawn("update", async move {
        let result = actions.update(submission).await;
        let _ = sender.send(AppEvent::Updated(result)).await;
    })
}

fn spawn_delete(actions: GalleryActions, id: RecordId, sender: mpsc::Sender<AppEvent>) -> FlowTask {
    FlowTask::spawn("delete", async move {
        let result = actions.delete(&id).await;
        let _ = sender.send(AppEvent::Deleted(result)).await;
    })
}

/// Spawn a task to poll for input events.
fn spawn_input_handler(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        loop {
            if matches!(crossterm::event::poll(Duration::from_millis(30)), Ok(true)) {
                while matches!(crossterm::event::poll(Duration::from_millis(0)), Ok(true)) {
                    let event = match crossterm::event::read() {
                        Ok(event) => event,
                        Err(_) => break,
                    };
                    if let CrosstermEvent::Key(key) = event
                        && key.kind != KeyEventKind::Release
                        && sender.send(AppEvent::Input(key)).await.is_err()
                    {
                        return;
                    }
                }
            }
        }
    });
}

/// Spawn a periodic tick event generator.
fn spawn_tick(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if sender.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });
}

/// Configure terminal in raw mode with alternate screen.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    debug!("setting up terminal");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal state on exit.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    debug!("restoring terminal");
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

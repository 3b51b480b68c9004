//! Application state for the pest gallery TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use pest_gallery_core::cache::KeyState;
use pest_gallery_core::flows::{
    CreateDialog, CreateSubmission, DeletePrompt, EditDialog, EditSubmission, FormField,
};
use pest_gallery_core::gallery::GalleryView;
use pest_gallery_core::{FlowTask, GalleryError, Route, Router};
use pest_gallery_protocol::{CategoryFilter, Record, RecordId};
use std::cmp::min;

/// Side effect requested by a key press; the event loop carries it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,
    Refresh,
    Create(CreateSubmission),
    Update(EditSubmission),
    Delete(RecordId),
}

/// Top-level application state for the TUI.
pub struct App {
    pub router: Router,
    pub gallery: GalleryView,
    /// Latest state of the collection cache entry.
    pub collection: KeyState<Vec<Record>>,
    /// Latest state of the record shown on the detail screen.
    pub detail: KeyState<Record>,
    pub create: CreateDialog,
    pub edit: EditDialog,
    pub delete: DeletePrompt,
    /// Focused field of whichever form is open.
    pub focus: FormField,
    /// Status line text.
    pub status: String,
    pub detail_scroll: u16,
    pub detail_max_scroll: u16,
    /// In-flight flows; dropping one cancels it.
    pub create_task: Option<FlowTask>,
    pub edit_task: Option<FlowTask>,
    pub delete_task: Option<FlowTask>,
}

impl App {
    pub fn new(filter: CategoryFilter, description_limit: usize, start: Route) -> Self {
        Self {
            router: Router::new(start),
            gallery: GalleryView::new(filter, description_limit),
            collection: KeyState::default(),
            detail: KeyState::default(),
            create: CreateDialog::default(),
            edit: EditDialog::default(),
            delete: DeletePrompt::default(),
            focus: FormField::Name,
            status: "idle".to_string(),
            detail_scroll: 0,
            detail_max_scroll: 0,
            create_task: None,
            edit_task: None,
            delete_task: None,
        }
    }

    pub fn push_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        debug!("status updated (status={})", self.status);
    }

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    /// Records currently cached, or none before the first load.
    pub fn records(&self) -> &[Record] {
        self.collection.data.as_deref().unwrap_or_default()
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.gallery.selected_record(self.records())
    }

    pub fn apply_collection(&mut self, state: KeyState<Vec<Record>>) {
        self.collection = state;
        let shown = self.gallery.displayed(self.records()).len();
        self.gallery.clamp(shown);
    }

    /// Apply a record update if it belongs to the open detail screen.
    pub fn apply_record(&mut self, id: &RecordId, state: KeyState<Record>) {
        if matches!(self.route(), Route::Detail(current) if current == id) {
            self.detail = state;
        }
    }

    pub fn navigate(&mut self, route: Route) {
        if &route != self.route() {
            info!("navigating (route={})", route);
            self.router.navigate(route);
            self.reset_detail();
        }
    }

    pub fn back(&mut self) {
        self.router.back();
        self.reset_detail();
    }

    fn reset_detail(&mut self) {
        self.detail = KeyState::default();
        self.detail_scroll = 0;
        self.detail_max_scroll = 0;
    }

    pub fn detail_scroll_up(&mut self, lines: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(lines);
    }

    pub fn detail_scroll_down(&mut self, lines: u16) {
        self.detail_scroll = min(
            self.detail_scroll.saturating_add(lines),
            self.detail_max_scroll,
        );
    }

    pub fn update_detail_scroll_bounds(&mut self, max_scroll: u16) {
        self.detail_max_scroll = max_scroll;
        self.detail_scroll = self.detail_scroll.min(max_scroll);
    }

    pub fn open_create(&mut self) {
        self.create.open();
        self.focus = FormField::Name;
    }

    /// Close the create dialog, cancelling an upload or POST in flight.
    pub fn close_create(&mut self) {
        self.create.close();
        self.create_task = None;
    }

    pub fn open_edit(&mut self) {
        let Some(record) = self.selected_record().cloned() else {
            self.push_status("no pest selected");
            return;
        };
        self.edit.open(&record);
        self.focus = FormField::Name;
    }

    pub fn close_edit(&mut self) {
        self.edit.close();
        self.edit_task = None;
    }

    pub fn request_delete(&mut self) {
        let Some(record) = self.selected_record().cloned() else {
            self.push_status("no pest selected");
            return;
        };
        self.delete.request(&record);
    }

    pub fn finish_create(&mut self, result: Result<Option<Record>, GalleryError>) {
        self.create.finish(&result);
        self.create_task = None;
        match result {
            Ok(_) => self.push_status("pest created"),
            Err(err) => self.push_status(format!("create failed: {err}")),
        }
    }

    pub fn finish_update(&mut self, result: Result<Option<Record>, GalleryError>) {
        self.edit.finish(&result);
        self.edit_task = None;
        match result {
            Ok(_) => self.push_status("pest updated"),
            Err(err) => self.push_status(format!("update failed: {err}")),
        }
    }

    pub fn finish_delete(&mut self, result: Result<(), GalleryError>) {
        self.delete_task = None;
        match self.delete.finish(result) {
            None => self.push_status("pest deleted"),
            Some(err) => self.push_status(format!("delete failed: {err}")),
        }
    }

    /// Dispatch a key press to the topmost surface.
    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Command::Quit;
        }
        if self.delete.is_active() {
            return self.handle_delete_key(key);
        }
        if self.create.is_open() {
            return self.handle_create_key(key);
        }
        if self.edit.is_open() {
            return self.handle_edit_key(key);
        }
        match self.route().clone() {
            Route::Gallery => self.handle_gallery_key(key),
            Route::Detail(_) => self.handle_detail_key(key),
            Route::About | Route::Contact => self.handle_page_key(key),
        }
    }

    /// Keys shared by every screen: quit and the nav bar.
    fn handle_nav_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('1') => {
                self.navigate(Route::Gallery);
                Some(Command::None)
            }
            KeyCode::Char('2') => {
                self.navigate(Route::About);
                Some(Command::None)
            }
            KeyCode::Char('3') => {
                self.navigate(Route::Contact);
                Some(Command::None)
            }
            _ => None,
        }
    }

    fn handle_gallery_key(&mut self, key: KeyEvent) -> Command {
        if let Some(command) = self.handle_nav_key(key) {
            return command;
        }
        let shown = self.gallery.displayed(self.records()).len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.gallery.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.gallery.select_next(shown),
            KeyCode::Right | KeyCode::Tab => self.gallery.next_filter(),
            KeyCode::Left | KeyCode::BackTab => self.gallery.prev_filter(),
            KeyCode::Enter => {
                let target = self
                    .selected_record()
                    .and_then(|record| self.gallery.read_more_target(record));
                match target {
                    Some(route) => self.navigate(route),
                    None => self.push_status("description already shown in full"),
                }
            }
            KeyCode::Char('o') => {
                if let Some(record) = self.selected_record() {
                    let route = Route::Detail(record.id.clone());
                    self.navigate(route);
                }
            }
            KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Char('r') => {
                self.push_status("refreshing");
                return Command::Refresh;
            }
            _ => {}
        }
        Command::None
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Command {
        if let Some(command) = self.handle_nav_key(key) {
            return command;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Up => self.detail_scroll_up(1),
            KeyCode::Down => self.detail_scroll_down(1),
            KeyCode::PageUp => self.detail_scroll_up(5),
            KeyCode::PageDown => self.detail_scroll_down(5),
            _ => {}
        }
        Command::None
    }

    fn handle_page_key(&mut self, key: KeyEvent) -> Command {
        if let Some(command) = self.handle_nav_key(key) {
            return command;
        }
        if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
            self.back();
        }
        Command::None
    }

    fn handle_delete_key(&mut self, key: KeyEvent) -> Command {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => match self.delete.confirm() {
                Some(id) => {
                    self.push_status("deleting");
                    Command::Delete(id)
                }
                None => Command::None,
            },
            KeyCode::Char('n') | KeyCode::Esc => {
                self.delete.cancel();
                Command::None
            }
            _ => Command::None,
        }
    }

    fn handle_create_key(&mut self, key: KeyEvent) -> Command {
        if key.code == KeyCode::Esc {
            let submitting = self.create.is_submitting();
            self.close_create();
            return self.cancelled("create", submitting);
        }
        let focus = self.focus;
        let Some(form) = self.create.form_mut() else {
            return Command::None;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = focus.step(&FormField::CREATE, true),
            KeyCode::BackTab | KeyCode::Up => self.focus = focus.step(&FormField::CREATE, false),
            KeyCode::Left if focus == FormField::Category => form.cycle_category(false),
            KeyCode::Right | KeyCode::Char(' ') if focus == FormField::Category => {
                form.cycle_category(true)
            }
            KeyCode::Backspace => {
                if let Some(value) = form.text_mut(focus) {
                    value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(value) = form.text_mut(focus) {
                    value.push(ch);
                }
            }
            KeyCode::Enter => {
                return match self.create.begin_submit() {
                    Ok(submission) => {
                        self.push_status("uploading image");
                        Command::Create(submission)
                    }
                    Err(err) => {
                        self.focus = FormField::Image;
                        self.push_status(err.to_string());
                        Command::None
                    }
                };
            }
            _ => {}
        }
        Command::None
    }

    /// A write aborted mid-request may already have reached the backend,
    /// so the collection is refreshed rather than trusted.
    fn cancelled(&mut self, flow: &str, submitting: bool) -> Command {
        if submitting {
            self.push_status(format!("{flow} cancelled; refreshing"));
            Command::Refresh
        } else {
            self.push_status(format!("{flow} cancelled"));
            Command::None
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Command {
        if key.code == KeyCode::Esc {
            let submitting = self.edit.is_submitting();
            self.close_edit();
            return self.cancelled("edit", submitting);
        }
        let focus = self.focus;
        let Some(form) = self.edit.form_mut() else {
            return Command::None;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = focus.step(&FormField::EDIT, true),
            KeyCode::BackTab | KeyCode::Up => self.focus = focus.step(&FormField::EDIT, false),
            KeyCode::Left if focus == FormField::Category => form.cycle_category(false),
            KeyCode::Right | KeyCode::Char(' ') if focus == FormField::Category => {
                form.cycle_category(true)
            }
            KeyCode::Backspace => {
                if let Some(value) = form.text_mut(focus) {
                    value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(value) = form.text_mut(focus) {
                    value.push(ch);
                }
            }
            KeyCode::Enter => {
                return match self.edit.begin_submit() {
                    Ok(submission) => {
                        self.push_status("saving");
                        Command::Update(submission)
                    }
                    Err(err) => {
                        self.push_status(err.to_string());
                        Command::None
                    }
                };
            }
            _ => {}
        }
        Command::None
    }
}

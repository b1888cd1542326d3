use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol;

use super::panel::{NotesPanel, Slice, SliceWrite, WindowPin};
use crate::background::{self, Offset};
use crate::config::{Config, Theme};
use crate::editor::{process_key, NoteEditor};
use crate::host::{CommandWindowHost, WindowHost};
use crate::notes::{ClickOutcome, NoteColor, PALETTE};
use crate::store::{FileStore, KeyValueStore, PersistEvent, PersistWorker};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    shown_at: Instant,
}

/// Note body being edited in place.
pub struct EditSession {
    pub id: String,
    pub editor: NoteEditor,
}

pub enum Dialog {
    None,
    ImagePath(NoteEditor),
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarButton {
    Add,
    Delete,
    ConfirmDelete,
    CancelDelete,
    Color,
    Background,
    ClearBackground,
    PinWindow,
    ConfirmPosition,
    CancelPosition,
}

/// Screen rects recorded during the last draw, used to route mouse clicks.
#[derive(Debug, Default)]
pub struct HitMap {
    pub buttons: Vec<(TopBarButton, Rect)>,
    pub cards: Vec<(String, Rect)>,
    pub stars: Vec<(String, Rect)>,
    pub swatches: Vec<(NoteColor, Rect)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.buttons.clear();
        self.cards.clear();
        self.stars.clear();
        self.swatches.clear();
    }

    fn find<'a, T>(items: &'a [(T, Rect)], col: u16, row: u16) -> Option<&'a T> {
        items
            .iter()
            .find(|(_, r)| r.contains((col, row).into()))
            .map(|(item, _)| item)
    }

    pub fn button_at(&self, col: u16, row: u16) -> Option<TopBarButton> {
        Self::find(&self.buttons, col, row).copied()
    }

    pub fn star_at(&self, col: u16, row: u16) -> Option<&str> {
        Self::find(&self.stars, col, row).map(String::as_str)
    }

    pub fn card_at(&self, col: u16, row: u16) -> Option<&str> {
        Self::find(&self.cards, col, row).map(String::as_str)
    }

    pub fn swatch_at(&self, col: u16, row: u16) -> Option<NoteColor> {
        Self::find(&self.swatches, col, row).copied()
    }
}

/// Cache key for the encoded background: image generation, offset, area.
pub type BackgroundKey = (u64, Offset, Rect);

pub struct BackgroundRender {
    pub key: BackgroundKey,
    pub protocol: Protocol,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub panel: NotesPanel,
    worker: Option<PersistWorker>,
    host: Option<Box<dyn WindowHost>>,
    pending_loads: HashSet<&'static str>,
    pub editing: Option<EditSession>,
    pub dialog: Dialog,
    pub status_message: Option<StatusMessage>,
    pub picker: Option<Picker>,
    pub background_render: Option<BackgroundRender>,
    pub hits: HitMap,
    /// Row cursor while marking notes in delete mode.
    pub delete_cursor: usize,
    pub swatch_cursor: usize,
    pub list_scroll: usize,
    keyboard_pointer: Option<Offset>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let picker = Picker::from_query_stdio().ok();
        if picker.is_none() {
            log::info!("terminal graphics unavailable, background images are not drawn");
        }
        let host = CommandWindowHost::from_command_line(&config.window_command)
            .map(|h| Box::new(h) as Box<dyn WindowHost>);
        let store = FileStore::new(config.data_path());
        Self::with_parts(config, Box::new(store), host, picker)
    }

    pub fn with_parts(
        config: Config,
        store: Box<dyn KeyValueStore>,
        host: Option<Box<dyn WindowHost>>,
        picker: Option<Picker>,
    ) -> Self {
        let mut app = Self {
            config,
            theme: Theme::default(),
            panel: NotesPanel::new(),
            worker: None,
            host,
            pending_loads: HashSet::new(),
            editing: None,
            dialog: Dialog::None,
            status_message: None,
            picker,
            background_render: None,
            hits: HitMap::default(),
            delete_cursor: 0,
            swatch_cursor: 0,
            list_scroll: 0,
            keyboard_pointer: None,
            should_quit: false,
        };

        match PersistWorker::spawn(store) {
            Ok(worker) => {
                for slice in Slice::ALL {
                    worker.load(slice.key());
                    app.pending_loads.insert(slice.key());
                }
                app.worker = Some(worker);
            }
            Err(e) => {
                log::error!("could not start persist worker: {}", e);
                app.warn("Storage unavailable, notes will not be saved");
            }
        }
        app
    }

    pub fn has_window_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_loading(&self) -> bool {
        !self.pending_loads.is_empty()
    }

    // ---- status bar ----

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set_status(text, StatusLevel::Info);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.set_status(text, StatusLevel::Warning);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set_status(text, StatusLevel::Error);
    }

    pub fn expire_status(&mut self) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|m| m.shown_at.elapsed() >= STATUS_TIMEOUT)
        {
            self.status_message = None;
        }
    }

    // ---- persistence ----

    /// Blocks until the startup loads came back or `timeout` passed.
    pub fn wait_for_load(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.is_loading() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                log::warn!("startup load still pending after {:?}", timeout);
                break;
            };
            let Some(event) = self.worker.as_ref().and_then(|w| w.recv_timeout(remaining)) else {
                break;
            };
            self.handle_persist_event(event);
        }
    }

    pub fn poll_persistence(&mut self) {
        while let Some(event) = self.worker.as_ref().and_then(PersistWorker::try_recv) {
            self.handle_persist_event(event);
        }
    }

    fn handle_persist_event(&mut self, event: PersistEvent) {
        match event {
            PersistEvent::Loaded { key, bytes } => {
                if !self.pending_loads.remove(key.as_str()) {
                    log::debug!("ignoring late load of {}", key);
                    return;
                }
                if let Err(e) = self.panel.apply_loaded(&key, bytes) {
                    log::warn!("could not restore {}: {}", key, e);
                    self.warn(format!("Could not restore {}", key));
                }
                self.delete_cursor = 0;
            }
            PersistEvent::Saved { key } => log::debug!("saved {}", key),
            PersistEvent::Failed { key, error } => {
                log::warn!("{}", error);
                if self.pending_loads.remove(key.as_str()) {
                    self.warn(format!("Could not load {}, starting empty", key));
                } else {
                    self.warn(format!("Could not save {}, changes kept in memory", key));
                }
            }
        }
    }

    /// Hands every stale slice to the worker.
    pub fn flush_writes(&mut self) {
        if !self.panel.has_pending_writes() {
            return;
        }
        for (slice, write) in self.panel.drain_writes() {
            // A local change makes a still-pending load stale.
            self.pending_loads.remove(slice.key());
            let Some(worker) = self.worker.as_ref() else {
                log::debug!("no store, {} kept in memory", slice.key());
                continue;
            };
            match write {
                Ok(SliceWrite::Put(bytes)) => worker.save(slice.key(), bytes),
                Ok(SliceWrite::Clear) => worker.remove(slice.key()),
                Err(e) => {
                    log::error!("{}", e);
                    self.error(format!("Could not encode {}", slice.key()));
                }
            }
        }
    }

    pub fn shutdown(mut self) {
        self.flush_writes();
        if let Some(worker) = self.worker.take() {
            for event in worker.shutdown() {
                if let PersistEvent::Failed { error, .. } = event {
                    log::error!("{}", error);
                }
            }
        }
        log::info!("session ended");
    }

    // ---- note list ----

    /// In delete mode the new note is added without opening the editor.
    pub fn add_note(&mut self) {
        self.end_edit();
        self.panel.add_note();
        if !self.panel.mode().is_delete_select() {
            self.begin_edit();
        }
    }

    pub fn delete_selected(&mut self) {
        self.end_edit();
        if self.panel.delete_selected() {
            self.info("Note deleted");
        }
    }

    pub fn toggle_pin_selected(&mut self) {
        if let Some(id) = self.panel.notes().selected_id().map(str::to_string) {
            self.panel.toggle_pin(&id);
        }
    }

    pub fn toggle_pin(&mut self, id: &str) {
        self.panel.toggle_pin(id);
    }

    /// Moves the selection, or the marking cursor in delete mode.
    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.panel.notes().len();
        if len == 0 {
            return;
        }
        if self.panel.mode().is_delete_select() {
            self.delete_cursor = step(self.delete_cursor, delta, len);
            return;
        }
        let current = self
            .panel
            .notes()
            .selected_id()
            .and_then(|id| self.panel.notes().position(id));
        let next = match current {
            Some(i) => step(i, delta, len),
            None => 0,
        };
        let id = self.panel.notes().notes()[next].id.clone();
        self.click_note(&id);
    }

    pub fn click_note(&mut self, id: &str) {
        if self.editing.as_ref().is_some_and(|s| s.id != id) {
            self.end_edit();
        }
        match self.panel.click_note(id) {
            ClickOutcome::Marked(_) | ClickOutcome::Unmarked(_) => {
                if let Some(i) = self.panel.notes().position(id) {
                    self.delete_cursor = i;
                }
            }
            ClickOutcome::Selected(_) | ClickOutcome::Ignored => {}
        }
    }

    pub fn toggle_mark_at_cursor(&mut self) {
        let id = self
            .panel
            .notes()
            .notes()
            .get(self.delete_cursor)
            .map(|n| n.id.clone());
        if let Some(id) = id {
            self.panel.click_note(&id);
        }
    }

    // ---- delete mode ----

    pub fn enter_delete_mode(&mut self) {
        self.end_edit();
        if self.panel.enter_delete_mode() {
            self.delete_cursor = self
                .panel
                .notes()
                .selected_id()
                .and_then(|id| self.panel.notes().position(id))
                .unwrap_or(0);
            self.info("Space marks a note, y deletes the marked ones, Esc cancels");
        } else {
            self.warn("No notes to delete");
        }
    }

    pub fn confirm_delete(&mut self) {
        let removed = self.panel.confirm_delete();
        if removed > 0 {
            self.info(format!("Deleted {} note(s)", removed));
        } else {
            self.info("Nothing marked, nothing deleted");
        }
        self.delete_cursor = 0;
    }

    pub fn cancel_delete(&mut self) {
        if self.panel.cancel_delete() {
            self.status_message = None;
        }
    }

    // ---- editing ----

    pub fn begin_edit(&mut self) {
        if self.panel.mode().is_delete_select() {
            self.warn("Finish deleting before editing");
            return;
        }
        let Some(note) = self.panel.notes().selected() else {
            return;
        };
        self.editing = Some(EditSession {
            id: note.id.clone(),
            editor: NoteEditor::new(&note.text),
        });
    }

    pub fn end_edit(&mut self) {
        self.editing = None;
    }

    pub fn handle_edit_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.end_edit();
            return;
        }
        let Some(session) = self.editing.as_mut() else {
            return;
        };
        if session.editor.apply(process_key(key, true)) {
            let (id, text) = (session.id.clone(), session.editor.text().to_string());
            self.sync_edit(&id, &text);
        }
    }

    pub fn paste(&mut self, text: &str) {
        if let Dialog::ImagePath(input) = &mut self.dialog {
            input.insert_str(text.trim_end_matches(['\n', '\r']));
            return;
        }
        let Some(session) = self.editing.as_mut() else {
            return;
        };
        session.editor.insert_str(text);
        let (id, text) = (session.id.clone(), session.editor.text().to_string());
        self.sync_edit(&id, &text);
    }

    fn sync_edit(&mut self, id: &str, text: &str) {
        if !self.panel.update_text(id, text) {
            // The note went away underneath the editor.
            self.end_edit();
        }
    }

    // ---- color picker ----

    pub fn toggle_color_picker(&mut self) {
        if !self.panel.toggle_color_picker() {
            self.warn("Select a note to color it");
            return;
        }
        if self.panel.color_picker_open() {
            self.swatch_cursor = self
                .panel
                .notes()
                .selected()
                .map_or(0, |n| n.color.index());
        }
    }

    pub fn move_swatch(&mut self, delta: isize) {
        self.swatch_cursor = step(self.swatch_cursor, delta, PALETTE.len());
    }

    pub fn choose_color(&mut self, color: NoteColor) {
        self.panel.choose_color(color);
    }

    pub fn choose_swatch_at_cursor(&mut self) {
        if let Some(color) = NoteColor::from_index(self.swatch_cursor) {
            self.choose_color(color);
        }
    }

    // ---- background ----

    pub fn open_image_dialog(&mut self) {
        self.end_edit();
        self.dialog = Dialog::ImagePath(NoteEditor::new(""));
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
    }

    pub fn submit_dialog(&mut self) {
        let Dialog::ImagePath(input) = std::mem::replace(&mut self.dialog, Dialog::None) else {
            return;
        };
        let path = clean_path(input.text());
        if path.as_os_str().is_empty() {
            return;
        }
        self.upload_from_path(path);
    }

    fn upload_from_path(&mut self, path: PathBuf) {
        let result = background::read_image_file(&path)
            .and_then(|payload| self.panel.upload_image(payload));
        match result {
            Ok(()) => {
                log::info!("background image loaded from {}", path.display());
                self.keyboard_pointer = None;
                self.background_render = None;
                self.info("Drag the image or use the arrows, Enter places it, Esc cancels");
            }
            Err(e) => {
                log::warn!("background upload from {} failed: {}", path.display(), e);
                self.error(format!("Could not use {}: {}", path.display(), e));
            }
        }
    }

    pub fn clear_background(&mut self) {
        if self.panel.clear_image() {
            self.background_render = None;
            self.keyboard_pointer = None;
            self.info("Background removed");
        }
    }

    pub fn nudge_background(&mut self, dx: i32, dy: i32) {
        if !self.panel.background().is_positioning() {
            return;
        }
        let pointer = match self.keyboard_pointer {
            Some(p) => p,
            None => {
                let origin = Offset::default();
                self.panel.begin_drag(origin);
                origin
            }
        };
        let step = self.config.drag_step.max(1);
        let next = Offset::new(
            pointer.x.saturating_add(dx.saturating_mul(step)),
            pointer.y.saturating_add(dy.saturating_mul(step)),
        );
        self.panel.drag_to(next);
        self.keyboard_pointer = Some(next);
    }

    pub fn confirm_position(&mut self) {
        if self.panel.confirm_position() {
            self.info("Background placed");
        }
        self.keyboard_pointer = None;
    }

    pub fn cancel_position(&mut self) {
        if self.panel.cancel_position() {
            self.status_message = None;
        }
        self.keyboard_pointer = None;
    }

    // ---- host window ----

    pub fn toggle_window_pin(&mut self) {
        match self.panel.toggle_window_pin(self.host.as_deref_mut()) {
            WindowPin::Unavailable => self.warn("Set window_command in the config to open a window"),
            WindowPin::Pinned { launched: true } => self.info("Opened in a new window"),
            WindowPin::Pinned { launched: false } => self.warn("Could not open a new window"),
            WindowPin::Unpinned => self.info("Window unpinned"),
        }
    }

    // ---- mouse ----

    pub fn press_button(&mut self, button: TopBarButton) {
        match button {
            TopBarButton::Add => self.add_note(),
            TopBarButton::Delete => self.enter_delete_mode(),
            TopBarButton::ConfirmDelete => self.confirm_delete(),
            TopBarButton::CancelDelete => self.cancel_delete(),
            TopBarButton::Color => self.toggle_color_picker(),
            TopBarButton::Background => self.open_image_dialog(),
            TopBarButton::ClearBackground => self.clear_background(),
            TopBarButton::PinWindow => self.toggle_window_pin(),
            TopBarButton::ConfirmPosition => self.confirm_position(),
            TopBarButton::CancelPosition => self.cancel_position(),
        }
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        if self.dialog.is_open() {
            return;
        }
        if let Some(button) = self.hits.button_at(col, row) {
            self.press_button(button);
            return;
        }
        if self.panel.background().is_positioning() {
            self.keyboard_pointer = None;
            self.panel.begin_drag(cell_offset(col, row));
            return;
        }
        if let Some(color) = self.hits.swatch_at(col, row) {
            self.choose_color(color);
            return;
        }
        if let Some(id) = self.hits.star_at(col, row).map(str::to_string) {
            self.toggle_pin(&id);
            return;
        }
        if let Some(id) = self.hits.card_at(col, row).map(str::to_string) {
            let already_selected = self.panel.notes().selected_id() == Some(id.as_str());
            self.click_note(&id);
            if already_selected && !self.panel.mode().is_delete_select() && self.editing.is_none() {
                self.begin_edit();
            }
        }
    }

    pub fn mouse_drag(&mut self, col: u16, row: u16) {
        if self.panel.background().is_dragging() {
            self.panel.drag_to(cell_offset(col, row));
        }
    }

    pub fn mouse_up(&mut self) {
        self.panel.end_drag_gesture();
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

fn cell_offset(col: u16, row: u16) -> Offset {
    Offset::new(i32::from(col), i32::from(row))
}

/// Accepts what file managers paste: quotes and `file://` prefixes.
/// Dialog input as a path: surrounding quotes and `file://` stripped, `~` expanded.
pub fn clean_path(input: &str) -> PathBuf {
    let trimmed = input.trim().trim_matches(|c: char| c == '\'' || c == '"');
    let trimmed = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    PathBuf::from(shellexpand::tilde(trimmed).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{self, MemoryStore, NOTES_KEY};
    use crate::notes::Note;
    use std::fs;

    fn test_app(store: MemoryStore) -> App {
        let mut app = App::with_parts(Config::default(), Box::new(store), None, None);
        app.wait_for_load(Duration::from_secs(5));
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_image_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("stickit-{}-{}.png", name, std::process::id()));
        let payload = background::sample_payload();
        let encoded = payload.split_once(',').unwrap().1;
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_startup_load_selects_first_note() {
        let mut store = MemoryStore::new();
        let mut first = Note::new();
        first.text = "first".into();
        store::save(&mut store, NOTES_KEY, &vec![first.clone(), Note::new()]).unwrap();

        let app = test_app(store);
        assert!(!app.is_loading());
        assert_eq!(app.panel.notes().len(), 2);
        assert_eq!(app.panel.notes().selected_id(), Some(first.id.as_str()));
    }

    #[test]
    fn test_edits_reach_the_store() {
        let store = MemoryStore::new();
        let mut app = test_app(store.clone());

        app.add_note();
        for c in "hi".chars() {
            app.handle_edit_key(key(KeyCode::Char(c)));
        }
        app.handle_edit_key(key(KeyCode::Esc));
        assert!(app.editing.is_none());
        app.flush_writes();
        app.shutdown();

        let saved: Vec<Note> = store::load(&store, NOTES_KEY).unwrap().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].text, "hi");
    }

    #[test]
    fn test_unavailable_store_keeps_working_in_memory() {
        let mut app = test_app(MemoryStore::unavailable());
        assert!(app.status_message.is_some());

        app.add_note();
        app.end_edit();
        app.flush_writes();
        std::thread::sleep(Duration::from_millis(100));
        app.poll_persistence();

        assert_eq!(app.panel.notes().len(), 1);
        let message = app.status_message.as_ref().unwrap();
        assert_eq!(message.level, StatusLevel::Warning);
    }

    #[test]
    fn test_editing_blocked_in_delete_mode() {
        let mut app = test_app(MemoryStore::new());
        app.add_note();
        app.end_edit();
        app.enter_delete_mode();
        app.begin_edit();
        assert!(app.editing.is_none());
    }

    #[test]
    fn test_delete_mode_keyboard_flow() {
        let mut app = test_app(MemoryStore::new());
        for _ in 0..3 {
            app.add_note();
        }
        app.end_edit();
        let ids: Vec<String> = app.panel.notes().notes().iter().map(|n| n.id.clone()).collect();

        app.enter_delete_mode();
        assert_eq!(app.delete_cursor, 0);
        app.toggle_mark_at_cursor();
        app.move_cursor(2);
        app.toggle_mark_at_cursor();
        app.confirm_delete();

        let left: Vec<&str> = app.panel.notes().notes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(left, vec![ids[1].as_str()]);
    }

    #[test]
    fn test_move_cursor_selects() {
        let mut app = test_app(MemoryStore::new());
        app.add_note();
        app.add_note();
        app.end_edit();
        let second = app.panel.notes().notes()[1].id.clone();

        app.move_cursor(1);
        assert_eq!(app.panel.notes().selected_id(), Some(second.as_str()));
        app.move_cursor(5);
        assert_eq!(app.panel.notes().selected_id(), Some(second.as_str()));
    }

    #[test]
    fn test_upload_from_dialog_then_keyboard_position() {
        let mut app = test_app(MemoryStore::new());
        app.config.drag_step = 2;
        let path = sample_image_file("dialog");

        app.open_image_dialog();
        app.paste(&format!("'{}'\n", path.display()));
        app.submit_dialog();
        assert!(!app.dialog.is_open());
        assert!(app.panel.background().is_positioning());

        app.nudge_background(1, 0);
        app.nudge_background(1, -1);
        assert_eq!(app.panel.background().display_offset(), Offset::new(4, -2));
        app.confirm_position();
        assert_eq!(app.panel.background().committed_offset(), Offset::new(4, -2));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_bad_image_path_reports_error() {
        let mut app = test_app(MemoryStore::new());
        app.open_image_dialog();
        app.paste("/nonexistent/stickit.png");
        app.submit_dialog();
        assert!(!app.panel.background().is_positioning());
        assert_eq!(app.status_message.as_ref().unwrap().level, StatusLevel::Error);
    }

    #[test]
    fn test_mouse_drag_positions_background() {
        let mut app = test_app(MemoryStore::new());
        app.panel.upload_image(background::sample_payload()).unwrap();

        app.mouse_down(10, 5);
        app.mouse_drag(13, 4);
        app.mouse_up();
        assert_eq!(app.panel.background().display_offset(), Offset::new(3, -1));
        app.cancel_position();
        assert_eq!(app.panel.background().committed_offset(), Offset::default());
    }

    #[test]
    fn test_large_drag_step_saturates() {
        let mut app = test_app(MemoryStore::new());
        app.config.drag_step = i32::MAX;
        app.panel.upload_image(background::sample_payload()).unwrap();

        app.nudge_background(1, 0);
        app.nudge_background(1, 0);
        app.nudge_background(0, -1);
        app.nudge_background(0, -1);
        assert_eq!(
            app.panel.background().display_offset(),
            Offset::new(i32::MAX, i32::MIN)
        );
    }

    #[test]
    fn test_mouse_drag_from_loaded_extreme_offset() {
        let mut app = test_app(MemoryStore::new());
        let bytes = store::encode(store::BG_OFFSET_KEY, &Offset::new(i32::MAX, 0)).unwrap();
        app.panel.apply_loaded(store::BG_OFFSET_KEY, Some(bytes)).unwrap();
        app.panel.upload_image(background::sample_payload()).unwrap();

        app.mouse_down(0, 0);
        app.mouse_drag(5, 0);
        assert_eq!(app.panel.background().display_offset(), Offset::new(i32::MAX, 0));
    }

    #[test]
    fn test_add_and_image_stay_available_in_delete_mode() {
        let mut app = test_app(MemoryStore::new());
        app.add_note();
        app.end_edit();
        app.enter_delete_mode();

        app.add_note();
        assert_eq!(app.panel.notes().len(), 2);
        assert!(app.editing.is_none());
        assert!(app.panel.mode().is_delete_select());

        app.open_image_dialog();
        assert!(app.dialog.is_open());
    }

    #[test]
    fn test_window_pin_without_command() {
        let mut app = test_app(MemoryStore::new());
        assert!(!app.has_window_host());
        app.toggle_window_pin();
        assert!(!app.panel.window_pinned());
        assert_eq!(app.status_message.as_ref().unwrap().level, StatusLevel::Warning);
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(" '/tmp/a b.png' "), PathBuf::from("/tmp/a b.png"));
        assert_eq!(clean_path("file:///tmp/x.jpg"), PathBuf::from("/tmp/x.jpg"));
    }
}

//! The notes panel as one owned state struct.
//!
//! `NotesPanel` has no I/O of its own. Every mutation records which persisted
//! slice became stale; the caller drains those with `drain_writes` and hands
//! the encoded bytes to the store.

use crate::background::{BackgroundState, Offset};
use crate::error::{NotesError, Result};
use crate::host::WindowHost;
use crate::notes::{ClickOutcome, Note, NoteCollection, NoteColor, PanelMode};
use crate::store::{self, BG_IMAGE_KEY, BG_OFFSET_KEY, NOTES_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Notes,
    BgImage,
    BgOffset,
}

impl Slice {
    pub const ALL: [Slice; 3] = [Slice::Notes, Slice::BgImage, Slice::BgOffset];

    pub fn key(self) -> &'static str {
        match self {
            Slice::Notes => NOTES_KEY,
            Slice::BgImage => BG_IMAGE_KEY,
            Slice::BgOffset => BG_OFFSET_KEY,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Slice::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// What the store should do with one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceWrite {
    Put(Vec<u8>),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPin {
    Unavailable,
    Pinned { launched: bool },
    Unpinned,
}

#[derive(Default)]
pub struct NotesPanel {
    notes: NoteCollection,
    mode: PanelMode,
    background: BackgroundState,
    color_picker_open: bool,
    window_pinned: bool,
    dirty: Vec<Slice>,
}

impl NotesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &NoteCollection {
        &self.notes
    }

    pub fn mode(&self) -> &PanelMode {
        &self.mode
    }

    pub fn background(&self) -> &BackgroundState {
        &self.background
    }

    pub fn color_picker_open(&self) -> bool {
        self.color_picker_open
    }

    pub fn window_pinned(&self) -> bool {
        self.window_pinned
    }

    fn mark(&mut self, slice: Slice) {
        if !self.dirty.contains(&slice) {
            self.dirty.push(slice);
        }
    }

    fn mark_if(&mut self, changed: bool, slice: Slice) -> bool {
        if changed {
            self.mark(slice);
        }
        changed
    }

    // ---- note collection ----

    pub fn add_note(&mut self) -> String {
        let id = self.notes.add();
        self.mark(Slice::Notes);
        id
    }

    pub fn remove_note(&mut self, id: &str) -> bool {
        let changed = self.notes.remove(id);
        self.mark_if(changed, Slice::Notes)
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.notes.selected_id().map(str::to_string) {
            Some(id) => self.remove_note(&id),
            None => false,
        }
    }

    pub fn update_text(&mut self, id: &str, text: &str) -> bool {
        let changed = self.notes.update_text(id, text);
        self.mark_if(changed, Slice::Notes)
    }

    pub fn set_color(&mut self, id: &str, color: NoteColor) -> bool {
        let changed = self.notes.set_color(id, color);
        self.mark_if(changed, Slice::Notes)
    }

    pub fn toggle_pin(&mut self, id: &str) -> bool {
        let changed = self.notes.toggle_pin(id);
        self.mark_if(changed, Slice::Notes)
    }

    // ---- selection and delete mode ----

    pub fn click_note(&mut self, id: &str) -> ClickOutcome {
        let outcome = self.mode.click(&mut self.notes, id);
        if matches!(outcome, ClickOutcome::Selected(_)) {
            // The picker belongs to the previous selection.
            self.color_picker_open = false;
        }
        outcome
    }

    pub fn enter_delete_mode(&mut self) -> bool {
        let entered = self.mode.enter_delete(&self.notes);
        if entered {
            self.color_picker_open = false;
        }
        entered
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.mode.cancel_delete()
    }

    /// Removes every marked note. Returns how many went.
    pub fn confirm_delete(&mut self) -> usize {
        let Some(marked) = self.mode.take_marked() else {
            return 0;
        };
        let before = self.notes.len();
        let changed = self.notes.remove_many(&marked);
        self.mark_if(changed, Slice::Notes);
        let removed = before - self.notes.len();
        log::info!("deleted {} note(s)", removed);
        removed
    }

    // ---- color picker ----

    /// Opens or closes the picker. Needs a selected note to open.
    pub fn toggle_color_picker(&mut self) -> bool {
        if self.color_picker_open {
            self.color_picker_open = false;
            return true;
        }
        if self.notes.selected_id().is_none() || self.mode.is_delete_select() {
            return false;
        }
        self.color_picker_open = true;
        true
    }

    /// Colors the selected note and closes the picker.
    pub fn choose_color(&mut self, color: NoteColor) -> bool {
        self.color_picker_open = false;
        match self.notes.selected_id().map(str::to_string) {
            Some(id) => self.set_color(&id, color),
            None => false,
        }
    }

    // ---- background ----

    pub fn upload_image(&mut self, payload: String) -> Result<()> {
        self.background.upload_image(payload)?;
        self.mark(Slice::BgImage);
        Ok(())
    }

    pub fn clear_image(&mut self) -> bool {
        let changed = self.background.clear_image();
        self.mark_if(changed, Slice::BgImage)
    }

    pub fn begin_drag(&mut self, pointer: Offset) -> bool {
        self.background.begin_drag(pointer)
    }

    pub fn drag_to(&mut self, pointer: Offset) -> bool {
        self.background.drag_to(pointer)
    }

    pub fn end_drag_gesture(&mut self) {
        self.background.end_drag_gesture();
    }

    pub fn confirm_position(&mut self) -> bool {
        let committed = self.background.confirm_position();
        self.mark_if(committed, Slice::BgOffset)
    }

    pub fn cancel_position(&mut self) -> bool {
        self.background.cancel_position()
    }

    // ---- host window ----

    /// Cosmetic toggle. Without a host it stays disabled.
    pub fn toggle_window_pin<H: WindowHost + ?Sized>(&mut self, host: Option<&mut H>) -> WindowPin {
        let Some(host) = host else {
            return WindowPin::Unavailable;
        };
        self.window_pinned = !self.window_pinned;
        if !self.window_pinned {
            return WindowPin::Unpinned;
        }
        let launched = match host.open_popup() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("could not open a separate window: {}", e);
                false
            }
        };
        WindowPin::Pinned { launched }
    }

    // ---- persistence ----

    pub fn encode_slice(&self, slice: Slice) -> Result<SliceWrite> {
        let bytes = match slice {
            Slice::Notes => store::encode(NOTES_KEY, &self.notes.notes())?,
            Slice::BgImage => match self.background.payload() {
                Some(payload) => store::encode(BG_IMAGE_KEY, &payload)?,
                None => return Ok(SliceWrite::Clear),
            },
            Slice::BgOffset => store::encode(BG_OFFSET_KEY, &self.background.committed_offset())?,
        };
        Ok(SliceWrite::Put(bytes))
    }

    /// Stale slices with their freshly encoded values.
    pub fn drain_writes(&mut self) -> Vec<(Slice, Result<SliceWrite>)> {
        std::mem::take(&mut self.dirty)
            .into_iter()
            .map(|slice| (slice, self.encode_slice(slice)))
            .collect()
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Applies one slice read back from the store at startup.
    pub fn apply_loaded(&mut self, key: &str, bytes: Option<Vec<u8>>) -> Result<()> {
        let Some(slice) = Slice::from_key(key) else {
            return Err(NotesError::store(key, "unknown key"));
        };
        let Some(bytes) = bytes else {
            return Ok(());
        };
        match slice {
            Slice::Notes => {
                let notes: Vec<Note> = store::decode(key, &bytes)?;
                log::info!("loaded {} note(s)", notes.len());
                self.notes = NoteCollection::from_notes(notes);
                self.mode = PanelMode::Normal;
            }
            Slice::BgImage => {
                let payload: String = store::decode(key, &bytes)?;
                self.background.restore_image(payload)?;
            }
            Slice::BgOffset => {
                let offset: Offset = store::decode(key, &bytes)?;
                self.background.restore_offset(offset);
            }
        }
        Ok(())
    }
}

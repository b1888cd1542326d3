mod mode;

pub use mode::{ClickOutcome, PanelMode};

use std::collections::HashSet;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NotesError;

/// Light colors only, so dark text stays readable on every card.
pub const PALETTE: [&str; 20] = [
    "#fffbe6", "#e6f7ff", "#e6ffe6", "#ffe6fa", "#f0f0f0",
    "#f9fbe7", "#e3f2fd", "#fce4ec", "#f3e5f5", "#e8f5e9",
    "#fffde7", "#e1f5fe", "#f1f8e9", "#f8bbd0", "#f5f5f5",
    "#f0fff0", "#f5f5dc", "#f0ffff", "#f5fffa", "#f8f8ff",
];

/// A palette entry. Serialized as its hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteColor(usize);

impl NoteColor {
    pub fn all() -> impl Iterator<Item = NoteColor> {
        (0..PALETTE.len()).map(NoteColor)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < PALETTE.len()).then_some(NoteColor(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn hex(self) -> &'static str {
        PALETTE[self.0]
    }

    pub fn to_color(self) -> Color {
        let hex = self.hex().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0xff);
        Color::Rgb(channel(0), channel(2), channel(4))
    }
}

impl TryFrom<String> for NoteColor {
    type Error = NotesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PALETTE
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&value))
            .map(NoteColor)
            .ok_or(NotesError::InvalidColor(value))
    }
}

impl From<NoteColor> for String {
    fn from(color: NoteColor) -> Self {
        color.hex().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub pinned: bool,
    pub color: NoteColor,
}

impl Note {
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            text: String::new(),
            pinned: false,
            color: NoteColor::default(),
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_id() -> String {
    format!("_{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Ordered notes plus the single active selection.
///
/// Display order is always `[pinned.., unpinned..]`. Mutators return `true`
/// when the collection changed and therefore has to be persisted again.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    notes: Vec<Note>,
    selected: Option<String>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from storage. The first note becomes the selection.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let selected = notes.first().map(|n| n.id.clone());
        Self { notes, selected }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            log::warn!("{}", NotesError::UnknownId(id.to_string()));
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Prepends an empty note to the unpinned group and selects it. Returns
    /// the new id.
    pub fn add(&mut self) -> String {
        let note = Note::new();
        let id = note.id.clone();
        let head = self.notes.iter().take_while(|n| n.pinned).count();
        self.notes.insert(head, note);
        self.selected = Some(id.clone());
        id
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let mut ids = HashSet::new();
        ids.insert(id.to_string());
        self.remove_many(&ids)
    }

    /// Drops every note in `ids`. When the selection goes with them it falls
    /// to whatever now occupies its old index, else the last note, else none.
    pub fn remove_many(&mut self, ids: &HashSet<String>) -> bool {
        let selected_index = self
            .selected
            .as_deref()
            .filter(|id| ids.contains(*id))
            .and_then(|id| self.position(id));

        let before = self.notes.len();
        self.notes.retain(|n| !ids.contains(&n.id));
        if self.notes.len() == before {
            return false;
        }

        if let Some(index) = selected_index {
            self.selected = if self.notes.is_empty() {
                None
            } else {
                let next = index.min(self.notes.len() - 1);
                Some(self.notes[next].id.clone())
            };
        }
        true
    }

    pub fn update_text(&mut self, id: &str, text: &str) -> bool {
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.text = text.to_string();
                true
            }
            None => {
                log::warn!("update_text: {}", NotesError::UnknownId(id.to_string()));
                false
            }
        }
    }

    pub fn set_color(&mut self, id: &str, color: NoteColor) -> bool {
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.color = color;
                true
            }
            None => {
                log::warn!("set_color: {}", NotesError::UnknownId(id.to_string()));
                false
            }
        }
    }

    /// Flips the pin flag and re-partitions. Relative order inside each group
    /// is kept, so a freshly pinned note lands at the end of the pinned block
    /// and a freshly unpinned one at the head of the unpinned block.
    pub fn toggle_pin(&mut self, id: &str) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            log::warn!("toggle_pin: {}", NotesError::UnknownId(id.to_string()));
            return false;
        };
        note.pinned = !note.pinned;

        let (pinned, unpinned): (Vec<Note>, Vec<Note>) =
            self.notes.drain(..).partition(|n| n.pinned);
        self.notes = pinned;
        self.notes.extend(unpinned);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(collection: &NoteCollection) -> Vec<String> {
        collection.notes().iter().map(|n| n.id.clone()).collect()
    }

    fn is_partitioned(collection: &NoteCollection) -> bool {
        let first_unpinned = collection
            .notes()
            .iter()
            .position(|n| !n.pinned)
            .unwrap_or(collection.len());
        collection.notes()[first_unpinned..].iter().all(|n| !n.pinned)
    }

    #[test]
    fn test_add_prepends_and_selects() {
        let mut c = NoteCollection::new();
        let first = c.add();
        let second = c.add();

        assert_eq!(ids(&c), vec![second.clone(), first]);
        assert_eq!(c.selected_id(), Some(second.as_str()));

        let note = c.selected().unwrap();
        assert!(note.text.is_empty());
        assert!(!note.pinned);
        assert_eq!(note.color.hex(), PALETTE[0]);
    }

    #[test]
    fn test_add_goes_below_pinned_notes() {
        let mut c = NoteCollection::new();
        let pinned = c.add();
        c.toggle_pin(&pinned);
        let fresh = c.add();

        assert_eq!(ids(&c), vec![pinned, fresh]);
        assert!(is_partitioned(&c));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut c = NoteCollection::new();
        let all: HashSet<String> = (0..200).map(|_| c.add()).collect();
        assert_eq!(all.len(), 200);
    }

    #[test]
    fn test_add_then_remove_all_leaves_nothing() {
        let mut c = NoteCollection::new();
        let added: Vec<String> = (0..5).map(|_| c.add()).collect();
        for id in &added {
            assert!(c.remove(id));
        }
        assert!(c.is_empty());
        assert_eq!(c.selected_id(), None);
    }

    #[test]
    fn test_remove_selected_falls_to_same_index() {
        let mut c = NoteCollection::new();
        c.add();
        c.add();
        c.add();
        let order = ids(&c);

        c.select(&order[1]);
        assert!(c.remove(&order[1]));
        assert_eq!(c.selected_id(), Some(order[2].as_str()));
    }

    #[test]
    fn test_remove_selected_last_index_falls_back_to_last() {
        let mut c = NoteCollection::new();
        c.add();
        c.add();
        let order = ids(&c);

        c.select(&order[1]);
        c.remove(&order[1]);
        assert_eq!(c.selected_id(), Some(order[0].as_str()));

        c.remove(&order[0]);
        assert_eq!(c.selected_id(), None);
    }

    #[test]
    fn test_remove_other_note_keeps_selection() {
        let mut c = NoteCollection::new();
        c.add();
        let keep = c.add();
        let order = ids(&c);

        c.remove(&order[1]);
        assert_eq!(c.selected_id(), Some(keep.as_str()));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut c = NoteCollection::new();
        c.add();
        assert!(!c.remove("_missing"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_remove_many_keeps_relative_order() {
        let mut c = NoteCollection::new();
        for _ in 0..5 {
            c.add();
        }
        let order = ids(&c);
        let doomed: HashSet<String> = [order[1].clone(), order[3].clone()].into_iter().collect();

        assert!(c.remove_many(&doomed));
        assert_eq!(ids(&c), vec![order[0].clone(), order[2].clone(), order[4].clone()]);
    }

    #[test]
    fn test_remove_many_reassigns_selection_once() {
        let mut c = NoteCollection::new();
        for _ in 0..4 {
            c.add();
        }
        let order = ids(&c);
        c.select(&order[1]);

        let doomed: HashSet<String> = [order[1].clone(), order[2].clone()].into_iter().collect();
        c.remove_many(&doomed);
        assert_eq!(c.selected_id(), Some(order[3].as_str()));
    }

    #[test]
    fn test_update_text_is_verbatim() {
        let mut c = NoteCollection::new();
        let id = c.add();
        assert!(c.update_text(&id, "  spaced\n  lines  "));
        assert_eq!(c.get(&id).unwrap().text, "  spaced\n  lines  ");
        assert!(!c.update_text("_missing", "x"));
    }

    #[test]
    fn test_set_color() {
        let mut c = NoteCollection::new();
        let id = c.add();
        let color = NoteColor::from_index(7).unwrap();
        assert!(c.set_color(&id, color));
        assert_eq!(c.get(&id).unwrap().color.hex(), "#fce4ec");
    }

    #[test]
    fn test_color_rejects_values_outside_palette() {
        assert!(NoteColor::try_from("#000000".to_string()).is_err());
        assert!(NoteColor::from_index(PALETTE.len()).is_none());
        assert_eq!(
            NoteColor::try_from("#E6F7FF".to_string()).unwrap().index(),
            1
        );
    }

    #[test]
    fn test_toggle_pin_partitions() {
        let mut c = NoteCollection::new();
        for _ in 0..4 {
            c.add();
        }
        let order = ids(&c);

        c.toggle_pin(&order[2]);
        assert_eq!(
            ids(&c),
            vec![order[2].clone(), order[0].clone(), order[1].clone(), order[3].clone()]
        );

        c.toggle_pin(&order[3]);
        assert_eq!(
            ids(&c),
            vec![order[2].clone(), order[3].clone(), order[0].clone(), order[1].clone()]
        );
        assert!(is_partitioned(&c));
    }

    #[test]
    fn test_unpin_moves_to_head_of_unpinned_group() {
        let mut c = NoteCollection::new();
        for _ in 0..3 {
            c.add();
        }
        let order = ids(&c);
        c.toggle_pin(&order[1]);
        c.toggle_pin(&order[2]);
        // [1*, 2*, 0]
        c.toggle_pin(&order[1]);
        assert_eq!(ids(&c), vec![order[2].clone(), order[1].clone(), order[0].clone()]);
        assert!(is_partitioned(&c));
    }

    #[test]
    fn test_pin_then_unpin_head_note_restores() {
        let mut c = NoteCollection::new();
        for _ in 0..3 {
            c.add();
        }
        let original = c.notes().to_vec();
        let head = original[0].id.clone();

        c.toggle_pin(&head);
        assert!(c.get(&head).unwrap().pinned);
        c.toggle_pin(&head);

        assert_eq!(c.notes(), original.as_slice());
    }

    #[test]
    fn test_pin_then_unpin_middle_note_moves_it_to_front() {
        let mut c = NoteCollection::new();
        for _ in 0..3 {
            c.add();
        }
        let before = ids(&c);
        let middle = before[1].clone();

        c.toggle_pin(&middle);
        c.toggle_pin(&middle);

        assert!(!c.get(&middle).unwrap().pinned);
        assert_eq!(ids(&c), vec![before[1].clone(), before[0].clone(), before[2].clone()]);
    }

    #[test]
    fn test_from_notes_selects_first() {
        let notes = vec![Note::new(), Note::new()];
        let first = notes[0].id.clone();
        let c = NoteCollection::from_notes(notes);
        assert_eq!(c.selected_id(), Some(first.as_str()));
        assert_eq!(NoteCollection::from_notes(Vec::new()).selected_id(), None);
    }

    #[test]
    fn test_to_color_parses_hex() {
        assert_eq!(NoteColor::default().to_color(), Color::Rgb(0xff, 0xfb, 0xe6));
    }
}

use std::collections::HashSet;

use super::NoteCollection;

/// What a click on a note card means depends on this mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelMode {
    #[default]
    Normal,
    DeleteSelect { marked: HashSet<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(String),
    Marked(String),
    Unmarked(String),
    Ignored,
}

impl PanelMode {
    pub fn is_delete_select(&self) -> bool {
        matches!(self, PanelMode::DeleteSelect { .. })
    }

    pub fn is_marked(&self, id: &str) -> bool {
        match self {
            PanelMode::DeleteSelect { marked } => marked.contains(id),
            PanelMode::Normal => false,
        }
    }

    pub fn marked_count(&self) -> usize {
        match self {
            PanelMode::DeleteSelect { marked } => marked.len(),
            PanelMode::Normal => 0,
        }
    }

    /// Only possible with at least one note. Starts with no marks.
    pub fn enter_delete(&mut self, notes: &NoteCollection) -> bool {
        if notes.is_empty() || self.is_delete_select() {
            return false;
        }
        *self = PanelMode::DeleteSelect {
            marked: HashSet::new(),
        };
        true
    }

    /// Back to normal without touching the collection.
    pub fn cancel_delete(&mut self) -> bool {
        if !self.is_delete_select() {
            return false;
        }
        *self = PanelMode::Normal;
        true
    }

    /// Leaves delete mode and hands back the marked ids for removal.
    pub fn take_marked(&mut self) -> Option<HashSet<String>> {
        match std::mem::take(self) {
            PanelMode::DeleteSelect { marked } => Some(marked),
            PanelMode::Normal => None,
        }
    }

    /// Single entry point for a click on a note card.
    pub fn click(&mut self, notes: &mut NoteCollection, id: &str) -> ClickOutcome {
        if notes.get(id).is_none() {
            return ClickOutcome::Ignored;
        }
        match self {
            PanelMode::Normal => {
                notes.select(id);
                ClickOutcome::Selected(id.to_string())
            }
            PanelMode::DeleteSelect { marked } => {
                if marked.remove(id) {
                    ClickOutcome::Unmarked(id.to_string())
                } else {
                    marked.insert(id.to_string());
                    ClickOutcome::Marked(id.to_string())
                }
            }
        }
    }
}

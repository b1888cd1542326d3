mod input;

pub use input::{process_key, CursorMove, InputAction};

/// Small text field with a char-indexed cursor, used for note bodies and
/// single-line dialog inputs.
#[derive(Debug, Clone, Default)]
pub struct NoteEditor {
    text: String,
    cursor: usize,
}

impl NoteEditor {
    /// Cursor starts at the end of `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true when the text changed.
    pub fn apply(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::InsertChar(c) => {
                self.insert_str(&c.to_string());
                true
            }
            InputAction::InsertNewline => {
                self.insert_str("\n");
                true
            }
            InputAction::DeleteCharBefore => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                let idx = char_to_byte_index(&self.text, self.cursor);
                self.text.remove(idx);
                true
            }
            InputAction::DeleteChar => {
                if self.cursor >= self.char_len() {
                    return false;
                }
                let idx = char_to_byte_index(&self.text, self.cursor);
                self.text.remove(idx);
                true
            }
            InputAction::Move(m) => {
                self.move_cursor(m);
                false
            }
            InputAction::None => false,
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        let idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(idx, s);
        self.cursor += s.chars().count();
    }

    /// (row, col) of the cursor in chars.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count());
        (row, col)
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn line_starts(&self) -> Vec<usize> {
        let mut starts = vec![0];
        for (i, c) in self.text.chars().enumerate() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        starts
    }

    fn line_len(&self, row: usize) -> usize {
        self.text.split('\n').nth(row).map_or(0, |l| l.chars().count())
    }

    fn move_cursor(&mut self, m: CursorMove) {
        let (row, col) = self.cursor_row_col();
        let starts = self.line_starts();
        match m {
            CursorMove::Back => self.cursor = self.cursor.saturating_sub(1),
            CursorMove::Forward => self.cursor = (self.cursor + 1).min(self.char_len()),
            CursorMove::Head => self.cursor = starts[row],
            CursorMove::End => self.cursor = starts[row] + self.line_len(row),
            CursorMove::Up => {
                if row > 0 {
                    self.cursor = starts[row - 1] + col.min(self.line_len(row - 1));
                }
            }
            CursorMove::Down => {
                if row + 1 < starts.len() {
                    self.cursor = starts[row + 1] + col.min(self.line_len(row + 1));
                }
            }
        }
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

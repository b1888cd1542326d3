use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Back,
    Forward,
    Up,
    Down,
    Head,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    InsertChar(char),
    InsertNewline,
    DeleteChar,
    DeleteCharBefore,
    Move(CursorMove),
    None,
}

/// Maps a key to an edit. `multiline` decides whether Enter breaks the line.
pub fn process_key(key: KeyEvent, multiline: bool) -> InputAction {
    match key.code {
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                InputAction::None
            } else {
                InputAction::InsertChar(c)
            }
        }
        KeyCode::Enter if multiline => InputAction::InsertNewline,
        KeyCode::Backspace => InputAction::DeleteCharBefore,
        KeyCode::Delete => InputAction::DeleteChar,
        KeyCode::Left => InputAction::Move(CursorMove::Back),
        KeyCode::Right => InputAction::Move(CursorMove::Forward),
        KeyCode::Up if multiline => InputAction::Move(CursorMove::Up),
        KeyCode::Down if multiline => InputAction::Move(CursorMove::Down),
        KeyCode::Home => InputAction::Move(CursorMove::Head),
        KeyCode::End => InputAction::Move(CursorMove::End),
        KeyCode::Tab if multiline => InputAction::InsertChar('\t'),
        _ => InputAction::None,
    }
}

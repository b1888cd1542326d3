//! The old single-note popup, kept for notes written before the panel existed.
//!
//! It talks to the sync store directly: one string under `note`, loaded at
//! start and written on Ctrl+S. The save button reads "Saved!" for a second
//! after each successful write.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use crate::config::Theme;
use crate::editor::{process_key, NoteEditor};
use crate::error::Result;
use crate::store::{self, KeyValueStore, LEGACY_NOTE_KEY};

const SAVED_LABEL_FOR: Duration = Duration::from_secs(1);

pub struct LegacyPopup {
    store: Box<dyn KeyValueStore>,
    editor: NoteEditor,
    saved_at: Option<Instant>,
    error: Option<String>,
    save_button: Rect,
    should_quit: bool,
}

impl LegacyPopup {
    /// A store that cannot be read yields an empty note and a visible error.
    pub fn open(sync_store: Box<dyn KeyValueStore>) -> Self {
        let (text, error) = match store::load::<String>(sync_store.as_ref(), LEGACY_NOTE_KEY) {
            Ok(text) => (text.unwrap_or_default(), None),
            Err(e) => {
                log::warn!("legacy note not loaded: {}", e);
                (String::new(), Some(e.to_string()))
            }
        };
        Self {
            store: sync_store,
            editor: NoteEditor::new(&text),
            saved_at: None,
            error,
            save_button: Rect::default(),
            should_quit: false,
        }
    }

    pub fn text(&self) -> &str {
        self.editor.text()
    }

    pub fn save(&mut self) -> Result<()> {
        store::save(self.store.as_mut(), LEGACY_NOTE_KEY, &self.editor.text())?;
        self.saved_at = Some(Instant::now());
        self.error = None;
        log::info!("legacy note saved");
        Ok(())
    }

    fn save_and_report(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("{}", e);
            self.error = Some(e.to_string());
        }
    }

    pub fn button_label_at(&self, now: Instant) -> &'static str {
        match self.saved_at {
            Some(at) if now.saturating_duration_since(at) < SAVED_LABEL_FOR => "Saved!",
            _ => "Save",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => self.save_and_report(),
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Esc => self.should_quit = true,
            _ => {
                self.editor.apply(process_key(key, true));
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, theme: &Theme) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let block = Block::default()
            .title(" Note ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.primary))
            .style(Style::default().bg(theme.background).fg(theme.foreground));
        let inner = block.inner(chunks[0]);

        let (row, col) = self.editor.cursor_row_col();
        let first = row.saturating_sub(inner.height.saturating_sub(1) as usize);
        let lines: Vec<Line> = self
            .editor
            .text()
            .split('\n')
            .skip(first)
            .map(|l| Line::from(l.to_string()))
            .collect();
        f.render_widget(Paragraph::new(lines).block(block), chunks[0]);

        let line = self.editor.text().split('\n').nth(row).unwrap_or("");
        let before: String = line.chars().take(col).collect();
        f.set_cursor_position(Position::new(
            inner.x + (before.width() as u16).min(inner.width.saturating_sub(1)),
            inner.y + (row - first) as u16,
        ));

        let label = format!("[{}]", self.button_label_at(Instant::now()));
        let label_width = label.width() as u16;
        self.save_button = Rect::new(chunks[1].x + 1, chunks[1].y, label_width, 1);

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(label, Style::default().fg(theme.success).add_modifier(Modifier::BOLD)),
        ];
        match &self.error {
            Some(e) => spans.push(Span::styled(format!("  {}", e), Style::default().fg(theme.error))),
            None => spans.push(Span::styled(
                "  Ctrl+S save  Esc close",
                Style::default().fg(theme.muted),
            )),
        }
        f.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.statusbar.background)),
            chunks[1],
        );
    }
}

pub fn run_legacy(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    popup: &mut LegacyPopup,
    theme: &Theme,
) -> io::Result<()> {
    while !popup.should_quit {
        terminal.draw(|f| popup.render(f, theme))?;
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => popup.handle_key(key),
            Event::Paste(text) => popup.editor.insert_str(&text),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if popup.save_button.contains(Position::new(mouse.column, mouse.row)) {
                    popup.save_and_report();
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ratatui::backend::TestBackend;

    fn type_text(popup: &mut LegacyPopup, text: &str) {
        for c in text.chars() {
            popup.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_missing_note_opens_empty() {
        let popup = LegacyPopup::open(Box::new(MemoryStore::new()));
        assert_eq!(popup.text(), "");
        assert!(popup.error.is_none());
    }

    #[test]
    fn test_ctrl_s_saves_and_reloads() {
        let store = MemoryStore::new();
        let mut popup = LegacyPopup::open(Box::new(store.clone()));
        type_text(&mut popup, "remember");
        popup.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        let reopened = LegacyPopup::open(Box::new(store));
        assert_eq!(reopened.text(), "remember");
    }

    #[test]
    fn test_saved_label_reverts_after_a_second() {
        let mut popup = LegacyPopup::open(Box::new(MemoryStore::new()));
        let before = Instant::now();
        assert_eq!(popup.button_label_at(before), "Save");

        popup.save().unwrap();
        let at = popup.saved_at.unwrap();
        assert_eq!(popup.button_label_at(at), "Saved!");
        assert_eq!(popup.button_label_at(at + Duration::from_millis(999)), "Saved!");
        assert_eq!(popup.button_label_at(at + SAVED_LABEL_FOR), "Save");
    }

    #[test]
    fn test_failed_save_keeps_label_and_shows_error() {
        let mut popup = LegacyPopup::open(Box::new(MemoryStore::unavailable()));
        assert!(popup.error.is_some());
        popup.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(popup.button_label_at(Instant::now()), "Save");
        assert!(popup.error.is_some());
    }

    #[test]
    fn test_render_shows_button() {
        let mut popup = LegacyPopup::open(Box::new(MemoryStore::new()));
        type_text(&mut popup, "hello");
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|f| popup.render(f, &Theme::default()))
            .unwrap();
        assert_eq!(popup.save_button.width, "[Save]".len() as u16);
    }
}

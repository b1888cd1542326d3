use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::notes::Note;

const BODY_LINES: usize = 3;
const EDIT_LINES: usize = 8;

pub const EMPTY_TEXT: &str = "No notes yet. Press a to add one.";

/// Cuts `text` to `width` columns, ending with an ellipsis when it had to cut.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn body_lines(app: &App, note: &Note) -> (Vec<String>, usize) {
    match &app.editing {
        Some(session) if session.id == note.id => {
            let lines: Vec<String> = session.editor.text().split('\n').map(str::to_string).collect();
            let (row, _) = session.editor.cursor_row_col();
            let first = row.saturating_sub(EDIT_LINES - 1);
            let shown = lines.into_iter().skip(first).take(EDIT_LINES).collect();
            (shown, first)
        }
        _ => {
            let lines: Vec<String> = note.text.lines().take(BODY_LINES).map(str::to_string).collect();
            (lines, 0)
        }
    }
}

fn card_height(app: &App, note: &Note) -> u16 {
    let (lines, _) = body_lines(app, note);
    lines.len().max(1) as u16 + 2
}

pub fn render_notes(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme.clone();
    let list_area = Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(2),
        area.height,
    );

    if app.panel.notes().is_empty() {
        let y = area.y + area.height / 2;
        let hint = Paragraph::new(Line::from(Span::styled(
            EMPTY_TEXT,
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center);
        f.render_widget(hint, Rect::new(area.x, y, area.width, 1.min(area.height)));
        return;
    }

    let heights: Vec<u16> = app
        .panel
        .notes()
        .notes()
        .iter()
        .map(|n| card_height(app, n))
        .collect();

    let delete_mode = app.panel.mode().is_delete_select();
    let focus = if delete_mode {
        Some(app.delete_cursor)
    } else {
        app.panel
            .notes()
            .selected_id()
            .and_then(|id| app.panel.notes().position(id))
    };
    if let Some(focus) = focus {
        app.list_scroll = scroll_to(app.list_scroll, focus, &heights, list_area.height);
    }
    app.list_scroll = app.list_scroll.min(heights.len().saturating_sub(1));

    let mut y = list_area.y;
    let bottom = list_area.y + list_area.height;
    let mut cards = Vec::new();
    let mut stars = Vec::new();
    let mut cursor = None;

    let notes = app.panel.notes().notes();
    for (i, note) in notes.iter().enumerate().skip(app.list_scroll) {
        if y >= bottom {
            break;
        }
        let height = heights[i].min(bottom - y);
        let card = Rect::new(list_area.x, y, list_area.width, height);
        y += heights[i];

        let selected = app.panel.notes().selected_id() == Some(note.id.as_str());
        let marked = app.panel.mode().is_marked(&note.id);
        let editing = app.editing.as_ref().is_some_and(|s| s.id == note.id);
        let under_cursor = delete_mode && i == app.delete_cursor;

        let border_color = if marked {
            theme.error
        } else if under_cursor || editing {
            theme.primary
        } else if selected && !delete_mode {
            theme.primary
        } else {
            theme.border
        };
        let border_type = if selected || under_cursor || editing {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };

        let mut title = vec![Span::raw(" ")];
        if delete_mode {
            let mark = if marked { "[x] " } else { "[ ] " };
            title.push(Span::styled(mark, Style::default().fg(theme.error)));
        }
        let star = if note.pinned {
            Span::styled("★", Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
        } else {
            Span::styled("☆", Style::default().fg(theme.note_text))
        };
        let mark_width = if delete_mode { 4 } else { 0 };
        let star_x = card.x + 2 + mark_width;
        stars.push((note.id.clone(), Rect::new(star_x, card.y, 1, 1)));
        title.push(star);
        title.push(Span::raw(" "));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(Style::default().fg(border_color))
            .title(Line::from(title))
            .style(Style::default().bg(note.color.to_color()).fg(theme.note_text));
        let inner = block.inner(card);
        let width = inner.width as usize;

        let (lines, first_row) = body_lines(app, note);
        let body: Vec<Line> = if lines.iter().all(|l| l.is_empty()) && !editing {
            vec![Line::from(Span::styled(
                "Empty note",
                Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
            ))]
        } else {
            lines.iter().map(|l| Line::from(fit(l, width))).collect()
        };

        f.render_widget(Paragraph::new(body).block(block), card);
        cards.push((note.id.clone(), card));

        if let Some(session) = app.editing.as_ref().filter(|_| editing) {
            let (row, col) = session.editor.cursor_row_col();
            let line = session.editor.text().split('\n').nth(row).unwrap_or("");
            let before: String = line.chars().take(col).collect();
            let cx = inner.x + (before.width() as u16).min(inner.width.saturating_sub(1));
            let cy = inner.y + (row - first_row) as u16;
            if cy < inner.y + inner.height {
                cursor = Some(Position::new(cx, cy));
            }
        }
    }

    app.hits.cards = cards;
    app.hits.stars = stars;
    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}

/// Smallest scroll change that keeps the card at `focus` fully visible.
fn scroll_to(scroll: usize, focus: usize, heights: &[u16], view: u16) -> usize {
    if focus < scroll {
        return focus;
    }
    let mut scroll = scroll;
    while scroll < focus {
        let used: u32 = heights[scroll..=focus].iter().map(|&h| u32::from(h)).sum();
        if used <= u32::from(view) {
            break;
        }
        scroll += 1;
    }
    scroll
}

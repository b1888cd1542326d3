use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{clean_path, App, Dialog};

const DIALOG_WIDTH: u16 = 60;
const DIALOG_HEIGHT: u16 = 3;

/// Image path prompt for the background upload.
pub fn render_path_dialog(f: &mut Frame, app: &App, area: Rect) {
    let Dialog::ImagePath(input) = &app.dialog else {
        return;
    };
    let theme = &app.theme;

    let dialog_width = DIALOG_WIDTH.min(area.width.saturating_sub(2));
    let dialog_x = area.x + area.width.saturating_sub(dialog_width) / 2;
    let dialog_y = area.y + area.height.saturating_sub(DIALOG_HEIGHT) / 3;
    let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, DIALOG_HEIGHT.min(area.height));

    f.render_widget(Clear, dialog_area);

    let query = input.text();
    let available_width = (dialog_width as usize).saturating_sub(4);

    // Keep the tail visible, that is where typing happens.
    let display_query = if query.width() > available_width {
        let mut tail: Vec<char> = Vec::new();
        let mut width = 3;
        for c in query.chars().rev() {
            width += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if width > available_width {
                break;
            }
            tail.push(c);
        }
        format!("...{}", tail.into_iter().rev().collect::<String>())
    } else {
        query.to_string()
    };

    let input_line = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(display_query, Style::default().fg(theme.foreground)),
        Span::styled("_", Style::default().fg(theme.primary).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let border_color = if query.trim().is_empty() {
        theme.border
    } else if clean_path(query).is_file() {
        theme.success
    } else {
        theme.error
    };

    let dialog = Paragraph::new(vec![input_line]).block(
        Block::default()
            .title(" Background image ")
            .title_bottom(
                Line::from(Span::styled(" Enter: load, Esc: close ", Style::default().fg(theme.muted)))
                    .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.background)),
    );

    f.render_widget(dialog, dialog_area);
}

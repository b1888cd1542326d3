use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, StatusLevel};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let statusbar = &theme.statusbar;
    let panel = &app.panel;

    let mode_text = if app.dialog.is_open() {
        "open image".to_string()
    } else if panel.background().is_positioning() {
        "positioning".to_string()
    } else if panel.mode().is_delete_select() {
        format!("delete ({} marked)", panel.mode().marked_count())
    } else if app.editing.is_some() {
        "editing".to_string()
    } else if app.is_loading() {
        "loading".to_string()
    } else {
        "notes".to_string()
    };

    let hint = if app.dialog.is_open() {
        "Enter: load  Esc: cancel"
    } else if panel.background().is_positioning() {
        "←↑↓→: move  Enter: place  Esc: cancel"
    } else if panel.mode().is_delete_select() {
        "Space: mark  y: delete  Esc: cancel"
    } else if app.editing.is_some() {
        "Esc: done"
    } else if panel.color_picker_open() {
        "←→: color  Enter: apply  Esc: close"
    } else {
        "a add  e edit  p pin  c color  b image  d delete  q quit"
    };

    let brand = Span::styled(
        " stickit ",
        Style::default()
            .fg(statusbar.brand)
            .add_modifier(Modifier::BOLD),
    );

    let separator = || Span::styled("›", Style::default().fg(statusbar.separator));

    let mode = Span::styled(format!(" {} ", mode_text), Style::default().fg(statusbar.mode));

    let body = match &app.status_message {
        Some(msg) => {
            let color = match msg.level {
                StatusLevel::Info => theme.info,
                StatusLevel::Warning => theme.warning,
                StatusLevel::Error => theme.error,
            };
            Span::styled(
                format!(" {}", msg.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        }
        None => Span::styled(format!(" {}", hint), Style::default().fg(statusbar.foreground)),
    };

    let notes = panel.notes().notes();
    let pinned = notes.iter().filter(|n| n.pinned).count();
    let mut right_content = Vec::new();
    if panel.window_pinned() {
        right_content.push(Span::styled(
            "window  ",
            Style::default().fg(theme.pin).add_modifier(Modifier::BOLD),
        ));
    }
    right_content.push(Span::styled(
        format!("{} notes", notes.len()),
        Style::default().fg(statusbar.mode),
    ));
    right_content.push(Span::styled(
        format!("  {} pinned ", pinned),
        Style::default().fg(statusbar.mode),
    ));

    let left_content = vec![brand, separator(), mode, separator(), body];

    let left_width: usize = left_content.iter().map(|s| s.width()).sum();
    let right_width: usize = right_content.iter().map(|s| s.width()).sum();
    let middle_padding = (area.width as usize).saturating_sub(left_width + right_width);

    let bg_style = if app.config.transparent_bg {
        Style::default()
    } else {
        Style::default().bg(statusbar.background)
    };

    let mut spans = left_content;
    spans.push(Span::styled(" ".repeat(middle_padding), bg_style));
    spans.extend(right_content);

    f.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

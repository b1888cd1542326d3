use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, TopBarButton};

struct ButtonSpec {
    button: TopBarButton,
    label: &'static str,
    enabled: bool,
    active: bool,
}

fn button(button: TopBarButton, label: &'static str) -> ButtonSpec {
    ButtonSpec {
        button,
        label,
        enabled: true,
        active: false,
    }
}

/// The action row for the current mode.
fn buttons(app: &App) -> Vec<ButtonSpec> {
    let panel = &app.panel;
    if panel.background().is_positioning() {
        return vec![
            button(TopBarButton::ConfirmPosition, "✔ Place"),
            button(TopBarButton::CancelPosition, "✖ Cancel"),
        ];
    }
    if panel.mode().is_delete_select() {
        return vec![
            button(TopBarButton::Add, "+ Add"),
            button(TopBarButton::ConfirmDelete, "✔ Delete marked"),
            button(TopBarButton::CancelDelete, "✖ Cancel"),
            button(TopBarButton::Background, "Image"),
        ];
    }

    let has_selection = panel.notes().selected_id().is_some();
    let mut row = vec![
        button(TopBarButton::Add, "+ Add"),
        ButtonSpec {
            enabled: !panel.notes().is_empty(),
            ..button(TopBarButton::Delete, "Delete")
        },
        ButtonSpec {
            enabled: has_selection,
            active: panel.color_picker_open(),
            ..button(TopBarButton::Color, "Color")
        },
        button(TopBarButton::Background, "Image"),
    ];
    if panel.background().image().is_some() {
        row.push(button(TopBarButton::ClearBackground, "No image"));
    }
    row.push(ButtonSpec {
        enabled: app.has_window_host(),
        active: panel.window_pinned(),
        ..button(TopBarButton::PinWindow, "Window")
    });
    row
}

pub fn render_top_bar(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![Span::raw(" ")];
    let mut hits = Vec::new();
    let mut x = area.x + 1;

    for spec in buttons(app) {
        let label = format!("[{}]", spec.label);
        let width = label.width() as u16;
        if x + width > area.x + area.width {
            break;
        }

        let style = if !spec.enabled {
            Style::default().fg(theme.muted)
        } else if spec.active {
            Style::default().fg(theme.pin).add_modifier(Modifier::BOLD)
        } else {
            match spec.button {
                TopBarButton::ConfirmDelete | TopBarButton::ConfirmPosition => {
                    Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
                }
                TopBarButton::CancelDelete | TopBarButton::CancelPosition => {
                    Style::default().fg(theme.error)
                }
                _ => Style::default().fg(theme.foreground),
            }
        };

        if spec.enabled {
            hits.push((spec.button, Rect::new(x, area.y, width, 1)));
        }
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x += width + 1;
    }

    let bar_style = if app.config.transparent_bg {
        Style::default()
    } else {
        Style::default().bg(theme.statusbar.background)
    };
    f.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), area);
    app.hits.buttons = hits;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn app() -> App {
        let mut app = App::with_parts(Config::default(), Box::new(MemoryStore::new()), None, None);
        app.wait_for_load(Duration::from_secs(5));
        app
    }

    fn enabled(app: &App) -> Vec<TopBarButton> {
        buttons(app)
            .into_iter()
            .filter(|b| b.enabled)
            .map(|b| b.button)
            .collect()
    }

    #[test]
    fn test_empty_panel_disables_delete_and_color() {
        let app = app();
        let row = enabled(&app);
        assert!(row.contains(&TopBarButton::Add));
        assert!(!row.contains(&TopBarButton::Delete));
        assert!(!row.contains(&TopBarButton::Color));
        assert!(!row.contains(&TopBarButton::PinWindow));
    }

    #[test]
    fn test_delete_mode_swaps_the_row() {
        let mut app = app();
        app.panel.add_note();
        app.enter_delete_mode();
        assert_eq!(
            enabled(&app),
            vec![
                TopBarButton::Add,
                TopBarButton::ConfirmDelete,
                TopBarButton::CancelDelete,
                TopBarButton::Background,
            ]
        );
    }
}

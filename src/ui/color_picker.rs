use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::notes::NoteColor;

const SWATCH_WIDTH: u16 = 3;

/// Palette strip under the top bar, shown while a note is selected.
pub fn render_color_picker(f: &mut Frame, app: &mut App, area: Rect) {
    if !app.panel.color_picker_open() {
        return;
    }
    let theme = &app.theme;
    let current = app.panel.notes().selected().map(|n| n.color);

    let count = NoteColor::all().count() as u16;
    let width = (count * SWATCH_WIDTH + 2).min(area.width);
    let popup = Rect::new(area.x + 1, area.y, width, 3.min(area.height));
    f.render_widget(Clear, popup);

    let mut spans = Vec::new();
    let mut swatches = Vec::new();
    let inner_x = popup.x + 1;
    for (i, color) in NoteColor::all().enumerate() {
        let x = inner_x + i as u16 * SWATCH_WIDTH;
        if x + SWATCH_WIDTH > popup.x + popup.width.saturating_sub(1) {
            break;
        }
        let symbol = if i == app.swatch_cursor {
            " ◆ "
        } else if Some(color) == current {
            " • "
        } else {
            "   "
        };
        spans.push(Span::styled(
            symbol,
            Style::default()
                .bg(color.to_color())
                .fg(theme.note_text)
                .add_modifier(Modifier::BOLD),
        ));
        swatches.push((color, Rect::new(x, popup.y + 1, SWATCH_WIDTH, 1)));
    }

    let picker = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Color ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(picker, popup);
    app.hits.swatches = swatches;
}

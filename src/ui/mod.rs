mod background;
mod color_picker;
mod notes_list;
mod path_dialog;
mod status_bar;
mod top_bar;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::App;

pub use notes_list::EMPTY_TEXT;

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    if !app.config.transparent_bg {
        f.render_widget(Block::default().style(Style::default().bg(app.theme.background)), area);
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let body = Rect::new(
        chunks[1].x,
        chunks[1].y + 1.min(chunks[1].height),
        chunks[1].width,
        chunks[1].height.saturating_sub(1),
    );

    app.hits.clear();

    background::render_background(f, app, chunks[1]);
    top_bar::render_top_bar(f, app, chunks[0]);
    notes_list::render_notes(f, app, body);
    color_picker::render_color_picker(f, app, body);
    background::render_positioning_hint(f, app, chunks[1]);
    path_dialog::render_path_dialog(f, app, area);
    status_bar::render_status_bar(f, app, chunks[2]);
}

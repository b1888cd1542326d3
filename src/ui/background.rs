use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use ratatui_image::picker::Picker;
use ratatui_image::{Image as ImageWidget, Resize};

use crate::app::{App, BackgroundRender};
use crate::background::Offset;

/// Scales `image` to cover the viewport, centred, then shifts it by the
/// offset in pixels. Uncovered pixels stay transparent.
fn build_viewport_image(
    image: &DynamicImage,
    viewport_w_px: u32,
    viewport_h_px: u32,
    shift_x_px: i64,
    shift_y_px: i64,
) -> DynamicImage {
    let viewport_w_px = viewport_w_px.max(1);
    let viewport_h_px = viewport_h_px.max(1);
    let cover = image.resize_to_fill(viewport_w_px, viewport_h_px, FilterType::Triangle);

    let mut viewport = RgbaImage::from_pixel(viewport_w_px, viewport_h_px, Rgba([0, 0, 0, 0]));
    imageops::overlay(&mut viewport, &cover.to_rgba8(), shift_x_px, shift_y_px);
    DynamicImage::ImageRgba8(viewport)
}

fn refresh_protocol(app: &mut App, area: Rect) {
    let Some(picker) = app.picker.as_ref() else {
        app.background_render = None;
        return;
    };
    let background = app.panel.background();
    let Some(bg) = background.image() else {
        app.background_render = None;
        return;
    };

    let offset = background.display_offset();
    let key = (background.generation(), offset, area);
    if app.background_render.as_ref().is_some_and(|r| r.key == key) {
        return;
    }

    let viewport = viewport_for(picker, bg.image(), area, offset);
    match picker.new_protocol(viewport, area, Resize::Fit(None)) {
        Ok(protocol) => app.background_render = Some(BackgroundRender { key, protocol }),
        Err(e) => {
            log::warn!("could not encode background for the terminal: {}", e);
            app.background_render = None;
        }
    }
}

fn viewport_for(picker: &Picker, image: &DynamicImage, area: Rect, offset: Offset) -> DynamicImage {
    let (font_w, font_h) = picker.font_size();
    let font_w = u32::from(font_w.max(1));
    let font_h = u32::from(font_h.max(1));
    build_viewport_image(
        image,
        u32::from(area.width) * font_w,
        u32::from(area.height) * font_h,
        i64::from(offset.x) * i64::from(font_w),
        i64::from(offset.y) * i64::from(font_h),
    )
}

pub fn render_background(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    refresh_protocol(app, area);
    if let Some(render) = app.background_render.as_ref() {
        f.render_widget(ImageWidget::new(&render.protocol), area);
    }
}

/// Hint shown while the image is being positioned.
pub fn render_positioning_hint(f: &mut Frame, app: &App, area: Rect) {
    if !app.panel.background().is_positioning() || area.height < 3 {
        return;
    }
    let theme = &app.theme;
    let offset = app.panel.background().display_offset();
    let text = format!(" Drag or use arrows · Enter place · Esc cancel · ({}, {}) ", offset.x, offset.y);
    let width = (text.chars().count() as u16 + 2).min(area.width);
    let hint_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height - 3,
        width,
        3,
    );
    f.render_widget(Clear, hint_area);
    let hint = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning))
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(hint, hint_area);
}

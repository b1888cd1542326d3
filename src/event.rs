use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::editor::process_key;

const TICK: Duration = Duration::from_millis(100);

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_persistence();
        app.expire_status();
        terminal.draw(|f| crate::ui::render(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Paste(text) => app.paste(&text),
                Event::Resize(_, _) => app.background_render = None,
                _ => {}
            }
            app.flush_writes();
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.dialog.is_open() {
        handle_dialog_key(app, key);
    } else if app.editing.is_some() {
        app.handle_edit_key(key);
    } else if app.panel.background().is_positioning() {
        handle_positioning_key(app, key);
    } else if app.panel.color_picker_open() {
        handle_color_key(app, key);
    } else if app.panel.mode().is_delete_select() {
        handle_delete_key(app, key);
    } else {
        handle_normal_key(app, key);
    }
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_dialog(),
        _ => {
            if let crate::app::Dialog::ImagePath(input) = &mut app.dialog {
                input.apply(process_key(key, false));
            }
        }
    }
}

fn handle_positioning_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.nudge_background(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.nudge_background(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.nudge_background(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.nudge_background(0, 1),
        KeyCode::Enter => app.confirm_position(),
        KeyCode::Esc => app.cancel_position(),
        _ => {}
    }
}

fn handle_color_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_swatch(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_swatch(1),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose_swatch_at_cursor(),
        KeyCode::Esc | KeyCode::Char('c') => app.toggle_color_picker(),
        _ => {}
    }
}

fn handle_delete_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_mark_at_cursor(),
        KeyCode::Char('y') => app.confirm_delete(),
        KeyCode::Char('a') => app.add_note(),
        KeyCode::Char('b') => app.open_image_dialog(),
        KeyCode::Esc | KeyCode::Char('n') => app.cancel_delete(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('a') => app.add_note(),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('x') => app.delete_selected(),
        KeyCode::Char('d') => app.enter_delete_mode(),
        KeyCode::Char('p') => app.toggle_pin_selected(),
        KeyCode::Char('c') => app.toggle_color_picker(),
        KeyCode::Char('b') => app.open_image_dialog(),
        KeyCode::Char('B') => app.clear_background(),
        KeyCode::Char('w') => app.toggle_window_pin(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(),
        MouseEventKind::ScrollDown if !app.panel.background().is_positioning() => app.move_cursor(1),
        MouseEventKind::ScrollUp if !app.panel.background().is_positioning() => app.move_cursor(-1),
        _ => {}
    }
}

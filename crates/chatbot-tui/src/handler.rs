use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(outcome) => app.on_reply(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Enter => {
            app.commit();
            return;
        }

        // Transcript scrolling
        KeyCode::Up => {
            app.scroll_up(1);
            return;
        }
        KeyCode::Down => {
            app.scroll_down(1);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        KeyCode::Char('u') if ctrl => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::Char('d') if ctrl => {
            app.scroll_half_page_down();
            return;
        }
        _ => {}
    }

    if !app.input_enabled() {
        return;
    }

    match key.code {
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_transcript = app.transcript_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let on_submit = app.submit_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_transcript => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_transcript => app.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) if on_submit => app.commit(),
        _ => {}
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Control chords first, so they never fall through to text input
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('r') => app.reset(),
            KeyCode::Char('u') => {
                app.input.clear();
                app.input_cursor = 0;
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit(),

        // Stop the in-flight request without losing the thread
        KeyCode::Esc => app.cancel_pending(),

        // Transcript scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::PageDown => app.scroll_half_page_down(),

        // Input editing, cursor tracked in chars
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

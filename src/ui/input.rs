//! Terminal input translation.
//!
//! Maps crossterm events onto the closed set of dashboard events; anything
//! else is dropped before it reaches the queue.

use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use ccquota_core::dashboard::Event;

/// Translate one terminal event
pub fn translate(event: TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key) => translate_key(key),
        TermEvent::Mouse(mouse) => translate_mouse(mouse),
        TermEvent::Resize(width, height) => Some(Event::Resize { width, height }),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Event> {
    // Release/repeat events would double-trigger on some terminals
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Event::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Event::Quit),
        KeyCode::Char('r') => Some(Event::ManualRefresh),
        _ => None,
    }
}

fn translate_mouse(mouse: MouseEvent) -> Option<Event> {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Down(_) | MouseEventKind::Drag(_) => {
            Some(Event::Pointer { row: mouse.row })
        }
        _ => None,
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Down,
    Up,
    PageDown,
    PageUp,
    Top,
    Bottom,
    FocusNext,
    FocusPrev,
    Reselect,
    RefreshRoot,
    ToggleHelp,
    CloseHelp,
    Click { column: u16, row: u16 },
    ScrollDown { column: u16, row: u16 },
    ScrollUp { column: u16, row: u16 },
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('j') if key.modifiers.is_empty() => Some(Action::Down),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') if key.modifiers.is_empty() => Some(Action::Up),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::PageDown)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageUp),
        KeyCode::BackTab => Some(Action::FocusPrev),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(Action::FocusPrev),
        KeyCode::Tab => Some(Action::FocusNext),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::FocusNext),
        KeyCode::Char('h') | KeyCode::Left => Some(Action::FocusPrev),
        KeyCode::Enter => Some(Action::Reselect),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::RefreshRoot),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Esc => Some(Action::CloseHelp),
        _ => None,
    }
}

pub fn map_mouse(event: MouseEvent) -> Option<Action> {
    let (column, row) = (event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::Click { column, row }),
        MouseEventKind::ScrollDown => Some(Action::ScrollDown { column, row }),
        MouseEventKind::ScrollUp => Some(Action::ScrollUp { column, row }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key, map_mouse};
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };

    #[test]
    fn maps_quit_keys() {
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(q), Some(Action::Quit));
        assert_eq!(map_key(ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn maps_vim_and_arrow_movement() {
        let j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        let big_g = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(map_key(j), Some(Action::Down));
        assert_eq!(map_key(up), Some(Action::Up));
        assert_eq!(map_key(big_g), Some(Action::Bottom));
    }

    #[test]
    fn maps_focus_movement() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        let left = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(map_key(tab), Some(Action::FocusNext));
        assert_eq!(map_key(back_tab), Some(Action::FocusPrev));
        assert_eq!(map_key(left), Some(Action::FocusPrev));
    }

    #[test]
    fn maps_enter_to_reselect_and_r_to_refresh() {
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        let f5 = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(map_key(enter), Some(Action::Reselect));
        assert_eq!(map_key(r), Some(Action::RefreshRoot));
        assert_eq!(map_key(f5), Some(Action::RefreshRoot));
    }

    #[test]
    fn ignores_unbound_keys() {
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(map_key(x), None);
    }

    #[test]
    fn maps_left_click_and_wheel() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 1,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        let right_click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(map_mouse(click), Some(Action::Click { column: 4, row: 7 }));
        assert_eq!(
            map_mouse(wheel),
            Some(Action::ScrollDown { column: 1, row: 2 })
        );
        assert_eq!(map_mouse(right_click), None);
    }
}

//! Input handling and keybindings.
//!
//! | Key | Action |
//! |-----|--------|
//! | `space` | pause / resume |
//! | `1`-`9` | sort by field, again to flip direction |
//! | `]` / `[` | next / previous mode |
//! | `q`, `Ctrl-C` | quit |

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::{Action, ViewState};

/// Result of applying an action.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
}

/// Maps a key event to an action. Unbound keys map to `None`.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char(']') => Some(Action::NextMode),
        KeyCode::Char('[') => Some(Action::PrevMode),
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| Action::SortBy(d as usize)),
        _ => None,
    }
}

/// Applies an action to the view state.
pub fn handle_action(state: &mut ViewState, action: Action) -> KeyAction {
    match action {
        Action::Quit => return KeyAction::Quit,
        Action::TogglePause => state.toggle_pause(),
        Action::SortBy(field) => state.select_sort_field(field),
        Action::NextMode => state.next_mode(),
        Action::PrevMode => state.prev_mode(),
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Field, Mode};
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn two_modes() -> Vec<Mode> {
        let fields = || vec![Field::new("a"), Field::new("b"), Field::new("c")];
        vec![
            Mode::new("one", "true", "(.)(.)(.)", fields()).unwrap(),
            Mode::new("two", "true", "(.)(.)(.)", fields()).unwrap(),
        ]
    }

    #[test]
    fn maps_bound_keys() {
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(Action::TogglePause));
        assert_eq!(map_key(key(KeyCode::Char(']'))), Some(Action::NextMode));
        assert_eq!(map_key(key(KeyCode::Char('['))), Some(Action::PrevMode));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_key(key(KeyCode::Char('1'))), Some(Action::SortBy(1)));
        assert_eq!(map_key(key(KeyCode::Char('9'))), Some(Action::SortBy(9)));
    }

    #[test]
    fn ctrl_c_quits() {
        let mut ev = key(KeyCode::Char('c'));
        ev.modifiers = KeyModifiers::CONTROL;
        assert_eq!(map_key(ev), Some(Action::Quit));
        assert_eq!(map_key(key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(map_key(key(KeyCode::Char('0'))), None);
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
        assert_eq!(map_key(key(KeyCode::Char('Q'))), None);
        assert_eq!(map_key(key(KeyCode::Enter)), None);
        assert_eq!(map_key(key(KeyCode::Tab)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut ev = key(KeyCode::Char('q'));
        ev.kind = KeyEventKind::Release;
        assert_eq!(map_key(ev), None);
    }

    #[test]
    fn pressing_active_digit_twice_flips_direction() {
        let mut state = ViewState::new(&two_modes());
        for c in ['3', '3'] {
            let action = map_key(key(KeyCode::Char(c))).unwrap();
            assert_eq!(handle_action(&mut state, action), KeyAction::None);
        }
        assert_eq!(state.sort_field, 3);
        assert!(!state.sort_descending);
    }

    #[test]
    fn switching_away_and_back_resets_direction() {
        let mut state = ViewState::new(&two_modes());
        handle_action(&mut state, Action::SortBy(2));
        handle_action(&mut state, Action::SortBy(2));
        assert!(!state.sort_descending);

        handle_action(&mut state, Action::NextMode);
        handle_action(&mut state, Action::PrevMode);
        assert_eq!(state.current_mode, 0);
        assert_eq!(state.sort_field, 2);
        assert!(state.sort_descending);
    }

    #[test]
    fn quit_leaves_state_untouched() {
        let mut state = ViewState::new(&two_modes());
        assert_eq!(handle_action(&mut state, Action::Quit), KeyAction::Quit);
        assert_eq!(state.current_mode, 0);
        assert!(!state.paused);
    }
}

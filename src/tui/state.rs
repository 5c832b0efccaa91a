//! View state: which mode is shown and how it is sorted.

use crate::config::Mode;

/// Discrete state changes produced by the input thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pause or resume refreshing.
    TogglePause,
    /// Sort by the given 1-based field, or flip direction if already active.
    SortBy(usize),
    NextMode,
    PrevMode,
    Quit,
}

/// Runtime selection of mode, sort, and pause.
///
/// Owned by the refresh loop; the input thread only sends [`Action`]s.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Index into the config's modes.
    pub current_mode: usize,
    /// Active 1-based sort field of the current mode.
    pub sort_field: usize,
    pub sort_descending: bool,
    pub paused: bool,
    /// Last sort field chosen per mode, seeded from the config.
    mode_sort_fields: Vec<usize>,
    /// Number of fields per mode, bounds the sort field.
    field_counts: Vec<usize>,
}

impl ViewState {
    pub fn new(modes: &[Mode]) -> Self {
        let mode_sort_fields: Vec<usize> = modes.iter().map(|m| m.default_sort_field).collect();
        Self {
            current_mode: 0,
            sort_field: mode_sort_fields.first().copied().unwrap_or(1),
            sort_descending: true,
            paused: false,
            mode_sort_fields,
            field_counts: modes.iter().map(|m| m.fields.len()).collect(),
        }
    }

    pub fn mode_count(&self) -> usize {
        self.field_counts.len()
    }

    /// Remembered sort field for mode `index`.
    pub fn mode_sort_field(&self, index: usize) -> Option<usize> {
        self.mode_sort_fields.get(index).copied()
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Selects `field` as the sort field of the current mode.
    ///
    /// Selecting the active field flips the direction; selecting another one
    /// keeps the direction. Fields the current mode doesn't have are ignored.
    pub fn select_sort_field(&mut self, field: usize) {
        let count = self.field_counts.get(self.current_mode).copied().unwrap_or(0);
        if field == 0 || field > count {
            return;
        }
        if field == self.sort_field {
            self.sort_descending = !self.sort_descending;
        } else {
            self.sort_field = field;
            self.mode_sort_fields[self.current_mode] = field;
        }
    }

    pub fn next_mode(&mut self) {
        let count = self.mode_count();
        if count > 0 {
            self.switch_mode((self.current_mode + 1) % count);
        }
    }

    pub fn prev_mode(&mut self) {
        let count = self.mode_count();
        if count > 0 {
            self.switch_mode((self.current_mode + count - 1) % count);
        }
    }

    /// Switching always resets to descending and restores the mode's sort field.
    fn switch_mode(&mut self, index: usize) {
        self.current_mode = index;
        self.sort_descending = true;
        self.sort_field = self.mode_sort_fields[index];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Field;

    fn modes() -> Vec<Mode> {
        let fields = |n: usize| -> Vec<Field> {
            (1..=n).map(|i| Field::new(format!("f{}", i))).collect()
        };
        let mut a = Mode::new("a", "true", "(.)(.)(.)(.)", fields(4)).unwrap();
        a.default_sort_field = 2;
        let b = Mode::new("b", "true", "(.)(.)", fields(2)).unwrap();
        let c = Mode::new("c", "true", "(.)", fields(1)).unwrap();
        vec![a, b, c]
    }

    #[test]
    fn starts_on_first_mode_descending() {
        let state = ViewState::new(&modes());
        assert_eq!(state.current_mode, 0);
        assert_eq!(state.sort_field, 2);
        assert!(state.sort_descending);
        assert!(!state.paused);
    }

    #[test]
    fn repeated_digit_flips_direction() {
        let mut state = ViewState::new(&modes());
        state.select_sort_field(3);
        assert_eq!(state.sort_field, 3);
        assert!(state.sort_descending);

        state.select_sort_field(3);
        assert_eq!(state.sort_field, 3);
        assert!(!state.sort_descending);

        state.select_sort_field(3);
        assert!(state.sort_descending);
    }

    #[test]
    fn new_sort_field_keeps_direction() {
        let mut state = ViewState::new(&modes());
        state.select_sort_field(2);
        assert!(!state.sort_descending);
        state.select_sort_field(4);
        assert_eq!(state.sort_field, 4);
        assert!(!state.sort_descending);
    }

    #[test]
    fn out_of_range_digits_are_ignored() {
        let mut state = ViewState::new(&modes());
        state.select_sort_field(5);
        state.select_sort_field(0);
        assert_eq!(state.sort_field, 2);
        assert!(state.sort_descending);
    }

    #[test]
    fn mode_switch_resets_direction_and_remembers_field() {
        let mut state = ViewState::new(&modes());
        state.select_sort_field(3);
        state.select_sort_field(3);
        assert!(!state.sort_descending);

        state.next_mode();
        assert_eq!(state.current_mode, 1);
        assert_eq!(state.sort_field, 1);
        assert!(state.sort_descending);

        state.prev_mode();
        assert_eq!(state.current_mode, 0);
        assert_eq!(state.sort_field, 3);
        assert!(state.sort_descending);
        assert_eq!(state.mode_sort_field(0), Some(3));
    }

    #[test]
    fn mode_switch_wraps_around() {
        let mut state = ViewState::new(&modes());
        state.prev_mode();
        assert_eq!(state.current_mode, 2);
        state.next_mode();
        assert_eq!(state.current_mode, 0);
        state.next_mode();
        state.next_mode();
        state.next_mode();
        assert_eq!(state.current_mode, 0);
    }

    #[test]
    fn pause_toggles() {
        let mut state = ViewState::new(&modes());
        state.toggle_pause();
        assert!(state.paused);
        state.next_mode();
        state.select_sort_field(2);
        assert!(state.paused);
        state.toggle_pause();
        assert!(!state.paused);
    }

    #[test]
    fn no_modes_is_inert() {
        let mut state = ViewState::new(&[]);
        state.next_mode();
        state.prev_mode();
        state.select_sort_field(1);
        assert_eq!(state.current_mode, 0);
        assert_eq!(state.sort_field, 1);
        assert_eq!(state.mode_count(), 0);
    }
}

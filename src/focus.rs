/// Tracks which panel of the chain owns keyboard input.
///
/// Focus starts on the leftmost panel. Advancing focus to a panel that was just
/// filled is a policy switch, off unless configured.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FocusRouter {
    focused: usize,
    panels: usize,
    follow_selection: bool,
}

impl FocusRouter {
    pub fn new(panels: usize, follow_selection: bool) -> Self {
        Self {
            focused: 0,
            panels: panels.max(1),
            follow_selection,
        }
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn follow_selection(&self) -> bool {
        self.follow_selection
    }

    pub fn focus(&mut self, index: usize) {
        if index < self.panels {
            self.focused = index;
        }
    }

    pub fn focus_next(&mut self) {
        self.focus(self.focused + 1);
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.saturating_sub(1);
    }

    /// Called after `panel` was populated. Moves focus onto it when the policy
    /// is on, the user is looking at its parent, and there is something to pick.
    pub fn on_populated(&mut self, panel: usize, entries: usize) -> bool {
        if !self.follow_selection || entries == 0 || panel != self.focused + 1 {
            return false;
        }

        self.focus(panel);
        self.focused == panel
    }
}

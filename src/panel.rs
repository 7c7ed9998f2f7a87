use ratatui::widgets::ListState;

use crate::model::ResourceRef;
use crate::navigation::SelectionHandler;

/// A selectable list surface in the navigation chain.
///
/// A panel only changes its own visual state. When the user moves onto a new
/// entry it reports the entry through the handler registered with `on_select`
/// and never talks to other panels or to a gateway.
pub trait Panel {
    fn set_entries(&mut self, entries: &[ResourceRef]);
    fn clear(&mut self);
    fn show_placeholder(&mut self, message: &str);
    fn on_select(&mut self, handler: SelectionHandler);
    /// Moves the highlight to the entry the controller accepted, without
    /// reporting a selection.
    fn highlight(&mut self, index: Option<usize>);
}

#[derive(Debug)]
pub struct ListPanel {
    title: String,
    entries: Vec<ResourceRef>,
    placeholder: Option<String>,
    state: ListState,
    handler: Option<SelectionHandler>,
    page_size: usize,
}

impl ListPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            placeholder: None,
            state: ListState::default(),
            handler: None,
            page_size: 10,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &[ResourceRef] {
        &self.entries
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn offset(&self) -> usize {
        self.state.offset()
    }

    pub fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.state
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn move_down(&mut self) {
        self.move_by(1);
    }

    pub fn move_up(&mut self) {
        self.move_by(-1);
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page_size as isize);
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.page_size as isize));
    }

    pub fn select_first(&mut self) {
        self.select_index(0);
    }

    pub fn select_last(&mut self) {
        self.select_index(self.entries.len().saturating_sub(1));
    }

    /// Moves the cursor to `index`, reporting a selection only if the cursor moved.
    pub fn select_index(&mut self, index: usize) {
        if self.entries.is_empty() {
            return;
        }

        let index = index.min(self.entries.len() - 1);
        if self.state.selected() == Some(index) {
            return;
        }

        self.state.select(Some(index));
        self.notify(index);
    }

    /// Reports the entry under the cursor again, forcing a fresh fetch downstream.
    pub fn reselect(&mut self) {
        if let Some(index) = self.state.selected() {
            self.notify(index);
        } else {
            self.select_first();
        }
    }

    fn move_by(&mut self, delta: isize) {
        let Some(current) = self.state.selected() else {
            self.select_first();
            return;
        };

        let target = current.saturating_add_signed(delta);
        self.select_index(target);
    }

    fn notify(&self, index: usize) {
        if let (Some(handler), Some(entry)) = (&self.handler, self.entries.get(index)) {
            handler.notify(entry.clone());
        }
    }
}

impl Panel for ListPanel {
    fn set_entries(&mut self, entries: &[ResourceRef]) {
        self.entries = entries.to_vec();
        self.placeholder = None;
        self.state = ListState::default();
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.placeholder = None;
        self.state = ListState::default();
    }

    fn show_placeholder(&mut self, message: &str) {
        self.placeholder = Some(message.to_string());
    }

    fn on_select(&mut self, handler: SelectionHandler) {
        self.handler = Some(handler);
    }

    fn highlight(&mut self, index: Option<usize>) {
        self.state
            .select(index.filter(|index| *index < self.entries.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::{ListPanel, Panel};
    use crate::model::ResourceRef;
    use crate::navigation::{Selection, SelectionHandler};
    use tokio::sync::mpsc;

    fn panel_with(names: &[&str]) -> (ListPanel, mpsc::UnboundedReceiver<Selection>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut panel = ListPanel::new("Namespaces");
        panel.on_select(SelectionHandler::new(0, tx));
        let entries = names
            .iter()
            .map(|name| ResourceRef::root(*name))
            .collect::<Vec<_>>();
        panel.set_entries(&entries);
        (panel, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Selection>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(selection) = rx.try_recv() {
            names.push(selection.entry.name().to_string());
        }
        names
    }

    #[test]
    fn first_move_selects_top_entry() {
        let (mut panel, mut rx) = panel_with(&["default", "kube-system"]);
        panel.move_down();
        assert_eq!(panel.cursor(), Some(0));
        assert_eq!(drain(&mut rx), vec!["default"]);
    }

    #[test]
    fn moving_past_the_end_does_not_notify_again() {
        let (mut panel, mut rx) = panel_with(&["default", "kube-system"]);
        panel.move_down();
        panel.move_down();
        panel.move_down();
        assert_eq!(panel.cursor(), Some(1));
        assert_eq!(drain(&mut rx), vec!["default", "kube-system"]);
    }

    #[test]
    fn reselect_notifies_current_entry_again() {
        let (mut panel, mut rx) = panel_with(&["default", "kube-system"]);
        panel.select_last();
        panel.reselect();
        panel.reselect();
        assert_eq!(
            drain(&mut rx),
            vec!["kube-system", "kube-system", "kube-system"]
        );
    }

    #[test]
    fn empty_panel_never_notifies() {
        let (mut panel, mut rx) = panel_with(&[]);
        panel.move_down();
        panel.reselect();
        panel.select_last();
        assert!(drain(&mut rx).is_empty());
        assert_eq!(panel.cursor(), None);
    }

    #[test]
    fn set_entries_replaces_and_resets_cursor() {
        let (mut panel, _rx) = panel_with(&["a", "b"]);
        panel.select_last();
        panel.show_placeholder("loading");
        panel.set_entries(&[ResourceRef::root("c")]);
        assert_eq!(panel.entries().len(), 1);
        assert_eq!(panel.cursor(), None);
        assert_eq!(panel.placeholder(), None);
    }

    #[test]
    fn highlight_moves_cursor_silently() {
        let (mut panel, mut rx) = panel_with(&["default", "kube-system"]);
        panel.highlight(Some(1));
        assert_eq!(panel.cursor(), Some(1));
        panel.highlight(Some(7));
        assert_eq!(panel.cursor(), None);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn page_moves_clamp_to_bounds() {
        let names = (0..30).map(|i| format!("ns-{i}")).collect::<Vec<_>>();
        let refs = names.iter().map(String::as_str).collect::<Vec<_>>();
        let (mut panel, _rx) = panel_with(&refs);
        panel.set_page_size(12);
        panel.select_first();
        panel.page_down();
        assert_eq!(panel.cursor(), Some(12));
        panel.page_down();
        panel.page_down();
        assert_eq!(panel.cursor(), Some(29));
        panel.page_up();
        panel.page_up();
        panel.page_up();
        assert_eq!(panel.cursor(), Some(0));
    }
}

use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;
use tracing::debug;

use crate::focus::FocusRouter;
use crate::input::Action;
use crate::model::{PanelState, PanelStatus, ParentKey};
use crate::navigation::{FetchOutcome, FetchRequest, NavigationController, Selection};
use crate::panel::ListPanel;

#[derive(Debug)]
pub enum AppCommand {
    None,
    Fetch(FetchRequest),
}

pub struct App {
    running: bool,
    show_help: bool,
    status: String,
    context: String,
    cluster: String,
    navigation: NavigationController<ListPanel>,
    focus: FocusRouter,
    panel_areas: Vec<Rect>,
}

impl App {
    pub fn new(
        context: String,
        cluster: String,
        navigation: NavigationController<ListPanel>,
        follow_selection: bool,
    ) -> Self {
        let focus = FocusRouter::new(navigation.len(), follow_selection);
        Self {
            running: true,
            show_help: false,
            status: "Starting…".to_string(),
            context,
            cluster,
            navigation,
            focus,
            panel_areas: Vec::new(),
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn focused(&self) -> usize {
        self.focus.focused()
    }

    pub fn follow_selection(&self) -> bool {
        self.focus.follow_selection()
    }

    pub fn panel_count(&self) -> usize {
        self.navigation.len()
    }

    pub fn panel_state(&self, index: usize) -> Option<&PanelState> {
        self.navigation.state(index)
    }

    pub fn panel_view_mut(&mut self, index: usize) -> Option<(&mut ListPanel, &PanelState)> {
        self.navigation.view_mut(index)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into().replace(['\n', '\r'], " ");
    }

    pub fn set_panel_areas(&mut self, areas: Vec<Rect>) {
        for (index, area) in areas.iter().enumerate() {
            if let Some(panel) = self.navigation.panel_mut(index) {
                panel.set_page_size(area.height.saturating_sub(2) as usize);
            }
        }
        self.panel_areas = areas;
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::CloseHelp => self.show_help = false,
            Action::RefreshRoot => return AppCommand::Fetch(self.refresh_root()),
            Action::FocusNext => self.focus.focus_next(),
            Action::FocusPrev => self.focus.focus_prev(),
            Action::Down => self.with_focused(ListPanel::move_down),
            Action::Up => self.with_focused(ListPanel::move_up),
            Action::PageDown => self.with_focused(ListPanel::page_down),
            Action::PageUp => self.with_focused(ListPanel::page_up),
            Action::Top => self.with_focused(ListPanel::select_first),
            Action::Bottom => self.with_focused(ListPanel::select_last),
            Action::Reselect => self.with_focused(ListPanel::reselect),
            Action::Click { column, row } => self.click(column, row),
            Action::ScrollDown { column, row } => {
                if let Some(index) = self.panel_at(column, row)
                    && let Some(panel) = self.navigation.panel_mut(index)
                {
                    panel.move_down();
                }
            }
            Action::ScrollUp { column, row } => {
                if let Some(index) = self.panel_at(column, row)
                    && let Some(panel) = self.navigation.panel_mut(index)
                {
                    panel.move_up();
                }
            }
        }

        AppCommand::None
    }

    pub fn refresh_root(&mut self) -> FetchRequest {
        self.focus.focus(0);
        let request = self.navigation.refresh_root();
        self.set_status(format!("Loading {}…", self.panel_title(0)));
        request
    }

    pub fn handle_selection(&mut self, selection: Selection) -> Option<FetchRequest> {
        let name = selection.entry.name().to_string();
        let request = self.navigation.handle_selection(selection)?;
        let title = self.panel_title(request.panel());
        self.set_status(format!("Loading {title} for {name}…"));
        Some(request)
    }

    /// Handles every selection already queued, so downstream panels are cleared
    /// before the moved cursor is drawn.
    pub fn drain_selections(
        &mut self,
        selections: &mut mpsc::UnboundedReceiver<Selection>,
    ) -> Vec<FetchRequest> {
        let mut requests = Vec::new();
        while let Ok(selection) = selections.try_recv() {
            requests.extend(self.handle_selection(selection));
        }
        requests
    }

    /// Applies a finished fetch, returning whether it was still current.
    pub fn complete_fetch(&mut self, outcome: FetchOutcome) -> bool {
        let panel = outcome.panel;
        let parent = outcome.parent.clone();
        if !self.navigation.complete(outcome) {
            return false;
        }

        let title = self.panel_title(panel);
        let scope = match &parent {
            ParentKey::Root => String::new(),
            ParentKey::Resource(identifier) => format!(" in {identifier}"),
        };
        match self.navigation.status(panel).cloned() {
            Some(PanelStatus::Populated(count)) => {
                self.set_status(format!("Loaded {count} {title}{scope}"));
                if self.focus.on_populated(panel, count) {
                    debug!("focus follows selection to panel {panel}");
                }
            }
            Some(PanelStatus::Failed(reason)) => {
                self.set_status(format!("Failed to load {title}{scope}: {reason}"));
            }
            _ => {}
        }

        true
    }

    fn panel_title(&self, index: usize) -> String {
        self.navigation
            .panel(index)
            .map(|panel| panel.title().to_string())
            .unwrap_or_else(|| format!("panel {index}"))
    }

    fn with_focused(&mut self, apply: impl FnOnce(&mut ListPanel)) {
        let focused = self.focus.focused();
        if let Some(panel) = self.navigation.panel_mut(focused) {
            apply(panel);
        }
    }

    fn panel_at(&self, column: u16, row: u16) -> Option<usize> {
        self.panel_areas
            .iter()
            .position(|area| area.contains(Position::new(column, row)))
    }

    fn click(&mut self, column: u16, row: u16) {
        let Some(index) = self.panel_at(column, row) else {
            return;
        };
        self.focus.focus(index);

        let area = self.panel_areas[index];
        let inner_top = area.y.saturating_add(1);
        let inner_bottom = area.y.saturating_add(area.height).saturating_sub(1);
        if row < inner_top || row >= inner_bottom {
            return;
        }

        if let Some(panel) = self.navigation.panel_mut(index) {
            let target = panel.offset() + usize::from(row - inner_top);
            if target < panel.entries().len() {
                panel.select_index(target);
            }
        }
    }
}

use chrono::{DateTime, Local};
use std::fmt::{Display, Formatter};

/// Key handed to a gateway when listing a panel's entries.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ParentKey {
    Root,
    Resource(String),
}

impl ParentKey {
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl Display for ParentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "<root>"),
            Self::Resource(identifier) => write!(f, "{identifier}"),
        }
    }
}

/// One listable entity, as returned by a single list call.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ResourceRef {
    name: String,
    parent: ParentKey,
}

impl ResourceRef {
    pub fn new(name: impl Into<String>, parent: ParentKey) -> Self {
        Self {
            name: name.into(),
            parent,
        }
    }

    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, ParentKey::Root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier unique across the whole chain, e.g. `default` or `default/web-0`.
    pub fn identifier(&self) -> String {
        match &self.parent {
            ParentKey::Root => self.name.clone(),
            ParentKey::Resource(parent) => format!("{parent}/{}", self.name),
        }
    }

    /// Parent key the next panel is listed with when this entry is selected.
    pub fn as_parent(&self) -> ParentKey {
        ParentKey::Resource(self.identifier())
    }
}

impl Display for ResourceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum PanelStatus {
    #[default]
    Empty,
    Loading,
    Populated(usize),
    Failed(String),
}

/// Controller-side state of one chain position.
///
/// Every transition into `Loading` or `Empty` bumps `ticket`, so a fetch
/// outcome is only accepted while the panel is still waiting on the exact
/// request that produced it.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    entries: Vec<ResourceRef>,
    selected: Option<usize>,
    status: PanelStatus,
    ticket: u64,
    loading_parent: Option<ParentKey>,
    fetched_at: Option<DateTime<Local>>,
}

impl PanelState {
    pub fn entries(&self) -> &[ResourceRef] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&ResourceRef> {
        self.selected.and_then(|index| self.entries.get(index))
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn loading_parent(&self) -> Option<&ParentKey> {
        self.loading_parent.as_ref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    pub fn position_of(&self, entry: &ResourceRef) -> Option<usize> {
        self.entries.iter().position(|candidate| candidate == entry)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = Some(index);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
        self.status = PanelStatus::Empty;
        self.loading_parent = None;
        self.ticket += 1;
    }

    pub fn begin_loading(&mut self, parent: ParentKey) -> u64 {
        self.entries.clear();
        self.selected = None;
        self.status = PanelStatus::Loading;
        self.loading_parent = Some(parent);
        self.ticket += 1;
        self.ticket
    }

    pub fn awaits(&self, ticket: u64) -> bool {
        self.status == PanelStatus::Loading && self.ticket == ticket
    }

    pub fn populate(&mut self, entries: Vec<ResourceRef>, fetched_at: DateTime<Local>) {
        self.status = PanelStatus::Populated(entries.len());
        self.entries = entries;
        self.selected = None;
        self.loading_parent = None;
        self.fetched_at = Some(fetched_at);
    }

    pub fn fail(&mut self, reason: impl Into<String>, fetched_at: DateTime<Local>) {
        self.entries.clear();
        self.selected = None;
        self.status = PanelStatus::Failed(reason.into());
        self.loading_parent = None;
        self.fetched_at = Some(fetched_at);
    }
}

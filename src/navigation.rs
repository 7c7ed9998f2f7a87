use anyhow::Result;
use chrono::Local;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::gateway::ResourceGateway;
use crate::model::{PanelState, PanelStatus, ParentKey, ResourceRef};
use crate::panel::Panel;

pub const LOADING_PLACEHOLDER: &str = "Loading…";
pub const NO_ITEMS_PLACEHOLDER: &str = "No items to show";

/// A user selection reported by the panel at position `panel`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Selection {
    pub panel: usize,
    pub entry: ResourceRef,
}

/// Shared selection hook handed to every panel, tagged with its position.
#[derive(Debug, Clone)]
pub struct SelectionHandler {
    panel: usize,
    tx: mpsc::UnboundedSender<Selection>,
}

impl SelectionHandler {
    pub fn new(panel: usize, tx: mpsc::UnboundedSender<Selection>) -> Self {
        Self { panel, tx }
    }

    pub fn notify(&self, entry: ResourceRef) {
        let _ = self.tx.send(Selection {
            panel: self.panel,
            entry,
        });
    }
}

/// One position of the chain: the panel and the gateway that fills it.
pub struct Level<P> {
    panel: P,
    gateway: Arc<dyn ResourceGateway>,
}

impl<P: Panel> Level<P> {
    pub fn new(panel: P, gateway: Arc<dyn ResourceGateway>) -> Self {
        Self { panel, gateway }
    }
}

struct Slot<P> {
    panel: P,
    state: PanelState,
    gateway: Arc<dyn ResourceGateway>,
}

pub struct FetchRequest {
    panel: usize,
    ticket: u64,
    parent: ParentKey,
    gateway: Arc<dyn ResourceGateway>,
}

impl FetchRequest {
    pub fn panel(&self) -> usize {
        self.panel
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn parent(&self) -> &ParentKey {
        &self.parent
    }

    pub async fn execute(self, limit: Duration) -> FetchOutcome {
        let result = match tokio::time::timeout(limit, self.gateway.list(&self.parent)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::TimedOut(limit)),
        };

        FetchOutcome {
            panel: self.panel,
            ticket: self.ticket,
            parent: self.parent,
            result,
        }
    }
}

impl Debug for FetchRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("panel", &self.panel)
            .field("ticket", &self.ticket)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub panel: usize,
    pub ticket: u64,
    pub parent: ParentKey,
    pub result: Result<Vec<ResourceRef>, FetchError>,
}

/// Owns the chain of panels and keeps them consistent with each other.
///
/// Panel `i + 1` only ever shows children of the entry selected in panel `i`,
/// or nothing at all.
pub struct NavigationController<P> {
    slots: Vec<Slot<P>>,
}

impl<P: Panel> NavigationController<P> {
    pub fn new(levels: Vec<Level<P>>, selections: mpsc::UnboundedSender<Selection>) -> Result<Self> {
        anyhow::ensure!(!levels.is_empty(), "navigation chain needs at least one panel");

        let slots = levels
            .into_iter()
            .enumerate()
            .map(|(index, level)| {
                let mut panel = level.panel;
                panel.on_select(SelectionHandler::new(index, selections.clone()));
                Slot {
                    panel,
                    state: PanelState::default(),
                    gateway: level.gateway,
                }
            })
            .collect();

        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn panel(&self, index: usize) -> Option<&P> {
        self.slots.get(index).map(|slot| &slot.panel)
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut P> {
        self.slots.get_mut(index).map(|slot| &mut slot.panel)
    }

    pub fn state(&self, index: usize) -> Option<&PanelState> {
        self.slots.get(index).map(|slot| &slot.state)
    }

    pub fn status(&self, index: usize) -> Option<&PanelStatus> {
        self.state(index).map(PanelState::status)
    }

    pub fn view_mut(&mut self, index: usize) -> Option<(&mut P, &PanelState)> {
        self.slots
            .get_mut(index)
            .map(|slot| (&mut slot.panel, &slot.state))
    }

    /// Re-lists the root panel and empties everything downstream of it.
    pub fn refresh_root(&mut self) -> FetchRequest {
        self.clear_from(1);
        info!("refreshing root panel");
        self.begin_fetch(0, ParentKey::Root)
    }

    /// Reacts to a selection in panel `i`: panels past `i + 1` are emptied and
    /// panel `i + 1` starts loading the children of the selected entry.
    pub fn handle_selection(&mut self, selection: Selection) -> Option<FetchRequest> {
        let Some(source) = self.slots.get_mut(selection.panel) else {
            warn!("selection from unknown panel {}", selection.panel);
            return None;
        };

        let Some(position) = source.state.position_of(&selection.entry) else {
            debug!(
                "ignoring selection of {} no longer listed in panel {}",
                selection.entry.identifier(),
                selection.panel
            );
            source.panel.highlight(source.state.selected());
            return None;
        };
        source.state.select(position);
        source.panel.highlight(Some(position));

        let target = selection.panel + 1;
        if target >= self.slots.len() {
            return None;
        }

        self.clear_from(target);
        Some(self.begin_fetch(target, selection.entry.as_parent()))
    }

    /// Applies a finished fetch. Returns `false` when the outcome was superseded
    /// by a later selection or clear and has been dropped.
    pub fn complete(&mut self, outcome: FetchOutcome) -> bool {
        let Some(slot) = self.slots.get_mut(outcome.panel) else {
            return false;
        };

        if !slot.state.awaits(outcome.ticket) {
            debug!(
                "discarding stale result for panel {} ticket {} (current {})",
                outcome.panel,
                outcome.ticket,
                slot.state.ticket()
            );
            return false;
        }

        let now = Local::now();
        match outcome.result {
            Ok(entries) => {
                info!(
                    "panel {} populated with {} entries for {}",
                    outcome.panel,
                    entries.len(),
                    outcome.parent
                );
                if entries.is_empty() {
                    slot.panel.clear();
                    slot.panel.show_placeholder(NO_ITEMS_PLACEHOLDER);
                } else {
                    slot.panel.set_entries(&entries);
                }
                slot.state.populate(entries, now);
            }
            Err(error) => {
                warn!(
                    "panel {} fetch for {} failed: {error}",
                    outcome.panel, outcome.parent
                );
                slot.panel.clear();
                slot.panel.show_placeholder(&error.placeholder());
                slot.state.fail(error.to_string(), now);
            }
        }

        true
    }

    fn begin_fetch(&mut self, index: usize, parent: ParentKey) -> FetchRequest {
        let slot = &mut self.slots[index];
        let ticket = slot.state.begin_loading(parent.clone());
        slot.panel.clear();
        slot.panel.show_placeholder(LOADING_PLACEHOLDER);
        debug!("panel {index} loading {parent} (ticket {ticket})");

        FetchRequest {
            panel: index,
            ticket,
            parent,
            gateway: Arc::clone(&slot.gateway),
        }
    }

    fn clear_from(&mut self, start: usize) {
        for slot in self.slots.iter_mut().skip(start) {
            slot.state.clear();
            slot.panel.clear();
        }
    }
}

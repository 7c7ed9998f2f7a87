use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::navigation::{FetchOutcome, FetchRequest};

/// Runs list calls off the UI loop, one outstanding task per panel.
///
/// Starting a fetch for panel `k` aborts whatever was still running for `k`
/// and every deeper panel, since the controller would drop those results.
pub struct FetchTasks {
    tx: mpsc::UnboundedSender<FetchOutcome>,
    timeout: Duration,
    in_flight: BTreeMap<usize, (u64, JoinHandle<()>)>,
}

impl FetchTasks {
    pub fn new(tx: mpsc::UnboundedSender<FetchOutcome>, timeout: Duration) -> Self {
        Self {
            tx,
            timeout,
            in_flight: BTreeMap::new(),
        }
    }

    pub fn spawn(&mut self, request: FetchRequest) {
        let panel = request.panel();
        let ticket = request.ticket();
        for (superseded, (old_ticket, handle)) in self.in_flight.split_off(&panel) {
            debug!("cancelling fetch for panel {superseded} (ticket {old_ticket})");
            handle.abort();
        }

        debug!("spawning fetch for panel {panel} parent {}", request.parent());
        let tx = self.tx.clone();
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            let outcome = request.execute(timeout).await;
            let _ = tx.send(outcome);
        });
        self.in_flight.insert(panel, (ticket, handle));
    }

    pub fn finished(&mut self, panel: usize, ticket: u64) {
        if self
            .in_flight
            .get(&panel)
            .is_some_and(|(current, _)| *current == ticket)
        {
            self.in_flight.remove(&panel);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn abort_all(&mut self) {
        for (_, (_, handle)) in std::mem::take(&mut self.in_flight) {
            handle.abort();
        }
    }
}

impl Drop for FetchTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

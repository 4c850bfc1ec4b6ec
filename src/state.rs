//! In-memory copy of the owner's data, kept in sync with a store subscription.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::StreamExt;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    model::AppState,
    stats::Statistics,
    store::{Snapshot, SnapshotStream, SyncStatus},
    utils::clock::Clock,
};

struct Memo {
    state: Arc<AppState>,
    today: NaiveDate,
    statistics: Arc<Statistics>,
}

/// Owns the latest [AppState]. It only changes through [StateContainer::apply], which is fed by a
/// store subscription.
pub struct StateContainer {
    state: Arc<AppState>,
    status: SyncStatus,
    clock: Arc<dyn Clock>,
    memo: Option<Memo>,
}

impl StateContainer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(AppState::default()),
            status: SyncStatus::Loading,
            clock,
            memo: None,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Takes over a snapshot. Returns whether the state changed. An equal state keeps its
    /// identity, so memoized statistics stay valid.
    pub fn apply(&mut self, snapshot: Snapshot) -> bool {
        self.status = snapshot.status;
        if *self.state == snapshot.state {
            return false;
        }
        self.state = Arc::new(snapshot.state);
        true
    }

    /// Statistics of the current state. Recomputed only when the state or the current date
    /// changes.
    pub fn statistics(&mut self) -> Arc<Statistics> {
        let today = self.clock.today();
        match &self.memo {
            Some(memo) if Arc::ptr_eq(&memo.state, &self.state) && memo.today == today => {
                memo.statistics.clone()
            }
            _ => {
                debug!("Recomputing statistics");
                let statistics = Arc::new(Statistics::compute(&self.state, today));
                self.memo = Some(Memo {
                    state: self.state.clone(),
                    today,
                    statistics: statistics.clone(),
                });
                statistics
            }
        }
    }

    /// Applies snapshots until the stream ends or `cancel` fires. `on_change` runs after every
    /// snapshot that changed the state or the status.
    pub async fn follow(
        &mut self,
        mut snapshots: SnapshotStream,
        cancel: CancellationToken,
        mut on_change: impl FnMut(&mut Self),
    ) {
        loop {
            let snapshot = select! {
                _ = cancel.cancelled() => break,
                snapshot = snapshots.next() => snapshot,
            };
            let Some(snapshot) = snapshot else {
                info!("Subscription ended");
                break;
            };
            let previous_status = self.status.clone();
            let changed = self.apply(snapshot);
            if changed || previous_status != self.status {
                on_change(self);
            }
        }
    }
}

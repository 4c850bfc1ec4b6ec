//! Persistence of projects, tags and logs.
//!
//! Two realizations of [WorkLogStore] exist:
//!  - [documents::DocumentStore] keeps three independent owner scoped collections, each one an
//!    append only journal of records.
//!  - [local::LocalStore] keeps the whole state of a single implicit user in one blob.
//!
//! Both publish [Snapshot]s of the owner's state through [WorkLogStore::subscribe] after every
//! change.

pub mod documents;
pub mod error;
pub mod journal;
pub mod local;
pub mod retry;
pub mod rules;

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::{
    AppState, DayLog, LogUpdate, NewLog, NewProject, NewTag, Project, ProjectUpdate, Tag,
};

pub use error::{StoreError, StoreResult};

/// Readiness of the data delivered by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing was loaded yet.
    Loading,
    /// The backend is temporarily unable to answer queries. Not a failure.
    IndexesBuilding,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub status: SyncStatus,
    pub state: AppState,
}

impl Snapshot {
    pub fn loading() -> Self {
        Self {
            status: SyncStatus::Loading,
            state: AppState::default(),
        }
    }
}

pub type SnapshotStream = BoxStream<'static, Snapshot>;

/// Operations the rest of the application performs on persisted data. Every operation is
/// scoped to the owner the store was opened for.
///
/// Deleting a project deletes its logs, deleting a tag removes it from every log.
#[async_trait]
pub trait WorkLogStore: Send + Sync {
    /// Stream of full snapshots. The current snapshot is delivered immediately, after that a new
    /// one arrives on every change.
    async fn subscribe(&self) -> StoreResult<SnapshotStream>;

    /// Reloads everything from the backend and publishes the result to subscribers.
    async fn refresh(&self) -> StoreResult<AppState>;

    async fn add_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, id: &str, update: ProjectUpdate) -> StoreResult<Project>;
    async fn delete_project(&self, id: &str) -> StoreResult<()>;

    async fn add_tag(&self, tag: NewTag) -> StoreResult<Tag>;
    /// Persists names, colors and the order of `tags`. The order of the slice is the new tag
    /// order.
    async fn update_tags(&self, tags: &[Tag]) -> StoreResult<()>;
    async fn delete_tag(&self, id: &str) -> StoreResult<()>;

    async fn add_log(&self, log: NewLog) -> StoreResult<DayLog>;
    async fn update_log(&self, id: &str, update: LogUpdate) -> StoreResult<DayLog>;
    async fn delete_log(&self, id: &str) -> StoreResult<()>;
}

/// Fan out of snapshots shared by the stores. Keeps the latest snapshot, so late subscribers
/// start from the current state.
pub(crate) struct Publisher {
    sender: watch::Sender<Snapshot>,
}

impl Publisher {
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(Snapshot::loading()),
        }
    }

    pub fn subscribe(&self) -> SnapshotStream {
        WatchStream::new(self.sender.subscribe()).boxed()
    }

    pub fn current(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    /// Changes a part of the published state. Subscribers are notified even if nobody listens
    /// yet, the value is kept for them.
    pub fn modify(&self, change: impl FnOnce(&mut Snapshot)) {
        self.sender.send_modify(change);
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use futures::future::try_join_all;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::model::{
    AppState, DayLog, LogUpdate, NewLog, NewProject, NewTag, OwnerId, Project, ProjectUpdate, Tag,
};

use super::{
    error::{StoreError, StoreResult},
    journal::{Journal, JournalEntry, Record},
    rules::{
        check_day_capacity, check_not_blank, check_project_number, check_project_reference,
        check_unique_tags, logs_of_project, logs_without_tag,
    },
    Publisher, SnapshotStream, SyncStatus, WorkLogStore,
};

/// Present while journals are being rewritten. Queries made during that time can't be answered.
pub(crate) const REINDEX_MARKER: &str = ".reindexing";

/// Store with independent collections for projects, tags and logs. Collections are shared by all
/// owners, every query filters by the owner of the store.
pub struct DocumentStore {
    dir: PathBuf,
    owner: Option<OwnerId>,
    projects: Journal<Project>,
    tags: Journal<Tag>,
    logs: Journal<DayLog>,
    /// Serializes file access of this process. File locks only guard against other processes.
    io: Mutex<()>,
    publisher: Publisher,
}

impl DocumentStore {
    /// `owner` is the signed in user. Without one every operation fails with
    /// [StoreError::NotAuthenticated].
    pub fn open(dir: PathBuf, owner: Option<OwnerId>) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create document directory {dir:?}"))?;
        Ok(Self {
            projects: Journal::new(&dir),
            tags: Journal::new(&dir),
            logs: Journal::new(&dir),
            dir,
            owner,
            io: Mutex::new(()),
            publisher: Publisher::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn owner(&self) -> StoreResult<&OwnerId> {
        self.owner.as_ref().ok_or(StoreError::NotAuthenticated)
    }

    async fn ensure_indexes_ready(&self) -> StoreResult<()> {
        if tokio::fs::try_exists(self.dir.join(REINDEX_MARKER)).await? {
            return Err(StoreError::IndexesBuilding);
        }
        Ok(())
    }

    async fn query<T: Record>(&self, journal: &Journal<T>, owner: &OwnerId) -> StoreResult<Vec<T>> {
        self.ensure_indexes_ready().await?;
        let mut records = journal.read_all().await?;
        records.retain(|v| v.owner() == owner);
        Ok(records)
    }

    /// Newest projects first.
    async fn query_projects(&self, owner: &OwnerId) -> StoreResult<Vec<Project>> {
        let mut projects = self.query(&self.projects, owner).await?;
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn query_tags(&self, owner: &OwnerId) -> StoreResult<Vec<Tag>> {
        let mut tags = self.query(&self.tags, owner).await?;
        tags.sort_by_key(|v| v.position);
        Ok(tags)
    }

    /// Latest dates first.
    async fn query_logs(&self, owner: &OwnerId) -> StoreResult<Vec<DayLog>> {
        let mut logs = self.query(&self.logs, owner).await?;
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    async fn query_all(&self, owner: &OwnerId) -> StoreResult<AppState> {
        Ok(AppState {
            projects: self.query_projects(owner).await?,
            tags: self.query_tags(owner).await?,
            logs: self.query_logs(owner).await?,
        })
    }

    /// Applies a change to the published state. Nothing is published before the first full
    /// load, a partial state would be misleading.
    fn publish(&self, change: impl FnOnce(&mut AppState)) {
        self.publisher.modify(|snapshot| {
            if snapshot.status == SyncStatus::Ready {
                change(&mut snapshot.state)
            }
        });
    }

    fn publish_status(&self, status: SyncStatus) {
        self.publisher.modify(|snapshot| snapshot.status = status);
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn check_unique_number(projects: &[Project], number: &str, except: &str) -> StoreResult<()> {
        if projects
            .iter()
            .any(|v| v.project_number == number && v.id != except)
        {
            return Err(StoreError::Validation(format!(
                "Project number {number} is already used"
            )));
        }
        Ok(())
    }

    /// Drops records that are no longer visible to anybody from the journals. Queries fail with
    /// [StoreError::IndexesBuilding] until it's done.
    #[instrument(skip(self))]
    pub async fn compact(&self) -> StoreResult<()> {
        let _guard = self.io.lock().await;
        let marker = self.dir.join(REINDEX_MARKER);
        tokio::fs::write(&marker, b"").await?;

        let result = async {
            self.projects
                .rewrite(&self.projects.read_all().await?)
                .await?;
            self.tags.rewrite(&self.tags.read_all().await?).await?;
            self.logs.rewrite(&self.logs.read_all().await?).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        tokio::fs::remove_file(&marker).await?;
        result?;
        info!("Compacted journals in {:?}", self.dir);
        Ok(())
    }
}

#[async_trait]
impl WorkLogStore for DocumentStore {
    async fn subscribe(&self) -> StoreResult<SnapshotStream> {
        self.owner()?;
        if self.publisher.current().status != SyncStatus::Ready {
            if let Err(e) = self.refresh().await {
                warn!("Initial load failed {e}");
            }
        }
        Ok(self.publisher.subscribe())
    }

    async fn refresh(&self) -> StoreResult<AppState> {
        let owner = self.owner()?.clone();
        let result = {
            let _guard = self.io.lock().await;
            self.query_all(&owner).await
        };
        match result {
            Ok(state) => {
                debug!(
                    "Loaded {} projects, {} tags, {} logs",
                    state.projects.len(),
                    state.tags.len(),
                    state.logs.len()
                );
                let published = state.clone();
                self.publisher.modify(|snapshot| {
                    snapshot.status = SyncStatus::Ready;
                    snapshot.state = published;
                });
                Ok(state)
            }
            Err(e) if e.is_transient() => {
                self.publish_status(SyncStatus::IndexesBuilding);
                Err(e)
            }
            Err(e) => {
                self.publish_status(SyncStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn add_project(&self, project: NewProject) -> StoreResult<Project> {
        let owner = self.owner()?;
        check_project_number(&project.project_number)?;
        check_not_blank("Production company", &project.production_company)?;
        check_not_blank("Project name", &project.name)?;

        let _guard = self.io.lock().await;
        let projects = self.query_projects(owner).await?;
        Self::check_unique_number(&projects, &project.project_number, "")?;

        let project = project.into_project(Self::new_id(), owner.clone());
        self.projects
            .append(&[JournalEntry::Put {
                record: project.clone(),
            }])
            .await?;

        let projects = self.query_projects(owner).await?;
        self.publish(|state| state.projects = projects);
        info!("Added project {}", project.id);
        Ok(project)
    }

    #[instrument(skip(self))]
    async fn update_project(&self, id: &str, update: ProjectUpdate) -> StoreResult<Project> {
        let owner = self.owner()?;
        let _guard = self.io.lock().await;
        let projects = self.query_projects(owner).await?;
        let mut project = projects
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "Project",
                id: id.to_string(),
            })?;

        update.apply(&mut project);
        check_project_number(&project.project_number)?;
        Self::check_unique_number(&projects, &project.project_number, id)?;

        self.projects
            .append(&[JournalEntry::Put {
                record: project.clone(),
            }])
            .await?;

        let projects = self.query_projects(owner).await?;
        self.publish(|state| state.projects = projects);
        Ok(project)
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, id: &str) -> StoreResult<()> {
        let owner = self.owner()?;
        let log_ids = {
            let _guard = self.io.lock().await;
            let state = AppState {
                projects: self.query_projects(owner).await?,
                tags: vec![],
                logs: self.query_logs(owner).await?,
            };
            if state.project(id).is_none() {
                return Err(StoreError::NotFound {
                    entity: "Project",
                    id: id.to_string(),
                });
            }
            logs_of_project(&state, id)
        };

        debug!("Deleting {} logs of project {id}", log_ids.len());
        // The project record goes only after every one of its logs is gone.
        try_join_all(log_ids.iter().map(|log_id| self.delete_log(log_id))).await?;

        let _guard = self.io.lock().await;
        self.projects
            .append(&[JournalEntry::Delete { id: id.to_string() }])
            .await?;

        let projects = self.query_projects(owner).await?;
        self.publish(|state| state.projects = projects);
        info!("Deleted project {id}");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_tag(&self, tag: NewTag) -> StoreResult<Tag> {
        let owner = self.owner()?;
        check_not_blank("Tag name", &tag.name)?;

        let _guard = self.io.lock().await;
        let tags = self.query_tags(owner).await?;
        let position = tags.iter().map(|v| v.position + 1).max().unwrap_or(0);
        let tag = tag.into_tag(Self::new_id(), owner.clone(), position);
        self.tags
            .append(&[JournalEntry::Put { record: tag.clone() }])
            .await?;

        let tags = self.query_tags(owner).await?;
        self.publish(|state| state.tags = tags);
        Ok(tag)
    }

    #[instrument(skip_all)]
    async fn update_tags(&self, tags: &[Tag]) -> StoreResult<()> {
        let owner = self.owner()?;
        check_unique_tags(tags)?;
        let _guard = self.io.lock().await;
        let stored = self.query_tags(owner).await?;

        let mut entries = Vec::with_capacity(stored.len());
        for (position, tag) in tags.iter().enumerate() {
            let mut record = stored
                .iter()
                .find(|v| v.id == tag.id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    entity: "Tag",
                    id: tag.id.clone(),
                })?;
            check_not_blank("Tag name", &tag.name)?;
            record.name.clone_from(&tag.name);
            record.color.clone_from(&tag.color);
            record.position = position as u32;
            entries.push(JournalEntry::Put { record });
        }
        // Tags left out keep their relative order behind the given ones.
        let rest = stored.iter().filter(|v| tags.iter().all(|t| t.id != v.id));
        for (position, tag) in rest.enumerate() {
            let mut record = tag.clone();
            record.position = (tags.len() + position) as u32;
            entries.push(JournalEntry::Put { record });
        }

        self.tags.append(&entries).await?;

        let tags = self.query_tags(owner).await?;
        self.publish(|state| state.tags = tags);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_tag(&self, id: &str) -> StoreResult<()> {
        let owner = self.owner()?;
        let _guard = self.io.lock().await;
        let state = AppState {
            projects: vec![],
            tags: self.query_tags(owner).await?,
            logs: self.query_logs(owner).await?,
        };
        if state.tag(id).is_none() {
            return Err(StoreError::NotFound {
                entity: "Tag",
                id: id.to_string(),
            });
        }

        let stripped = logs_without_tag(&state, id)
            .into_iter()
            .map(|record| JournalEntry::Put { record })
            .collect::<Vec<_>>();
        debug!("Removing tag {id} from {} logs", stripped.len());
        if !stripped.is_empty() {
            self.logs.append(&stripped).await?;
        }
        self.tags
            .append(&[JournalEntry::Delete { id: id.to_string() }])
            .await?;

        let tags = self.query_tags(owner).await?;
        let logs = self.query_logs(owner).await?;
        self.publish(|state| {
            state.tags = tags;
            state.logs = logs;
        });
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_log(&self, log: NewLog) -> StoreResult<DayLog> {
        let owner = self.owner()?;
        let _guard = self.io.lock().await;
        check_project_reference(&self.query_projects(owner).await?, &log.project_id)?;
        check_day_capacity(&self.query_logs(owner).await?, log.date)?;

        let log = log.into_log(Self::new_id(), owner.clone());
        self.logs
            .append(&[JournalEntry::Put { record: log.clone() }])
            .await?;

        let logs = self.query_logs(owner).await?;
        self.publish(|state| state.logs = logs);
        info!("Added log {} on {}", log.id, log.date);
        Ok(log)
    }

    #[instrument(skip(self))]
    async fn update_log(&self, id: &str, update: LogUpdate) -> StoreResult<DayLog> {
        let owner = self.owner()?;
        let _guard = self.io.lock().await;
        let mut log = self
            .query_logs(owner)
            .await?
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "Log",
                id: id.to_string(),
            })?;
        if let Some(project_id) = &update.project_id {
            check_project_reference(&self.query_projects(owner).await?, project_id)?;
        }

        update.apply(&mut log);
        self.logs
            .append(&[JournalEntry::Put { record: log.clone() }])
            .await?;

        let logs = self.query_logs(owner).await?;
        self.publish(|state| state.logs = logs);
        Ok(log)
    }

    #[instrument(skip(self))]
    async fn delete_log(&self, id: &str) -> StoreResult<()> {
        let owner = self.owner()?;
        let _guard = self.io.lock().await;
        if !self.query_logs(owner).await?.iter().any(|v| v.id == id) {
            return Err(StoreError::NotFound {
                entity: "Log",
                id: id.to_string(),
            });
        }
        self.logs
            .append(&[JournalEntry::Delete { id: id.to_string() }])
            .await?;

        let logs = self.query_logs(owner).await?;
        self.publish(|state| state.logs = logs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use tempfile::tempdir;

    use crate::{
        model::{DayType, LogUpdate, NewLog, NewProject, NewTag, OwnerId, ProjectUpdate},
        stats::tests::date,
        store::{rules::reorder_tags, StoreError, SyncStatus, WorkLogStore},
        utils::logging::TEST_LOGGING,
    };

    use super::{DocumentStore, JournalEntry, REINDEX_MARKER};

    fn new_project(number: &str, company: &str) -> NewProject {
        NewProject {
            project_number: number.into(),
            production_company: company.into(),
            name: "Commercial".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            is_paid: true,
            invoice_sent: Some(false),
        }
    }

    fn new_log(project_id: &str, day: u32, tags: &[&str]) -> NewLog {
        NewLog {
            date: date(day),
            project_id: project_id.into(),
            tags: tags.iter().map(|v| v.to_string()).collect(),
            notes: None,
            day_type: DayType::Full,
        }
    }

    fn open(dir: &std::path::Path, owner: &str) -> Result<DocumentStore> {
        DocumentStore::open(dir.to_path_buf(), Some(OwnerId::new(owner)))
    }

    #[tokio::test]
    async fn test_requires_session() -> Result<()> {
        let dir = tempdir()?;
        let store = DocumentStore::open(dir.path().to_path_buf(), None)?;
        assert!(matches!(
            store.add_project(new_project("2025001", "Acme")).await,
            Err(StoreError::NotAuthenticated)
        ));
        assert!(matches!(
            store.subscribe().await,
            Err(StoreError::NotAuthenticated)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_third_log_on_a_day_is_rejected() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let project = store.add_project(new_project("2025001", "Acme")).await?;
        store.add_log(new_log(&project.id, 3, &[])).await?;
        store.add_log(new_log(&project.id, 3, &[])).await?;
        let before = store.refresh().await?;

        let result = store.add_log(new_log(&project.id, 3, &[])).await;
        assert!(matches!(result, Err(StoreError::DayFull { .. })));
        assert_eq!(store.refresh().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_project_is_invalid_reference() -> Result<()> {
        let dir = tempdir()?;
        let alice = open(dir.path(), "alice")?;
        let bob = open(dir.path(), "bob")?;
        let project = alice.add_project(new_project("2025001", "Acme")).await?;
        let own = bob.add_project(new_project("2025001", "Acme")).await?;

        assert!(matches!(
            bob.add_log(new_log(&project.id, 3, &[])).await,
            Err(StoreError::InvalidReference { .. })
        ));

        let log = bob.add_log(new_log(&own.id, 3, &[])).await?;
        let update = LogUpdate {
            project_id: Some(project.id.clone()),
            ..Default::default()
        };
        assert!(matches!(
            bob.update_log(&log.id, update).await,
            Err(StoreError::InvalidReference { .. })
        ));
        assert!(matches!(
            alice.delete_log(&log.id).await,
            Err(StoreError::NotFound { .. })
        ));

        assert_eq!(alice.refresh().await?.projects.len(), 1);
        assert!(alice.refresh().await?.logs.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_tag_strips_logs() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let project = store.add_project(new_project("2025001", "Acme")).await?;
        let dp = store
            .add_tag(NewTag {
                name: "DP".into(),
                color: "#dc2626".into(),
            })
            .await?;
        let vfx = store
            .add_tag(NewTag {
                name: "VFX".into(),
                color: "#059669".into(),
            })
            .await?;
        for day in 3..6 {
            store
                .add_log(new_log(&project.id, day, &[&dp.id, &vfx.id]))
                .await?;
        }

        store.delete_tag(&dp.id).await?;

        let state = store.refresh().await?;
        assert_eq!(state.tags, vec![vfx.clone()]);
        assert_eq!(state.logs.len(), 3);
        assert!(state.logs.iter().all(|v| v.tags == [vfx.id.clone()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_project_cascades() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let doomed = store.add_project(new_project("2025001", "Acme")).await?;
        let kept = store.add_project(new_project("2025002", "Acme")).await?;
        for day in 3..8 {
            store.add_log(new_log(&doomed.id, day, &[])).await?;
        }
        store.add_log(new_log(&kept.id, 3, &[])).await?;
        assert_eq!(store.refresh().await?.logs.len(), 6);

        store.delete_project(&doomed.id).await?;

        let state = store.refresh().await?;
        assert_eq!(state.logs.len(), 1);
        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.projects[0].id, kept.id);
        assert!(matches!(
            store.delete_project(&doomed.id).await,
            Err(StoreError::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_project_numbers_are_unique() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let first = store.add_project(new_project("2025001", "Acme")).await?;
        assert!(matches!(
            store.add_project(new_project("2025001", "Other")).await,
            Err(StoreError::Validation(_))
        ));

        let updated = store
            .update_project(
                &first.id,
                ProjectUpdate {
                    invoice_sent: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(updated.invoice_sent, Some(true));
        assert_eq!(updated.project_number, "2025001");
        Ok(())
    }

    #[tokio::test]
    async fn test_tag_order_is_persisted() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        for name in ["DP", "Colorist", "VFX"] {
            store
                .add_tag(NewTag {
                    name: name.into(),
                    color: "#4b5563".into(),
                })
                .await?;
        }
        let mut tags = store.refresh().await?.tags;
        reorder_tags(&mut tags, 2, 0)?;
        store.update_tags(&tags).await?;

        let reopened = open(dir.path(), "alice")?;
        let names = reopened
            .refresh()
            .await?
            .tags
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["VFX", "DP", "Colorist"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_subscription_receives_changes() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let mut snapshots = store.subscribe().await?;

        let initial = snapshots.next().await.unwrap();
        assert_eq!(initial.status, SyncStatus::Ready);
        assert!(initial.state.projects.is_empty());

        let project = store.add_project(new_project("2025001", "Acme")).await?;
        let next = snapshots.next().await.unwrap();
        assert_eq!(next.state.projects, vec![project.clone()]);

        store
            .add_tag(NewTag {
                name: "DP".into(),
                color: "#dc2626".into(),
            })
            .await?;
        let next = snapshots.next().await.unwrap();
        assert_eq!(next.state.tags.len(), 1);
        assert_eq!(next.state.projects, vec![project]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reindexing_is_transient() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        store.add_project(new_project("2025001", "Acme")).await?;

        std::fs::write(dir.path().join(REINDEX_MARKER), b"")?;
        let mut snapshots = store.subscribe().await?;
        let snapshot = snapshots.next().await.unwrap();
        assert_eq!(snapshot.status, SyncStatus::IndexesBuilding);
        assert!(store.refresh().await.is_err_and(|e| e.is_transient()));

        std::fs::remove_file(dir.path().join(REINDEX_MARKER))?;
        store.refresh().await?;
        let snapshot = snapshots.next().await.unwrap();
        assert_eq!(snapshot.status, SyncStatus::Ready);
        assert_eq!(snapshot.state.projects.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_compact_keeps_live_records() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let project = store.add_project(new_project("2025001", "Acme")).await?;
        let log = store.add_log(new_log(&project.id, 3, &[])).await?;
        store.delete_log(&log.id).await?;
        store.add_log(new_log(&project.id, 4, &[])).await?;
        let before = store.refresh().await?;

        store.compact().await?;

        assert!(!dir.path().join(REINDEX_MARKER).exists());
        let logs = std::fs::read_to_string(dir.path().join("logs.jsonl"))?;
        assert_eq!(logs.lines().count(), 1);
        assert_eq!(store.refresh().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_cascade_keeps_project() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        let project = store.add_project(new_project("2025001", "Acme")).await?;
        let gone = store.add_log(new_log(&project.id, 3, &[])).await?;
        store.add_log(new_log(&project.id, 4, &[])).await?;

        // The io lock is fair, so the second branch runs between collecting the logs of the
        // project and deleting them, like a delete made by another device.
        let (result, removed) = tokio::join!(store.delete_project(&project.id), async {
            let _guard = store.io.lock().await;
            store
                .logs
                .append(&[JournalEntry::Delete {
                    id: gone.id.clone(),
                }])
                .await
        });
        removed?;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        let state = store.refresh().await?;
        assert_eq!(state.projects, vec![project]);
        assert!(state.log(&gone.id).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_project_number_must_be_digits() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        assert!(matches!(
            store.add_project(new_project("not-a-number", "Acme")).await,
            Err(StoreError::Validation(_))
        ));

        let project = store.add_project(new_project("2025001", "Acme")).await?;
        let update = ProjectUpdate {
            project_number: Some("A-7".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_project(&project.id, update).await,
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.refresh().await?.projects, vec![project]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_tags_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let store = open(dir.path(), "alice")?;
        for name in ["DP", "VFX"] {
            store
                .add_tag(NewTag {
                    name: name.into(),
                    color: "#4b5563".into(),
                })
                .await?;
        }
        let tags = store.refresh().await?.tags;

        assert!(matches!(
            store.update_tags(&[tags[0].clone(), tags[0].clone()]).await,
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.refresh().await?.tags, tags);
        Ok(())
    }
}

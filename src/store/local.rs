use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncReadExt, sync::Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::model::{
    defaults::initial_state, AppState, DayLog, LogUpdate, NewLog, NewProject, NewTag, OwnerId,
    Project, ProjectUpdate, Tag,
};

use super::{
    error::{StoreError, StoreResult},
    rules::{
        check_day_capacity, check_not_blank, check_project_number, check_project_reference,
        check_unique_tags, logs_without_tag, renumber_tags,
    },
    Publisher, SnapshotStream, SyncStatus, WorkLogStore,
};

/// Key of the blob. There is one blob per application directory and no notion of owners.
pub const LOCAL_STORAGE_KEY: &str = "film-work-logger";

/// Store keeping the whole [AppState] of a single implicit user as one json blob.
pub struct LocalStore {
    path: PathBuf,
    owner: OwnerId,
    io: Mutex<()>,
    publisher: Publisher,
}

impl LocalStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{LOCAL_STORAGE_KEY}.json")),
            owner: OwnerId::local(),
            io: Mutex::new(()),
            publisher: Publisher::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<AppState> {
        async fn read(path: &Path) -> Result<String, std::io::Error> {
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut content = String::new();
            let result = file.read_to_string(&mut content).await;
            file.unlock_async().await?;
            result.map(|_| content)
        }

        match read(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state at {:?}, starting fresh", self.path);
                Ok(initial_state(&self.owner))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &AppState) -> StoreResult<()> {
        let content = serde_json::to_vec_pretty(state)?;
        let temporary = self.path.with_extension("json.tmp");
        tokio::fs::write(&temporary, content).await?;
        tokio::fs::rename(&temporary, &self.path).await?;
        Ok(())
    }

    /// Read, change, write. Nothing is written if `change` fails.
    async fn mutate<R>(
        &self,
        change: impl FnOnce(&mut AppState, &OwnerId) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let _guard = self.io.lock().await;
        let mut state = self.load().await?;
        let result = change(&mut state, &self.owner)?;
        self.save(&state).await?;
        self.publisher.modify(|snapshot| {
            snapshot.status = SyncStatus::Ready;
            snapshot.state = state;
        });
        Ok(result)
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

fn not_found(entity: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

#[async_trait]
impl WorkLogStore for LocalStore {
    async fn subscribe(&self) -> StoreResult<SnapshotStream> {
        if self.publisher.current().status != SyncStatus::Ready {
            if let Err(e) = self.refresh().await {
                warn!("Initial load failed {e}");
            }
        }
        Ok(self.publisher.subscribe())
    }

    async fn refresh(&self) -> StoreResult<AppState> {
        let result = {
            let _guard = self.io.lock().await;
            self.load().await
        };
        match result {
            Ok(state) => {
                let published = state.clone();
                self.publisher.modify(|snapshot| {
                    snapshot.status = SyncStatus::Ready;
                    snapshot.state = published;
                });
                Ok(state)
            }
            Err(e) => {
                self.publisher
                    .modify(|snapshot| snapshot.status = SyncStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn add_project(&self, project: NewProject) -> StoreResult<Project> {
        check_project_number(&project.project_number)?;
        check_not_blank("Production company", &project.production_company)?;
        check_not_blank("Project name", &project.name)?;
        self.mutate(|state, owner| {
            if state
                .projects
                .iter()
                .any(|v| v.project_number == project.project_number)
            {
                return Err(StoreError::Validation(format!(
                    "Project number {} is already used",
                    project.project_number
                )));
            }
            let project = project.into_project(Self::new_id(), owner.clone());
            // Newest first, the same way the document store orders them.
            state.projects.insert(0, project.clone());
            Ok(project)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_project(&self, id: &str, update: ProjectUpdate) -> StoreResult<Project> {
        self.mutate(|state, _| {
            let number_taken = update.project_number.as_ref().is_some_and(|number| {
                state
                    .projects
                    .iter()
                    .any(|v| &v.project_number == number && v.id != id)
            });
            if number_taken {
                return Err(StoreError::Validation(
                    "Project number is already used".into(),
                ));
            }
            let project = state
                .projects
                .iter_mut()
                .find(|v| v.id == id)
                .ok_or_else(|| not_found("Project", id))?;
            update.apply(project);
            check_project_number(&project.project_number)?;
            Ok(project.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, id: &str) -> StoreResult<()> {
        self.mutate(|state, _| {
            if state.project(id).is_none() {
                return Err(not_found("Project", id));
            }
            let before = state.logs.len();
            state.logs.retain(|v| v.project_id != id);
            state.projects.retain(|v| v.id != id);
            info!(
                "Deleted project {id} with {} logs",
                before - state.logs.len()
            );
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn add_tag(&self, tag: NewTag) -> StoreResult<Tag> {
        check_not_blank("Tag name", &tag.name)?;
        self.mutate(|state, owner| {
            let tag = tag.into_tag(Self::new_id(), owner.clone(), state.tags.len() as u32);
            state.tags.push(tag.clone());
            Ok(tag)
        })
        .await
    }

    #[instrument(skip_all)]
    async fn update_tags(&self, tags: &[Tag]) -> StoreResult<()> {
        check_unique_tags(tags)?;
        self.mutate(|state, _| {
            let mut ordered = Vec::with_capacity(state.tags.len());
            for tag in tags {
                check_not_blank("Tag name", &tag.name)?;
                let mut record = state
                    .tag(&tag.id)
                    .cloned()
                    .ok_or_else(|| not_found("Tag", &tag.id))?;
                record.name.clone_from(&tag.name);
                record.color.clone_from(&tag.color);
                ordered.push(record);
            }
            ordered.extend(
                state
                    .tags
                    .iter()
                    .filter(|v| tags.iter().all(|t| t.id != v.id))
                    .cloned(),
            );
            renumber_tags(&mut ordered);
            state.tags = ordered;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_tag(&self, id: &str) -> StoreResult<()> {
        self.mutate(|state, _| {
            if state.tag(id).is_none() {
                return Err(not_found("Tag", id));
            }
            for stripped in logs_without_tag(state, id) {
                if let Some(log) = state.logs.iter_mut().find(|v| v.id == stripped.id) {
                    *log = stripped;
                }
            }
            state.tags.retain(|v| v.id != id);
            renumber_tags(&mut state.tags);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn add_log(&self, log: NewLog) -> StoreResult<DayLog> {
        self.mutate(|state, owner| {
            check_project_reference(&state.projects, &log.project_id)?;
            check_day_capacity(&state.logs, log.date)?;
            let log = log.into_log(Self::new_id(), owner.clone());
            state.logs.push(log.clone());
            Ok(log)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_log(&self, id: &str, update: LogUpdate) -> StoreResult<DayLog> {
        self.mutate(|state, _| {
            if let Some(project_id) = &update.project_id {
                check_project_reference(&state.projects, project_id)?;
            }
            let log = state
                .logs
                .iter_mut()
                .find(|v| v.id == id)
                .ok_or_else(|| not_found("Log", id))?;
            update.apply(log);
            Ok(log.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_log(&self, id: &str) -> StoreResult<()> {
        self.mutate(|state, _| {
            let before = state.logs.len();
            state.logs.retain(|v| v.id != id);
            if state.logs.len() == before {
                return Err(not_found("Log", id));
            }
            Ok(())
        })
        .await
    }
}

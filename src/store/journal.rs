use std::{
    io::{ErrorKind, SeekFrom},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::model::{DayLog, OwnerId, Project, Tag};

/// A record stored in a collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn owner(&self) -> &OwnerId;
}

impl Record for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.owner_id
    }
}

impl Record for Tag {
    const COLLECTION: &'static str = "tags";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.owner_id
    }
}

impl Record for DayLog {
    const COLLECTION: &'static str = "logs";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.owner_id
    }
}

/// Single line of a journal. Journals are never edited in place, a change is a new line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JournalEntry<T> {
    Put { record: T },
    Delete { id: String },
}

/// Collection stored as a json lines file of [JournalEntry]. The current content of the
/// collection is what's left after replaying every line.
pub struct Journal<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Journal<T> {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.jsonl", T::COLLECTION)),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replays the journal. Records keep the position of their first put.
    pub async fn read_all(&self) -> Result<Vec<T>, std::io::Error> {
        match self.read_entries().await {
            Ok(entries) => Ok(replay(entries)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e),
        }
    }

    async fn read_entries(&self) -> Result<Vec<JournalEntry<T>>, std::io::Error> {
        debug!("Reading journal {:?}", self.path);
        let file = File::open(&self.path).await?;
        file.lock_shared()?;
        let mut reader = BufReader::new(file);
        let mut entries = vec![];
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).await? == 0 {
                break;
            }
            let line = match std::str::from_utf8(&buffer) {
                Ok(v) => v.trim_end(),
                Err(e) => {
                    // A write cut off in the middle of a character
                    warn!("During parsing in path {:?} found a line that isn't utf-8: {e}", self.path);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry<T>>(line) {
                Ok(v) => entries.push(v),
                Err(e) => {
                    // Might happen if a write was cut off
                    warn!(
                        "During parsing in path {:?} found illegal json string {}: {e}",
                        self.path, line
                    )
                }
            }
        }
        reader.into_inner().unlock_async().await?;
        Ok(entries)
    }

    pub async fn append(&self, entries: &[JournalEntry<T>]) -> Result<(), std::io::Error> {
        let mut buffer = Vec::<u8>::new();
        for entry in entries {
            serde_json::to_writer(&mut buffer, entry)?;
            buffer.push(b'\n');
        }

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::append_with_file(&mut file, &buffer).await;
        file.unlock_async().await?;
        result
    }

    async fn append_with_file(file: &mut File, buffer: &[u8]) -> Result<(), std::io::Error> {
        let end = file.seek(SeekFrom::End(0)).await?;
        if end > 0 {
            // A torn previous write must not swallow the new line.
            file.seek(SeekFrom::End(-1)).await?;
            let last = file.read_u8().await?;
            if last != b'\n' {
                file.write_all(b"\n").await?;
            }
        }
        file.write_all(buffer).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Replaces the journal with one put per record.
    pub async fn rewrite(&self, records: &[T]) -> Result<(), std::io::Error> {
        let mut buffer = Vec::<u8>::new();
        for record in records {
            serde_json::to_writer(
                &mut buffer,
                &JournalEntry::Put {
                    record: record.clone(),
                },
            )?;
            buffer.push(b'\n');
        }

        let temporary = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&temporary, &buffer).await?;
        tokio::fs::rename(&temporary, &self.path).await?;
        Ok(())
    }
}

fn replay<T: Record>(entries: impl IntoIterator<Item = JournalEntry<T>>) -> Vec<T> {
    let mut records = Vec::<T>::new();
    for entry in entries {
        match entry {
            JournalEntry::Put { record } => {
                match records.iter_mut().find(|v| v.id() == record.id()) {
                    Some(existing) => *existing = record,
                    None => records.push(record),
                }
            }
            JournalEntry::Delete { id } => records.retain(|v| v.id() != id),
        }
    }
    records
}

//! Signed in user. Identity itself is managed elsewhere, this only remembers which owner the
//! document store should act for.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::OwnerId;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub owner_id: OwnerId,
}

fn session_path(dir: &Path) -> PathBuf {
    dir.join(SESSION_FILE)
}

/// Returns the current session, `None` if nobody is signed in.
pub fn load_session(dir: &Path) -> Result<Option<Session>> {
    let path = session_path(dir);
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(Some(
            serde_json::from_str(&content)
                .with_context(|| format!("Session file {path:?} is corrupted"))?,
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn sign_in(dir: &Path, owner_id: &str) -> Result<Session> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        bail!("Owner id can't be empty");
    }
    let session = Session {
        owner_id: OwnerId::new(owner_id),
    };
    std::fs::write(session_path(dir), serde_json::to_vec(&session)?)?;
    info!("Signed in as {owner_id}");
    Ok(session)
}

/// Returns whether there was a session to end.
pub fn sign_out(dir: &Path) -> Result<bool> {
    match std::fs::remove_file(session_path(dir)) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

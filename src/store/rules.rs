//! Checks and cascades shared by every store. They work on an [AppState] of a single owner.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::{AppState, DayLog, Project, Tag};

use super::error::{StoreError, StoreResult};

/// At most this many logs may exist on one calendar date.
pub const MAX_LOGS_PER_DAY: usize = 2;

/// Rejects a new log on `date` if the date is already full.
pub fn check_day_capacity(logs: &[DayLog], date: NaiveDate) -> StoreResult<()> {
    let existing = logs.iter().filter(|v| v.date == date).count();
    if existing >= MAX_LOGS_PER_DAY {
        return Err(StoreError::DayFull {
            date,
            max: MAX_LOGS_PER_DAY,
        });
    }
    Ok(())
}

/// `projects` must be the projects of the owner doing the write. A project of someone else is
/// indistinguishable from a missing one.
pub fn check_project_reference(projects: &[Project], project_id: &str) -> StoreResult<()> {
    if projects.iter().any(|v| v.id == project_id) {
        Ok(())
    } else {
        Err(StoreError::InvalidReference {
            entity: "project",
            id: project_id.to_string(),
        })
    }
}

pub fn check_not_blank(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        Err(StoreError::Validation(format!("{field} can't be empty")))
    } else {
        Ok(())
    }
}

/// Project numbers are made of digits only, like `2025001`.
pub fn check_project_number(number: &str) -> StoreResult<()> {
    if !number.is_empty() && number.chars().all(|v| v.is_ascii_digit()) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "Project number {number:?} must consist of digits"
        )))
    }
}

/// A tag may appear only once in a new tag order.
pub fn check_unique_tags(tags: &[Tag]) -> StoreResult<()> {
    let mut seen = HashSet::new();
    match tags.iter().find(|v| !seen.insert(v.id.as_str())) {
        Some(duplicate) => Err(StoreError::Validation(format!(
            "Tag {} appears more than once",
            duplicate.id
        ))),
        None => Ok(()),
    }
}

/// Moves the tag at `from` to index `to`, shifting the tags in between. Positions are renumbered
/// to match the new order.
pub fn reorder_tags(tags: &mut Vec<Tag>, from: usize, to: usize) -> StoreResult<()> {
    if from >= tags.len() || to >= tags.len() {
        return Err(StoreError::Validation(format!(
            "Can't move tag from {from} to {to}, there are {} tags",
            tags.len()
        )));
    }
    let tag = tags.remove(from);
    tags.insert(to, tag);
    renumber_tags(tags);
    Ok(())
}

pub fn renumber_tags(tags: &mut [Tag]) {
    for (position, tag) in tags.iter_mut().enumerate() {
        tag.position = position as u32;
    }
}

/// Ids of logs removed together with a project.
pub fn logs_of_project(state: &AppState, project_id: &str) -> Vec<String> {
    state
        .logs_for_project(project_id)
        .map(|v| v.id.clone())
        .collect()
}

/// Logs that carry the tag, with the tag already stripped.
pub fn logs_without_tag(state: &AppState, tag_id: &str) -> Vec<DayLog> {
    state
        .logs
        .iter()
        .filter(|v| v.has_tag(tag_id))
        .map(|v| {
            let mut log = v.clone();
            log.tags.retain(|v| v != tag_id);
            log
        })
        .collect()
}

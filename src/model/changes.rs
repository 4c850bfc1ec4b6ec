//! Inputs of store mutations. Identity and ownership are assigned by the store, never by the
//! caller.

use chrono::{DateTime, NaiveDate, Utc};

use super::entities::{DayLog, DayType, OwnerId, Project, Tag};

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    /// Caller supplied next number, see [next_project_number](super::defaults::next_project_number).
    pub project_number: String,
    pub production_company: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub is_paid: bool,
    pub invoice_sent: Option<bool>,
}

impl NewProject {
    pub fn into_project(self, id: String, owner_id: OwnerId) -> Project {
        Project {
            id,
            owner_id,
            project_number: self.project_number,
            production_company: self.production_company,
            name: self.name,
            created_at: self.created_at,
            is_paid: self.is_paid,
            invoice_sent: self.invoice_sent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub project_number: Option<String>,
    pub production_company: Option<String>,
    pub name: Option<String>,
    pub is_paid: Option<bool>,
    pub invoice_sent: Option<bool>,
}

impl ProjectUpdate {
    pub fn apply(&self, project: &mut Project) {
        if let Some(v) = &self.project_number {
            project.project_number.clone_from(v);
        }
        if let Some(v) = &self.production_company {
            project.production_company.clone_from(v);
        }
        if let Some(v) = &self.name {
            project.name.clone_from(v);
        }
        if let Some(v) = self.is_paid {
            project.is_paid = v;
        }
        if let Some(v) = self.invoice_sent {
            project.invoice_sent = Some(v);
        }
        // Pro bono projects have no invoice
        if !project.is_paid {
            project.invoice_sent = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

impl NewTag {
    pub fn into_tag(self, id: String, owner_id: OwnerId, position: u32) -> Tag {
        Tag {
            id,
            owner_id,
            name: self.name,
            color: self.color,
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLog {
    pub date: NaiveDate,
    pub project_id: String,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub day_type: DayType,
}

impl NewLog {
    pub fn into_log(self, id: String, owner_id: OwnerId) -> DayLog {
        DayLog {
            id,
            owner_id,
            date: self.date,
            project_id: self.project_id,
            tags: dedup_tags(self.tags),
            notes: self.notes.filter(|v| !v.is_empty()),
            day_type: self.day_type,
        }
    }
}

/// The date of a log is fixed once it's written, everything else can change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogUpdate {
    pub project_id: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
    pub day_type: Option<DayType>,
}

impl LogUpdate {
    pub fn apply(&self, log: &mut DayLog) {
        if let Some(v) = &self.project_id {
            log.project_id.clone_from(v);
        }
        if let Some(v) = &self.tags {
            log.tags = dedup_tags(v.clone());
        }
        if let Some(v) = &self.notes {
            log.notes = v.clone().filter(|v| !v.is_empty());
        }
        if let Some(v) = self.day_type {
            log.day_type = v;
        }
    }
}

/// Tags of a log are a set. Keeps the first occurrence of every id.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(tags.len());
    for tag in tags {
        if !result.contains(&tag) {
            result.push(tag);
        }
    }
    result
}

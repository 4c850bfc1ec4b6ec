use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reference to the account owning a record.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct OwnerId(Arc<str>);

impl OwnerId {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    /// The single implicit owner of the local storage variant.
    pub fn local() -> Self {
        Self("local".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    /// Sequential number made of digits, unique per owner.
    pub project_number: String,
    pub production_company: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_paid")]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_sent: Option<bool>,
}

fn default_paid() -> bool {
    true
}

impl Project {
    pub fn invoice_sent(&self) -> bool {
        self.invoice_sent.unwrap_or(false)
    }

    /// Label used when a project has to be picked from a list.
    pub fn label(&self) -> String {
        format!(
            "{}_{}_{}",
            self.project_number, self.production_company, self.name
        )
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    pub name: String,
    /// Hex color, e.g. `#dc2626`.
    pub color: String,
    /// Index in the user defined tag order.
    #[serde(default)]
    pub position: u32,
}

impl Tag {
    /// Parses [Tag::color] into rgb components.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let component = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some((component(0)?, component(2)?, component(4)?))
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    #[default]
    Full,
    Half,
}

impl DayType {
    /// Contribution of a single log to a weighted day count.
    pub fn weight(self) -> f64 {
        match self {
            DayType::Full => 1.0,
            DayType::Half => 0.5,
        }
    }
}

impl Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Full => write!(f, "full"),
            DayType::Half => write!(f, "half"),
        }
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DayLog {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    pub date: NaiveDate,
    pub project_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub day_type: DayType,
}

impl DayLog {
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|v| v == tag_id)
    }
}

/// Everything one owner has. Held in memory and kept in sync with a store.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppState {
    pub projects: Vec<Project>,
    pub tags: Vec<Tag>,
    pub logs: Vec<DayLog>,
}

impl AppState {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|v| v.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|v| v.id == id)
    }

    pub fn log(&self, id: &str) -> Option<&DayLog> {
        self.logs.iter().find(|v| v.id == id)
    }

    pub fn logs_on(&self, date: NaiveDate) -> impl Iterator<Item = &DayLog> {
        self.logs.iter().filter(move |v| v.date == date)
    }

    pub fn logs_for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a DayLog> {
        self.logs.iter().filter(move |v| v.project_id == project_id)
    }
}

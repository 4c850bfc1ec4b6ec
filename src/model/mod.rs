//! Shared entity shapes. Every entity is scoped to exactly one [OwnerId]; persisted records carry
//! it explicitly so that collections can be stored independently of each other.

pub mod changes;
pub mod defaults;
pub mod entities;

pub use changes::{LogUpdate, NewLog, NewProject, NewTag, ProjectUpdate};
pub use entities::{AppState, DayLog, DayType, OwnerId, Project, Tag};

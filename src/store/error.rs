use chrono::NaiveDate;

/// Everything a store can fail with. Messages are meant to be shown to the user as is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid {entity} selected: {id}")]
    InvalidReference { entity: &'static str, id: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The backend is rebuilding its indexes. Waiting is enough to recover from it.
    #[error("Setting up the database, indexes are still building")]
    IndexesBuilding,

    #[error("Maximum of {max} logs per day allowed, {date} is full")]
    DayFull { date: NaiveDate, max: usize },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Backend failure: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Transient errors go away on their own and should be retried by waiting.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::IndexesBuilding)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Backend(value.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Backend(value.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

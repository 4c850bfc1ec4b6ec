pub mod account;
pub mod logs;
pub mod project;
pub mod report;
pub mod tag;
pub mod watch;

use std::{
    fmt::Display,
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context as _, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    model::AppState,
    session::load_session,
    store::{
        documents::DocumentStore, local::LocalStore, retry::retry_transient, StoreResult,
        WorkLogStore,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        time::parse_user_date,
    },
};

use self::{
    account::AccountCommand, logs::LogCommand, project::ProjectCommand, tag::TagCommand,
    watch::WatchCommand,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "Crewlog", version, long_about = None)]
#[command(about = "Log days worked on film projects and see where your time went", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "CREWLOG_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "CREWLOG_LOCAL",
        help = "Keep everything in a single local file instead of the document store. Doesn't need a login"
    )]
    local: bool,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Account(AccountCommand),
    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Manage tags")]
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },
    #[command(about = "Log, edit and list work days")]
    Log {
        #[command(subcommand)]
        command: LogCommand,
    },
    #[command(about = "Show statistics")]
    Stats {
        #[arg(long, help = "Show every production company instead of the top ones")]
        all: bool,
        #[arg(long, help = "Print statistics as json")]
        json: bool,
    },
    #[command(about = "Keep showing statistics, updating them on every change")]
    Watch {
        #[command(flatten)]
        command: WatchCommand,
    },
    #[command(about = "Rewrite the document store, dropping deleted records")]
    Compact {},
}

/// Everything a command needs to run.
pub struct Context {
    pub dir: PathBuf,
    pub store: Box<dyn WorkLogStore>,
    pub clock: Arc<dyn Clock>,
    pub date_style: DateStyle,
}

impl Context {
    /// Current state, waiting while the backend is not ready.
    pub async fn load(&self) -> StoreResult<AppState> {
        self.mutate(|| self.store.refresh()).await
    }

    /// Runs a store operation, waiting while the backend is not ready instead of failing.
    pub async fn mutate<T, F, Fut>(&self, operation: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        retry_transient(self.clock.as_ref(), operation).await
    }

    pub fn parse_date(&self, value: &str) -> Result<chrono::NaiveDate> {
        parse_user_date(
            value,
            self.clock.time().with_timezone(&Local),
            self.date_style.into(),
        )
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;
    debug!("Running {:?} in {dir:?}", args.commands);

    match args.commands {
        Commands::Account(command) => return account::process_account_command(&dir, command),
        Commands::Compact {} => return compact(&dir, args.local).await,
        _ => {}
    }

    let store: Box<dyn WorkLogStore> = if args.local {
        Box::new(LocalStore::open(&dir))
    } else {
        Box::new(open_documents(&dir)?)
    };

    let context = Context {
        dir,
        store,
        clock: Arc::new(DefaultClock),
        date_style: args.date_style,
    };

    match args.commands {
        Commands::Project { command } => project::process_project_command(&context, command).await,
        Commands::Tag { command } => tag::process_tag_command(&context, command).await,
        Commands::Log { command } => logs::process_log_command(&context, command).await,
        Commands::Stats { all, json } => report::process_stats_command(&context, all, json).await,
        Commands::Watch { command } => watch::process_watch_command(&context, command).await,
        Commands::Account(_) | Commands::Compact {} => Ok(()),
    }
}

fn open_documents(dir: &Path) -> Result<DocumentStore> {
    let session = load_session(dir)?;
    DocumentStore::open(dir.join("documents"), session.map(|v| v.owner_id))
}

async fn compact(dir: &Path, local: bool) -> Result<()> {
    if local {
        println!("The local store has nothing to compact");
        return Ok(());
    }
    let store = open_documents(dir)?;
    store.compact().await.context("Failed to compact")?;
    println!("Compacted {:?}", store.dir());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        model::{NewProject, OwnerId},
        store::{
            documents::{DocumentStore, REINDEX_MARKER},
            StoreError,
        },
        utils::clock::MockClock,
    };

    use super::{Context, DateStyle};

    fn new_project() -> NewProject {
        NewProject {
            project_number: "2025001".into(),
            production_company: "Northlight".into(),
            name: "Harbour".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            is_paid: true,
            invoice_sent: Some(false),
        }
    }

    #[tokio::test]
    async fn test_mutation_waits_while_indexes_build() -> Result<()> {
        let dir = tempdir()?;
        let documents = dir.path().join("documents");
        let store = DocumentStore::open(documents.clone(), Some(OwnerId::new("crew")))?;
        let marker = documents.join(REINDEX_MARKER);
        std::fs::write(&marker, b"")?;

        let mut clock = MockClock::new();
        clock.expect_sleep().times(1).returning(move |_| {
            let _ = std::fs::remove_file(&marker);
        });
        let context = Context {
            dir: dir.path().to_path_buf(),
            store: Box::new(store),
            clock: Arc::new(clock),
            date_style: DateStyle::Uk,
        };

        let project = new_project();
        let added = context
            .mutate(|| context.store.add_project(project.clone()))
            .await?;
        assert_eq!(added.project_number, "2025001");
        assert_eq!(context.load().await?.projects, vec![added]);
        Ok(())
    }

    #[tokio::test]
    async fn test_mutation_fails_without_session() -> Result<()> {
        let dir = tempdir()?;
        let store = DocumentStore::open(dir.path().join("documents"), None)?;
        let mut clock = MockClock::new();
        clock.expect_sleep().never();
        let context = Context {
            dir: dir.path().to_path_buf(),
            store: Box::new(store),
            clock: Arc::new(clock),
            date_style: DateStyle::Uk,
        };

        let project = new_project();
        let result = context
            .mutate(|| context.store.add_project(project.clone()))
            .await;
        assert!(matches!(result, Err(StoreError::NotAuthenticated)));
        Ok(())
    }
}

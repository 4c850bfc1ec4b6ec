use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{state::StateContainer, store::SyncStatus};

use super::{report::StatisticsReport, Context};

#[derive(Args, Debug)]
pub struct WatchCommand {
    #[arg(
        short,
        long,
        default_value_t = 5,
        help = "Seconds between checks for changes made by other processes"
    )]
    interval: u64,
    #[arg(long, help = "Show every production company instead of the top ones")]
    all: bool,
}

async fn detect_shutdown(cancel: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => cancel.cancel(),
        _ = cancel.cancelled() => {},
    }
}

/// Reloads the store until cancelled so that changes made elsewhere reach the subscription.
async fn poll_store(context: &Context, interval: Duration, cancel: CancellationToken) {
    loop {
        select! {
            _ = cancel.cancelled() => break,
            _ = context.clock.sleep(interval) => {},
        }
        match context.store.refresh().await {
            Ok(_) => {}
            Err(e) if e.is_transient() => debug!("Store not ready yet: {e}"),
            Err(e) => warn!("Failed to refresh: {e}"),
        }
    }
}

pub fn render_status(status: &SyncStatus) -> Option<String> {
    match status {
        SyncStatus::Loading => Some("Loading...".into()),
        SyncStatus::IndexesBuilding => Some("Setting up the database...".into()),
        SyncStatus::Failed(e) => Some(format!("Failed to load data: {e}")),
        SyncStatus::Ready => None,
    }
}

pub async fn process_watch_command(context: &Context, command: WatchCommand) -> Result<()> {
    let cancel = CancellationToken::new();
    let interval = Duration::from_secs(command.interval.max(1));
    let snapshots = context.store.subscribe().await?;
    let mut container = StateContainer::new(context.clock.clone());

    let follow = async {
        container
            .follow(snapshots, cancel.clone(), |container| {
                let output = match render_status(container.status()) {
                    Some(status) => format!("{status}\n"),
                    None => StatisticsReport {
                        statistics: &container.statistics(),
                        all_companies: command.all,
                    }
                    .to_string(),
                };
                println!("\n{output}");
            })
            .await;
        cancel.cancel();
    };

    tokio::join!(
        follow,
        poll_store(context, interval, cancel.clone()),
        detect_shutdown(cancel.clone()),
    );
    Ok(())
}

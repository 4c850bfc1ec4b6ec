use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};
use clap::Subcommand;

use crate::{
    model::{AppState, DayLog, DayType, LogUpdate, NewLog},
    utils::time::date_to_record_name,
};

use super::{
    project::resolve_project,
    report::paint_tag,
    tag::resolve_tag,
    Context,
};

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    #[command(about = "Log a work day. At most 2 logs fit on one date")]
    Add {
        #[arg(
            short,
            long,
            help = "Day of work. Examples are \"today\", \"yesterday\", \"2025-03-15\", \"15/03/2025\". Defaults to today"
        )]
        date: Option<String>,
        #[arg(short, long, help = "Project id or number")]
        project: String,
        #[arg(short, long = "tag", help = "Tag id or name, can be repeated")]
        tags: Vec<String>,
        #[arg(short, long)]
        notes: Option<String>,
        #[arg(long, help = "Only half a day was worked")]
        half: bool,
    },
    #[command(about = "Change a log. The date of a log can't change")]
    Edit {
        id: String,
        #[arg(short, long, help = "Project id or number")]
        project: Option<String>,
        #[arg(short, long = "tag", help = "Replaces the tags of the log, can be repeated")]
        tags: Vec<String>,
        #[arg(long, help = "Remove every tag from the log", conflicts_with = "tags")]
        clear_tags: bool,
        #[arg(short, long, help = "Replaces the notes, an empty value removes them")]
        notes: Option<String>,
        #[arg(long, conflicts_with = "full")]
        half: bool,
        #[arg(long)]
        full: bool,
    },
    #[command(about = "Delete a log")]
    Delete { id: String },
    #[command(about = "List logs. Defaults to the current month")]
    List {
        #[arg(short, long)]
        from: Option<String>,
        #[arg(short, long)]
        to: Option<String>,
    },
}

fn day_type(half: bool) -> DayType {
    if half {
        DayType::Half
    } else {
        DayType::Full
    }
}

fn resolve_tags(state: &AppState, references: &[String]) -> Result<Vec<String>> {
    references
        .iter()
        .map(|v| resolve_tag(state, v).map(|tag| tag.id.clone()))
        .collect()
}

/// First and last day of the month containing `date`.
fn month_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = (first + Months::new(1)).pred_opt().unwrap_or(first);
    (first, last)
}

/// Logs between `from` and `to` inclusive, oldest first.
pub fn logs_between(state: &AppState, from: NaiveDate, to: NaiveDate) -> Vec<&DayLog> {
    let mut logs = state
        .logs
        .iter()
        .filter(|v| v.date >= from && v.date <= to)
        .collect::<Vec<_>>();
    logs.sort_by_key(|v| v.date);
    logs
}

pub async fn process_log_command(context: &Context, command: LogCommand) -> Result<()> {
    match command {
        LogCommand::Add {
            date,
            project,
            tags,
            notes,
            half,
        } => {
            let date = match date {
                Some(v) => context.parse_date(&v)?,
                None => context.clock.today(),
            };
            let state = context.load().await?;
            let project = resolve_project(&state, &project)?;
            let new_log = NewLog {
                date,
                project_id: project.id.clone(),
                tags: resolve_tags(&state, &tags)?,
                notes,
                day_type: day_type(half),
            };
            let log = context
                .mutate(|| context.store.add_log(new_log.clone()))
                .await?;
            println!(
                "Logged {} day on {} for {} ({})",
                log.day_type,
                date_to_record_name(log.date),
                project.label(),
                log.id
            );
        }
        LogCommand::Edit {
            id,
            project,
            tags,
            clear_tags,
            notes,
            half,
            full,
        } => {
            let state = context.load().await?;
            let project_id = project
                .map(|v| resolve_project(&state, &v).map(|v| v.id.clone()))
                .transpose()?;
            let tags = if clear_tags {
                Some(vec![])
            } else if tags.is_empty() {
                None
            } else {
                Some(resolve_tags(&state, &tags)?)
            };
            let day_type = (half || full).then(|| day_type(half));
            let update = LogUpdate {
                project_id,
                tags,
                notes: notes.map(|v| Some(v).filter(|v| !v.is_empty())),
                day_type,
            };
            let log = context
                .mutate(|| context.store.update_log(&id, update.clone()))
                .await?;
            println!("Updated log {} on {}", log.id, date_to_record_name(log.date));
        }
        LogCommand::Delete { id } => {
            context.mutate(|| context.store.delete_log(&id)).await?;
            println!("Deleted log {id}");
        }
        LogCommand::List { from, to } => {
            let (month_start, month_end) = month_of(context.clock.today());
            let from = from
                .map(|v| context.parse_date(&v))
                .transpose()?
                .unwrap_or(month_start);
            let to = to
                .map(|v| context.parse_date(&v))
                .transpose()?
                .unwrap_or(month_end);
            if from > to {
                return Err(anyhow!("Start of the range is after its end"));
            }

            let state = context.load().await?;
            for log in logs_between(&state, from, to) {
                let project = state
                    .project(&log.project_id)
                    .map(|v| v.label())
                    .unwrap_or_else(|| "unknown project".into());
                let tags = log
                    .tags
                    .iter()
                    .filter_map(|v| state.tag(v))
                    .map(paint_tag)
                    .collect::<Vec<_>>()
                    .join(" ");
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    date_to_record_name(log.date),
                    log.day_type,
                    project,
                    tags,
                    log.notes.as_deref().unwrap_or(""),
                    log.id
                );
            }
        }
    }
    Ok(())
}

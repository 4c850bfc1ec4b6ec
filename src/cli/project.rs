use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};
use clap::Subcommand;
use tracing::error;

use crate::{
    model::{defaults::next_project_number, AppState, NewProject, Project, ProjectUpdate},
    stats::project_summaries,
};

use super::{
    report::{format_days, paint_tag},
    Context,
};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(about = "Create a project. The number defaults to the next one in sequence")]
    Add {
        #[arg(short, long)]
        company: String,
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        number: Option<String>,
        #[arg(long, help = "Project isn't paid")]
        pro_bono: bool,
    },
    #[command(about = "List projects with days worked and tags used")]
    List {},
    #[command(about = "Change a project")]
    Edit {
        #[arg(help = "Project id or number")]
        project: String,
        #[arg(short, long)]
        company: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long, conflicts_with = "pro_bono")]
        paid: bool,
        #[arg(long)]
        pro_bono: bool,
    },
    #[command(about = "Toggle whether the invoice of a paid project was sent")]
    Invoice {
        #[arg(help = "Project id or number")]
        project: String,
    },
    #[command(about = "Delete a project together with all of its logs")]
    Delete {
        #[arg(help = "Project id or number")]
        project: String,
        #[arg(short, long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

/// Finds a project by id or by project number.
pub fn resolve_project<'a>(state: &'a AppState, reference: &str) -> Result<&'a Project> {
    state
        .projects
        .iter()
        .find(|v| v.id == reference || v.project_number == reference)
        .ok_or_else(|| anyhow!("No project {reference}"))
}

pub async fn process_project_command(context: &Context, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add {
            company,
            name,
            number,
            pro_bono,
        } => {
            let state = context.load().await?;
            let project_number = number.unwrap_or_else(|| next_project_number(&state.projects));
            let new_project = NewProject {
                project_number,
                production_company: company,
                name,
                created_at: context.clock.time(),
                is_paid: !pro_bono,
                invoice_sent: (!pro_bono).then_some(false),
            };
            let project = context
                .mutate(|| context.store.add_project(new_project.clone()))
                .await
                .inspect_err(|e| error!("Failed to add project: {e}"))?;
            println!("Added {}", project.label());
        }
        ProjectCommand::List {} => {
            let state = context.load().await?;
            for summary in project_summaries(&state) {
                let project = &summary.project;
                let kind = match (project.is_paid, project.invoice_sent()) {
                    (false, _) => "pro bono",
                    (true, true) => "invoice sent",
                    (true, false) => "invoice pending",
                };
                let tags = summary
                    .tags
                    .iter()
                    .filter_map(|v| state.tag(v))
                    .map(paint_tag)
                    .collect::<Vec<_>>()
                    .join(" ");
                println!(
                    "#{}\t{}\t{}\t{}\t{} days\t{}",
                    project.project_number,
                    project.production_company,
                    project.name,
                    kind,
                    format_days(summary.days),
                    tags
                );
            }
        }
        ProjectCommand::Edit {
            project,
            company,
            name,
            number,
            paid,
            pro_bono,
        } => {
            let state = context.load().await?;
            let project = resolve_project(&state, &project)?;
            let is_paid = if paid {
                Some(true)
            } else if pro_bono {
                Some(false)
            } else {
                None
            };
            let update = ProjectUpdate {
                project_number: number,
                production_company: company,
                name,
                is_paid,
                invoice_sent: None,
            };
            let updated = context
                .mutate(|| context.store.update_project(&project.id, update.clone()))
                .await?;
            println!("Updated {}", updated.label());
        }
        ProjectCommand::Invoice { project } => {
            let state = context.load().await?;
            let project = resolve_project(&state, &project)?;
            if !project.is_paid {
                return Err(anyhow!("{} is pro bono, there is no invoice", project.label()));
            }
            let update = ProjectUpdate {
                invoice_sent: Some(!project.invoice_sent()),
                ..Default::default()
            };
            let updated = context
                .mutate(|| context.store.update_project(&project.id, update.clone()))
                .await?;
            if updated.invoice_sent() {
                println!("Invoice sent for {}", updated.label());
            } else {
                println!("Invoice pending for {}", updated.label());
            }
        }
        ProjectCommand::Delete { project, yes } => {
            let state = context.load().await?;
            let project = resolve_project(&state, &project)?;
            let logs = state.logs_for_project(&project.id).count();
            let question = format!(
                "Delete {}? All {logs} associated logs will also be deleted.",
                project.label()
            );
            if !yes && !confirm(&question)? {
                println!("Nothing deleted");
                return Ok(());
            }
            context
                .mutate(|| context.store.delete_project(&project.id))
                .await
                .inspect_err(|e| error!("Failed to delete project: {e}"))?;
            println!("Deleted {} and {logs} logs", project.label());
        }
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

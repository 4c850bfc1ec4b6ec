use anyhow::{anyhow, Result};
use clap::Subcommand;

use crate::{
    model::{defaults::COLOR_PALETTE, AppState, NewTag, Tag},
    stats::tag_usage,
    store::rules::reorder_tags,
};

use super::{report::paint_tag, Context};

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    #[command(about = "Create a tag")]
    Add {
        name: String,
        #[arg(short, long, help = "Hex color like #dc2626. Defaults to the first palette color")]
        color: Option<String>,
    },
    #[command(about = "List tags in order, with the number of logs using them")]
    List {},
    #[command(about = "Rename or recolor a tag")]
    Rename {
        #[arg(help = "Tag id or name")]
        tag: String,
        name: String,
        #[arg(short, long)]
        color: Option<String>,
    },
    #[command(about = "Move a tag to another place in the order. Positions start at 1")]
    Move { from: usize, to: usize },
    #[command(about = "Delete a tag and remove it from every log")]
    Delete {
        #[arg(help = "Tag id or name")]
        tag: String,
    },
}

/// Finds a tag by id or by name, ignoring case of the name.
pub fn resolve_tag<'a>(state: &'a AppState, reference: &str) -> Result<&'a Tag> {
    state
        .tags
        .iter()
        .find(|v| v.id == reference)
        .or_else(|| {
            state
                .tags
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(reference))
        })
        .ok_or_else(|| anyhow!("No tag {reference}"))
}

fn check_color(color: &str) -> Result<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|v| v.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(anyhow!("{color} isn't a hex color like {}", COLOR_PALETTE[0]))
    }
}

pub async fn process_tag_command(context: &Context, command: TagCommand) -> Result<()> {
    match command {
        TagCommand::Add { name, color } => {
            let color = color.unwrap_or_else(|| COLOR_PALETTE[0].to_string());
            check_color(&color)?;
            let new_tag = NewTag { name, color };
            let tag = context
                .mutate(|| context.store.add_tag(new_tag.clone()))
                .await?;
            println!("Added {} ({})", paint_tag(&tag), tag.id);
        }
        TagCommand::List {} => {
            let state = context.load().await?;
            for (position, usage) in tag_usage(&state).iter().enumerate() {
                println!(
                    "{}\t{}\t{}\t{} logs",
                    position + 1,
                    paint_tag(&usage.tag),
                    usage.tag.color,
                    usage.count
                );
            }
        }
        TagCommand::Rename { tag, name, color } => {
            let state = context.load().await?;
            let id = resolve_tag(&state, &tag)?.id.clone();
            if let Some(color) = &color {
                check_color(color)?;
            }
            let mut tags = state.tags;
            if let Some(tag) = tags.iter_mut().find(|v| v.id == id) {
                tag.name = name;
                if let Some(color) = color {
                    tag.color = color;
                }
            }
            context.mutate(|| context.store.update_tags(&tags)).await?;
            println!("Updated tag {id}");
        }
        TagCommand::Move { from, to } => {
            let mut tags = context.load().await?.tags;
            if from == 0 || to == 0 {
                return Err(anyhow!("Positions start at 1"));
            }
            reorder_tags(&mut tags, from - 1, to - 1)?;
            context.mutate(|| context.store.update_tags(&tags)).await?;
            let order = tags.iter().map(paint_tag).collect::<Vec<_>>().join(" ");
            println!("{order}");
        }
        TagCommand::Delete { tag } => {
            let state = context.load().await?;
            let tag = resolve_tag(&state, &tag)?;
            let used_by = state.logs.iter().filter(|v| v.has_tag(&tag.id)).count();
            context.mutate(|| context.store.delete_tag(&tag.id)).await?;
            println!("Deleted {}, removed from {used_by} logs", tag.name);
        }
    }
    Ok(())
}

use std::fmt::{self, Display, Formatter};

use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::{
    model::Tag,
    stats::Statistics,
    utils::time::date_to_record_name,
};

use super::Context;

/// Companies shown unless every one of them is requested.
const DEFAULT_VISIBLE_COMPANIES: usize = 4;

pub async fn process_stats_command(context: &Context, all: bool, json: bool) -> Result<()> {
    let state = context.load().await?;
    let statistics = Statistics::compute(&state, context.clock.today());
    if json {
        println!("{}", serde_json::to_string_pretty(&statistics)?);
    } else {
        print!(
            "{}",
            StatisticsReport {
                statistics: &statistics,
                all_companies: all,
            }
        );
    }
    Ok(())
}

/// Tag name in the tag's own color.
pub fn paint_tag(tag: &Tag) -> String {
    match tag.rgb() {
        Some((r, g, b)) => Colour::RGB(r, g, b).paint(tag.name.as_str()).to_string(),
        None => tag.name.clone(),
    }
}

pub fn format_days(days: f64) -> String {
    format!("{days:.1}")
}

fn heading(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", Style::new().bold().paint(title))
}

/// Statistics as printed by `stats` and `watch`.
pub struct StatisticsReport<'a> {
    pub statistics: &'a Statistics,
    /// Shows every production company instead of the busiest ones.
    pub all_companies: bool,
}

impl Display for StatisticsReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let statistics = self.statistics;

        heading(f, "Overview")?;
        writeln!(f, "Days logged\t{}", statistics.total_logs)?;
        writeln!(f, "Active projects\t{}", statistics.total_projects)?;
        writeln!(
            f,
            "Most active\t{}",
            statistics
                .most_active_project
                .as_ref()
                .map(|v| v.name.as_str())
                .unwrap_or("No projects yet")
        )?;
        writeln!(f)?;

        heading(f, "This week")?;
        for day in &statistics.weekly_activity {
            writeln!(
                f,
                "{}\t{}\t{}",
                date_to_record_name(day.date),
                day.date.format("%a"),
                format_days(day.days)
            )?;
        }
        writeln!(f)?;

        heading(f, "Production companies")?;
        let visible = if self.all_companies {
            statistics.company_distribution.len()
        } else {
            DEFAULT_VISIBLE_COMPANIES
        };
        for company in statistics.company_distribution.iter().take(visible) {
            writeln!(f, "{}\t{}", format_days(company.days), company.name)?;
        }
        let hidden = statistics.company_distribution.len().saturating_sub(visible);
        if hidden > 0 {
            writeln!(f, "... {hidden} more, use --all to see them")?;
        }
        writeln!(f)?;

        heading(f, "Projects")?;
        for activity in &statistics.project_distribution {
            writeln!(
                f,
                "{}\t#{}\t{}",
                format_days(activity.days),
                activity.project.project_number,
                activity.project.name
            )?;
        }
        writeln!(f)?;

        heading(f, "Tags")?;
        for activity in &statistics.recent_tags {
            writeln!(f, "{}\t{}", format_days(activity.days), paint_tag(&activity.tag))?;
        }
        writeln!(f)?;

        let types = &statistics.project_type_stats;
        heading(f, "Project types")?;
        writeln!(
            f,
            "Paid\t{}\t({} invoiced, {} pending)",
            types.paid.total, types.paid.invoice_sent, types.paid.invoice_pending
        )?;
        writeln!(f, "Pro bono\t{}", types.pro_bono)?;
        match types.paid_ratio() {
            Some(ratio) => writeln!(f, "Paid ratio\t{ratio}"),
            None => writeln!(f, "Paid ratio\tn/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{AppState, DayType},
        stats::{
            tests::{date, log, project},
            Statistics,
        },
    };

    use super::StatisticsReport;

    fn render(statistics: &Statistics, all_companies: bool) -> String {
        StatisticsReport {
            statistics,
            all_companies,
        }
        .to_string()
    }

    /// Acme worked 5 days, Bravo 4 and so on down to Echo with 1.
    fn state() -> AppState {
        let companies = ["Acme", "Bravo", "Cine", "Delta", "Echo"];
        let mut logs = vec![];
        for (rank, company) in companies.iter().enumerate() {
            for day in 0..(companies.len() - rank) {
                let id = format!("{company}-{day}");
                logs.push(log(&id, company, date(1 + day as u32), DayType::Full, &[]));
            }
        }
        AppState {
            projects: companies
                .iter()
                .map(|v| project(v, v, true, None))
                .collect(),
            tags: vec![],
            logs,
        }
    }

    #[test]
    fn test_companies_are_collapsed() {
        let statistics = Statistics::compute(&state(), date(13));
        let collapsed = render(&statistics, false);
        assert!(collapsed.contains("5.0\tAcme\n"));
        assert!(collapsed.contains("2.0\tDelta\n"));
        assert!(!collapsed.contains("\tEcho\n"));
        assert!(collapsed.contains("... 1 more"));

        let expanded = render(&statistics, true);
        assert!(expanded.contains("1.0\tEcho\n"));
        assert!(!expanded.contains("more, use --all"));
    }

    #[test]
    fn test_empty_statistics() {
        let statistics = Statistics::compute(&AppState::default(), date(13));
        let rendered = render(&statistics, false);
        assert!(rendered.contains("Most active\tNo projects yet"));
        assert!(rendered.contains("Paid ratio\tn/a"));
    }
}

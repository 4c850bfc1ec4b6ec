//! Derived metrics over an [AppState]. Everything here is a pure function of the state and the
//! evaluation date, cheap enough to recompute on every change.
//!
//! Distributions are sorted by their metric, descending. The order of equal entries is
//! unspecified; the current implementation keeps the order of the input.

pub mod summary;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    model::{AppState, DayLog, Project, Tag},
    utils::{percentage::Percentage, time::week_days},
};

pub use summary::{project_summaries, tag_usage, ProjectSummary, TagUsage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectActivity {
    pub project: Project,
    /// Weighted day count.
    pub days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyActivity {
    pub name: String,
    pub days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagActivity {
    pub tag: Tag,
    pub days: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PaidProjects {
    pub total: usize,
    pub invoice_sent: usize,
    pub invoice_pending: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProjectTypeStats {
    pub paid: PaidProjects,
    pub pro_bono: usize,
}

impl ProjectTypeStats {
    /// Share of paid projects among all projects, `None` when there are no projects at all.
    pub fn paid_ratio(&self) -> Option<Percentage> {
        Percentage::of(
            self.paid.total as f64,
            (self.paid.total + self.pro_bono) as f64,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_logs: usize,
    /// Projects referenced by at least one log.
    pub total_projects: usize,
    pub project_distribution: Vec<ProjectActivity>,
    pub most_active_project: Option<Project>,
    pub company_distribution: Vec<CompanyActivity>,
    /// Monday to Sunday of the week containing the evaluation date.
    pub weekly_activity: Vec<DayActivity>,
    pub recent_tags: Vec<TagActivity>,
    pub project_type_stats: ProjectTypeStats,
    pub tag_usage: Vec<TagUsage>,
    pub project_summaries: Vec<ProjectSummary>,
}

impl Statistics {
    /// Computes statistics of `state` as seen on `today`. `today` only affects
    /// [Statistics::weekly_activity].
    pub fn compute(state: &AppState, today: NaiveDate) -> Self {
        let project_distribution = project_distribution(state);
        let most_active_project = project_distribution.first().map(|v| v.project.clone());

        Statistics {
            total_logs: state.logs.len(),
            total_projects: active_projects(state),
            most_active_project,
            company_distribution: company_distribution(state),
            weekly_activity: weekly_activity(&state.logs, today),
            recent_tags: tag_distribution(state),
            project_type_stats: project_type_stats(&state.projects),
            tag_usage: tag_usage(state),
            project_summaries: project_summaries(state),
            project_distribution,
        }
    }
}

/// Sum of 1.0 per full day and 0.5 per half day.
pub fn weighted_days<'a>(logs: impl IntoIterator<Item = &'a DayLog>) -> f64 {
    logs.into_iter().map(|v| v.day_type.weight()).sum()
}

fn sort_descending<T>(values: &mut [T], key: impl Fn(&T) -> f64) {
    values.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

fn active_projects(state: &AppState) -> usize {
    let referenced = state
        .logs
        .iter()
        .map(|v| v.project_id.as_str())
        .collect::<HashSet<_>>();
    state
        .projects
        .iter()
        .filter(|v| referenced.contains(v.id.as_str()))
        .count()
}

/// Weighted days of every project, including projects without logs.
fn project_distribution(state: &AppState) -> Vec<ProjectActivity> {
    let mut days_by_project = HashMap::<&str, f64>::new();
    for log in &state.logs {
        *days_by_project.entry(log.project_id.as_str()).or_default() += log.day_type.weight();
    }

    let mut distribution = state
        .projects
        .iter()
        .map(|project| ProjectActivity {
            days: days_by_project
                .get(project.id.as_str())
                .copied()
                .unwrap_or_default(),
            project: project.clone(),
        })
        .collect::<Vec<_>>();
    sort_descending(&mut distribution, |v| v.days);
    distribution
}

/// Weighted days grouped by production company name. Logs pointing at unknown projects are
/// skipped, companies without logs don't appear.
fn company_distribution(state: &AppState) -> Vec<CompanyActivity> {
    let projects = state
        .projects
        .iter()
        .map(|v| (v.id.as_str(), v))
        .collect::<HashMap<_, _>>();

    // Index into `distribution`, so that equal values keep the order of first appearance.
    let mut index = HashMap::<&str, usize>::new();
    let mut distribution = Vec::<CompanyActivity>::new();

    for log in &state.logs {
        let Some(project) = projects.get(log.project_id.as_str()) else {
            continue;
        };
        let company = project.production_company.as_str();
        let position = *index.entry(company).or_insert_with(|| {
            distribution.push(CompanyActivity {
                name: company.to_string(),
                days: 0.,
            });
            distribution.len() - 1
        });
        distribution[position].days += log.day_type.weight();
    }

    sort_descending(&mut distribution, |v| v.days);
    distribution
}

fn weekly_activity(logs: &[DayLog], today: NaiveDate) -> Vec<DayActivity> {
    week_days(today)
        .into_iter()
        .map(|date| DayActivity {
            date,
            days: weighted_days(logs.iter().filter(|v| v.date == date)),
        })
        .collect()
}

/// Weighted days of every tag.
fn tag_distribution(state: &AppState) -> Vec<TagActivity> {
    let mut days_by_tag = HashMap::<&str, f64>::new();
    for log in &state.logs {
        for tag in &log.tags {
            *days_by_tag.entry(tag.as_str()).or_default() += log.day_type.weight();
        }
    }

    let mut distribution = state
        .tags
        .iter()
        .map(|tag| TagActivity {
            days: days_by_tag.get(tag.id.as_str()).copied().unwrap_or_default(),
            tag: tag.clone(),
        })
        .collect::<Vec<_>>();
    sort_descending(&mut distribution, |v| v.days);
    distribution
}

fn project_type_stats(projects: &[Project]) -> ProjectTypeStats {
    projects
        .iter()
        .fold(ProjectTypeStats::default(), |mut stats, project| {
            if project.is_paid {
                stats.paid.total += 1;
                if project.invoice_sent() {
                    stats.paid.invoice_sent += 1;
                } else {
                    stats.paid.invoice_pending += 1;
                }
            } else {
                stats.pro_bono += 1;
            }
            stats
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::model::{AppState, DayLog, DayType, OwnerId, Project, Tag};

    use super::Statistics;

    pub fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    pub fn project(id: &str, company: &str, is_paid: bool, invoice_sent: Option<bool>) -> Project {
        Project {
            id: id.into(),
            owner_id: OwnerId::local(),
            project_number: "2025001".into(),
            production_company: company.into(),
            name: format!("{id} film"),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            is_paid,
            invoice_sent,
        }
    }

    pub fn tag(id: &str) -> Tag {
        Tag {
            id: id.into(),
            owner_id: OwnerId::local(),
            name: id.to_uppercase(),
            color: "#dc2626".into(),
            position: 0,
        }
    }

    pub fn log(id: &str, project: &str, date: NaiveDate, day_type: DayType, tags: &[&str]) -> DayLog {
        DayLog {
            id: id.into(),
            owner_id: OwnerId::local(),
            date,
            project_id: project.into(),
            tags: tags.iter().map(|v| v.to_string()).collect(),
            notes: None,
            day_type,
        }
    }

    /// Thursday, 2025-03-13.
    const TODAY: u32 = 13;

    fn mixed_state() -> AppState {
        AppState {
            projects: vec![
                project("a", "Acme", true, Some(true)),
                project("b", "Northern Films", true, None),
                project("c", "Acme", false, None),
                project("d", "Idle Pictures", true, Some(false)),
            ],
            tags: vec![tag("dp"), tag("vfx"), tag("misc")],
            logs: vec![
                log("1", "a", date(10), DayType::Full, &["dp"]),
                log("2", "a", date(10), DayType::Half, &["dp", "vfx"]),
                log("3", "b", date(12), DayType::Full, &["vfx"]),
                log("4", "c", date(16), DayType::Half, &[]),
                log("5", "b", date(17), DayType::Full, &["dp"]),
                log("6", "missing", date(11), DayType::Full, &["dp"]),
            ],
        }
    }

    #[test]
    fn test_single_project_weighting() {
        let state = AppState {
            projects: vec![project("p", "Acme", true, None)],
            tags: vec![],
            logs: vec![
                log("1", "p", date(3), DayType::Full, &[]),
                log("2", "p", date(4), DayType::Half, &[]),
            ],
        };
        let stats = Statistics::compute(&state, date(TODAY));

        assert_eq!(stats.project_distribution.len(), 1);
        assert_eq!(stats.project_distribution[0].project.id, "p");
        assert_eq!(stats.project_distribution[0].days, 1.5);
        assert_eq!(stats.project_type_stats.paid.total, 1);
        assert_eq!(stats.project_type_stats.paid.invoice_sent, 0);
        assert_eq!(stats.project_type_stats.paid.invoice_pending, 1);
        assert_eq!(stats.project_type_stats.pro_bono, 0);
    }

    #[test]
    fn test_companies_merge_by_name() {
        let state = AppState {
            projects: vec![
                project("a", "Acme", true, None),
                project("b", "Acme", false, None),
            ],
            tags: vec![],
            logs: vec![
                log("1", "a", date(3), DayType::Full, &[]),
                log("2", "b", date(4), DayType::Full, &[]),
            ],
        };
        let stats = Statistics::compute(&state, date(TODAY));
        assert_eq!(stats.company_distribution.len(), 1);
        assert_eq!(stats.company_distribution[0].name, "Acme");
        assert_eq!(stats.company_distribution[0].days, 2.0);
    }

    #[test]
    fn test_mixed_state() {
        let state = mixed_state();
        let stats = Statistics::compute(&state, date(TODAY));

        assert_eq!(stats.total_logs, state.logs.len());
        assert_eq!(stats.total_projects, 3);

        let projects = stats
            .project_distribution
            .iter()
            .map(|v| (v.project.id.as_str(), v.days))
            .collect::<Vec<_>>();
        assert_eq!(projects, [("b", 2.0), ("a", 1.5), ("c", 0.5), ("d", 0.0)]);
        assert_eq!(stats.most_active_project.map(|v| v.id), Some("b".to_string()));

        let companies = stats
            .company_distribution
            .iter()
            .map(|v| (v.name.as_str(), v.days))
            .collect::<Vec<_>>();
        assert_eq!(companies, [("Acme", 2.0), ("Northern Films", 2.0)]);

        let tags = stats
            .recent_tags
            .iter()
            .map(|v| (v.tag.id.as_str(), v.days))
            .collect::<Vec<_>>();
        assert_eq!(tags, [("dp", 3.5), ("vfx", 1.5), ("misc", 0.0)]);

        assert_eq!(stats.project_type_stats.paid.total, 3);
        assert_eq!(stats.project_type_stats.paid.invoice_sent, 1);
        assert_eq!(stats.project_type_stats.paid.invoice_pending, 2);
        assert_eq!(stats.project_type_stats.pro_bono, 1);
        assert_eq!(
            stats.project_type_stats.paid_ratio().map(|v| *v),
            Some(75.)
        );
    }

    #[test]
    fn test_weekly_activity() {
        let stats = Statistics::compute(&mixed_state(), date(TODAY));
        let week = stats
            .weekly_activity
            .iter()
            .map(|v| (v.date, v.days))
            .collect::<Vec<_>>();
        assert_eq!(
            week,
            [
                (date(10), 1.5),
                (date(11), 1.0),
                (date(12), 1.0),
                (date(13), 0.0),
                (date(14), 0.0),
                (date(15), 0.0),
                (date(16), 0.5),
            ]
        );

        // The following Monday starts a new week.
        let stats = Statistics::compute(&mixed_state(), date(17));
        assert_eq!(stats.weekly_activity[0], super::DayActivity { date: date(17), days: 1.0 });
        assert_eq!(stats.weekly_activity.len(), 7);
    }

    #[test]
    fn test_distribution_totals_match() {
        let stats = Statistics::compute(&mixed_state(), date(TODAY));
        let projects: f64 = stats.project_distribution.iter().map(|v| v.days).sum();
        let companies: f64 = stats.company_distribution.iter().map(|v| v.days).sum();
        assert_eq!(projects, companies);
    }

    #[test]
    fn test_empty_state() {
        let stats = Statistics::compute(&AppState::default(), date(TODAY));
        assert_eq!(stats.total_logs, 0);
        assert_eq!(stats.total_projects, 0);
        assert!(stats.most_active_project.is_none());
        assert!(stats.company_distribution.is_empty());
        assert_eq!(stats.weekly_activity.len(), 7);
        assert_eq!(stats.project_type_stats.paid_ratio(), None);
    }

    #[test]
    fn test_recompute_is_identical() {
        let state = mixed_state();
        assert_eq!(
            Statistics::compute(&state, date(TODAY)),
            Statistics::compute(&state, date(TODAY))
        );
    }
}

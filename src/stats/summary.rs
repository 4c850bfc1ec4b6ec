use serde::Serialize;

use crate::model::{AppState, Project, Tag};

use super::weighted_days;

/// How many logs carry a tag, not weighted by day type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagUsage {
    pub tag: Tag,
    pub count: usize,
}

/// Overview of a single project as shown in project listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub days: f64,
    /// Ids of the tags used by the project's logs, in order of first use.
    pub tags: Vec<String>,
}

/// Usage of every tag, in the user defined tag order.
pub fn tag_usage(state: &AppState) -> Vec<TagUsage> {
    state
        .tags
        .iter()
        .map(|tag| TagUsage {
            count: state.logs.iter().filter(|v| v.has_tag(&tag.id)).count(),
            tag: tag.clone(),
        })
        .collect()
}

/// Summary of every project, in the order of [AppState::projects].
pub fn project_summaries(state: &AppState) -> Vec<ProjectSummary> {
    state
        .projects
        .iter()
        .map(|project| {
            let mut tags = Vec::<String>::new();
            for tag in state.logs_for_project(&project.id).flat_map(|v| &v.tags) {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
            ProjectSummary {
                days: weighted_days(state.logs_for_project(&project.id)),
                project: project.clone(),
                tags,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{AppState, DayType},
        stats::tests::{date, log, project, tag},
    };

    use super::{project_summaries, tag_usage};

    fn state() -> AppState {
        AppState {
            projects: vec![project("a", "Acme", true, None), project("b", "Acme", true, None)],
            tags: vec![tag("dp"), tag("vfx"), tag("misc")],
            logs: vec![
                log("1", "a", date(3), DayType::Half, &["vfx", "dp"]),
                log("2", "a", date(4), DayType::Half, &["dp"]),
                log("3", "a", date(5), DayType::Full, &["vfx"]),
            ],
        }
    }

    #[test]
    fn test_tag_usage_counts_logs() {
        let usage = tag_usage(&state())
            .into_iter()
            .map(|v| (v.tag.id, v.count))
            .collect::<Vec<_>>();
        assert_eq!(
            usage,
            [("dp".to_string(), 2), ("vfx".to_string(), 2), ("misc".to_string(), 0)]
        );
    }

    #[test]
    fn test_project_summaries() {
        let summaries = project_summaries(&state());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].days, 2.0);
        assert_eq!(summaries[0].tags, ["vfx", "dp"]);
        assert_eq!(summaries[1].days, 0.0);
        assert!(summaries[1].tags.is_empty());
    }
}

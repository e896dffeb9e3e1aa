//! Team productivity, restricted to the team's member set.

use serde::Serialize;
use tracing::debug;

use atrium_core::RecordId;
use atrium_core::model::issue::Issue;

use crate::project::average_completion_days;
use crate::source::{IssueSource, TeamSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProductivity {
    pub team_id: RecordId,
    pub name: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub average_completion_days: f64,
}

/// Productivity of one team over every task assigned to any of its
/// members. `None` when the team id is unknown (or soft-deleted).
#[must_use]
pub fn team_productivity(
    teams: &impl TeamSource,
    issues: &impl IssueSource,
    team_id: &RecordId,
) -> Option<TeamProductivity> {
    let team = teams.team(team_id)?;
    let tasks: Vec<&Issue> = issues
        .all_issues()
        .into_iter()
        .filter(|t| {
            t.assignee_id
                .as_deref()
                .is_some_and(|user| team.membership_of(user).is_some())
        })
        .collect();
    let completed_tasks = tasks.iter().filter(|t| t.status.is_done()).count();
    debug!(team = %team_id, tasks = tasks.len(), "team productivity derived");
    Some(TeamProductivity {
        team_id: team.id.clone(),
        name: team.name.clone(),
        total_tasks: tasks.len(),
        completed_tasks,
        average_completion_days: average_completion_days(&tasks),
    })
}

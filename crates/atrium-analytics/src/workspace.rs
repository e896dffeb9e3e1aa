//! Workspace-level rollups across projects and teams.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use atrium_core::RecordId;
use atrium_core::model::issue::Issue;
use atrium_core::model::project::ProjectStatus;

use crate::project::{MemberWorkload, is_overdue, percentage};
use crate::source::{IssueSource, ProjectSource, TeamSource};

/// One project's slice of the workspace rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectBreakdown {
    pub project_id: RecordId,
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub completion_rate: f64,
}

/// Tasks attributable to one team: the union of tasks assigned to any of
/// its members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTaskCount {
    pub team_id: RecordId,
    pub name: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceAnalytics {
    pub workspace_id: RecordId,
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_rate: f64,
    pub projects: Vec<ProjectBreakdown>,
    pub member_distribution: Vec<MemberWorkload>,
    pub team_tasks: Vec<TeamTaskCount>,
}

/// Roll up every project of a workspace into one view.
#[must_use]
pub fn workspace_analytics(
    projects: &impl ProjectSource,
    issues: &impl IssueSource,
    teams: &impl TeamSource,
    workspace_id: &RecordId,
    now: DateTime<Utc>,
) -> WorkspaceAnalytics {
    let workspace_projects = projects.projects_for_workspace(workspace_id);
    let mut breakdowns = Vec::with_capacity(workspace_projects.len());
    let mut all_tasks: Vec<&Issue> = Vec::new();

    for project in &workspace_projects {
        let tasks = issues.issues_for_project(&project.id);
        let completed = tasks.iter().filter(|t| t.status.is_done()).count();
        breakdowns.push(ProjectBreakdown {
            project_id: project.id.clone(),
            name: project.name.clone(),
            total: tasks.len(),
            completed,
            overdue: tasks.iter().filter(|t| is_overdue(t, now)).count(),
            completion_rate: percentage(completed, tasks.len()),
        });
        all_tasks.extend(tasks);
    }

    let total_tasks = all_tasks.len();
    let completed_tasks = all_tasks.iter().filter(|t| t.status.is_done()).count();
    debug!(
        workspace = %workspace_id,
        projects = workspace_projects.len(),
        tasks = total_tasks,
        "workspace analytics derived"
    );

    WorkspaceAnalytics {
        workspace_id: workspace_id.clone(),
        total_projects: workspace_projects.len(),
        active_projects: workspace_projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        total_tasks,
        completed_tasks,
        overdue_tasks: breakdowns.iter().map(|b| b.overdue).sum(),
        completion_rate: percentage(completed_tasks, total_tasks),
        projects: breakdowns,
        member_distribution: member_distribution(&all_tasks),
        team_tasks: team_tasks(teams, &all_tasks),
    }
}

/// Cross-project workload by assignee.
fn member_distribution(tasks: &[&Issue]) -> Vec<MemberWorkload> {
    let total = tasks.len();
    let mut entries: Vec<MemberWorkload> = Vec::new();
    for task in tasks {
        let Some(user_id) = task.assignee_id.as_deref() else {
            continue;
        };
        match entries.iter_mut().find(|e| e.user_id == user_id) {
            Some(entry) => {
                entry.total += 1;
                if task.status.is_done() {
                    entry.completed += 1;
                }
            }
            None => entries.push(MemberWorkload {
                user_id: user_id.to_string(),
                total: 1,
                completed: usize::from(task.status.is_done()),
                percentage: 0.0,
            }),
        }
    }
    for entry in &mut entries {
        entry.percentage = percentage(entry.total, total);
    }
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.user_id.cmp(&b.user_id)));
    entries
}

fn team_tasks(teams: &impl TeamSource, tasks: &[&Issue]) -> Vec<TeamTaskCount> {
    teams
        .teams()
        .into_iter()
        .map(|team| {
            let owned: Vec<&&Issue> = tasks
                .iter()
                .filter(|t| {
                    t.assignee_id
                        .as_deref()
                        .is_some_and(|user| team.membership_of(user).is_some())
                })
                .collect();
            TeamTaskCount {
                team_id: team.id.clone(),
                name: team.name.clone(),
                total: owned.len(),
                completed: owned.iter().filter(|t| t.status.is_done()).count(),
            }
        })
        .collect()
}

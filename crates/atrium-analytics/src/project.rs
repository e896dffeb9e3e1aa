//! Per-project analytics: task metrics, workload, distributions, velocity.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use atrium_core::RecordId;
use atrium_core::model::issue::{Issue, StatusGroup};

use crate::source::{IssueSource, MemberSource};

/// Counts of a project's tasks by metric bucket, plus the completion rate
/// as a percentage (0 for an empty project, never NaN).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TaskMetrics {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub overdue: usize,
    pub completion_rate: f64,
}

/// One assignee's share of a project's tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberWorkload {
    pub user_id: String,
    pub total: usize,
    pub completed: usize,
    pub percentage: f64,
}

/// One key of a distribution table (status, priority, or type).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub key: String,
    pub count: usize,
    pub percentage: f64,
}

/// The full derived view of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAnalytics {
    pub project_id: RecordId,
    pub metrics: TaskMetrics,
    pub workload: Vec<MemberWorkload>,
    pub by_status: Vec<DistributionEntry>,
    pub by_priority: Vec<DistributionEntry>,
    pub by_type: Vec<DistributionEntry>,
    pub average_completion_days: f64,
    pub sprint_velocity: u32,
    pub recent_completed: usize,
}

/// Derive the full analytics view of one project.
///
/// Pure read-time computation: evaluation time and the productivity window
/// are explicit inputs, and nothing is cached or written back.
#[must_use]
pub fn project_analytics(
    issues: &impl IssueSource,
    members: &impl MemberSource,
    project_id: &RecordId,
    now: DateTime<Utc>,
    productivity_window_days: u32,
) -> ProjectAnalytics {
    let tasks = issues.issues_for_project(project_id);
    let metrics = task_metrics(&tasks, now);
    let window_start = now - Duration::days(i64::from(productivity_window_days));
    let recent_completed = tasks
        .iter()
        .filter(|t| t.status.is_done() && t.updated_at >= window_start && t.updated_at <= now)
        .count();
    debug!(project = %project_id, total = metrics.total, "project analytics derived");

    // Assignments without any task still surface with zero counts.
    let roster: Vec<String> = members
        .members_for_project(project_id)
        .iter()
        .map(|m| m.user_id.clone())
        .collect();

    ProjectAnalytics {
        project_id: project_id.clone(),
        metrics,
        workload: workload(&tasks, &roster),
        by_status: distribution(&tasks, |t| t.status.to_string()),
        by_priority: distribution(&tasks, |t| t.priority.to_string()),
        by_type: distribution(&tasks, |t| t.issue_type.to_string()),
        average_completion_days: average_completion_days(&tasks),
        sprint_velocity: sprint_velocity(&tasks),
        recent_completed,
    }
}

/// Done tasks of the project whose `updated_at` falls in `[start, end]`,
/// bounds inclusive.
#[must_use]
pub fn tasks_completed_in_period<'a>(
    issues: &'a impl IssueSource,
    project_id: &RecordId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a Issue> {
    issues
        .issues_for_project(project_id)
        .into_iter()
        .filter(|t| t.status.is_done() && t.updated_at >= start && t.updated_at <= end)
        .collect()
}

/// Mean completion time, in days, over the project's done tasks, rounded
/// to one decimal. Zero when nothing is done.
#[must_use]
pub fn average_task_completion_time(issues: &impl IssueSource, project_id: &RecordId) -> f64 {
    average_completion_days(&issues.issues_for_project(project_id))
}

fn task_metrics(tasks: &[&Issue], now: DateTime<Utc>) -> TaskMetrics {
    let mut metrics = TaskMetrics {
        total: tasks.len(),
        ..TaskMetrics::default()
    };
    for task in tasks {
        match task.status.group() {
            StatusGroup::Completed => metrics.completed += 1,
            StatusGroup::InProgress => metrics.in_progress += 1,
            StatusGroup::Pending => metrics.pending += 1,
        }
        if is_overdue(task, now) {
            metrics.overdue += 1;
        }
    }
    metrics.completion_rate = percentage(metrics.completed, metrics.total);
    metrics
}

/// Overdue: a due date in the past on a task that never reached a terminal
/// done status.
pub(crate) fn is_overdue(task: &Issue, now: DateTime<Utc>) -> bool {
    task.due_date.is_some_and(|due| due < now) && !task.status.is_done()
}

fn workload(tasks: &[&Issue], roster: &[String]) -> Vec<MemberWorkload> {
    let total = tasks.len();
    let mut entries: Vec<MemberWorkload> = Vec::new();
    let count_for = |user_id: &str| {
        let assigned: Vec<&&Issue> = tasks
            .iter()
            .filter(|t| t.assignee_id.as_deref() == Some(user_id))
            .collect();
        MemberWorkload {
            user_id: user_id.to_string(),
            total: assigned.len(),
            completed: assigned.iter().filter(|t| t.status.is_done()).count(),
            percentage: percentage(assigned.len(), total),
        }
    };
    for user_id in roster {
        entries.push(count_for(user_id));
    }
    // Assignees outside the formal roster still count.
    for task in tasks {
        if let Some(user_id) = task.assignee_id.as_deref() {
            if !entries.iter().any(|e| e.user_id == user_id) {
                entries.push(count_for(user_id));
            }
        }
    }
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.user_id.cmp(&b.user_id)));
    entries
}

/// Distribution table over an arbitrary key, in first-seen order. Counts
/// always sum to the task total since every task yields exactly one key.
fn distribution(tasks: &[&Issue], key_of: impl Fn(&Issue) -> String) -> Vec<DistributionEntry> {
    let total = tasks.len();
    let mut entries: Vec<DistributionEntry> = Vec::new();
    for task in tasks {
        let key = key_of(task);
        match entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.count += 1,
            None => entries.push(DistributionEntry {
                key,
                count: 1,
                percentage: 0.0,
            }),
        }
    }
    for entry in &mut entries {
        entry.percentage = percentage(entry.count, total);
    }
    entries
}

pub(crate) fn average_completion_days(tasks: &[&Issue]) -> f64 {
    let done: Vec<&&Issue> = tasks.iter().filter(|t| t.status.is_done()).collect();
    if done.is_empty() {
        return 0.0;
    }
    let total_ms: i64 = done
        .iter()
        .map(|t| (t.updated_at - t.created_at).num_milliseconds())
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let mean_days = total_ms as f64 / done.len() as f64 / 86_400_000.0;
    round1(mean_days)
}

pub(crate) fn sprint_velocity(tasks: &[&Issue]) -> u32 {
    tasks
        .iter()
        .filter(|t| t.status.is_done() && t.sprint_id.is_some())
        .filter_map(|t| t.story_points)
        .sum()
}

/// `part` of `whole` as a percentage rounded to one decimal; 0 when the
/// whole is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let raw = part as f64 / whole as f64 * 100.0;
    round1(raw)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

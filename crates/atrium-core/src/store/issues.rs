//! Issue store: CRUD with field-level change history, workflow-checked
//! status transitions, and board reordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activity::{Activity, ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::issue::{
    FieldChange, Issue, IssuePatch, IssueStatus, IssueType, NewIssue,
};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Issue {
    const ENTITY: &'static str = "issue";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn log_mut(&mut self) -> &mut ActivityLog {
        &mut self.activities
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueStore {
    inner: Collection<Issue>,
}

impl IssueStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create an issue. The field-level history is seeded with the initial
    /// status entry (`from = None`), anchoring the transition chain.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the title is empty.
    pub fn add(&mut self, new: NewIssue, actor: &str) -> StoreResult<&Issue> {
        if new.title.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "issue title",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Issue {
            id,
            project_id: new.project_id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            issue_type: new.issue_type,
            assignee_id: new.assignee_id,
            sprint_id: new.sprint_id,
            epic_id: new.epic_id,
            parent_id: new.parent_id,
            story_points: new.story_points,
            due_date: new.due_date,
            column_order: new.column_order,
            created_at: now,
            updated_at: now,
            deleted: false,
            history: vec![FieldChange {
                field: "status".to_string(),
                from: None,
                to: Some(new.status.to_string()),
                changed_by: actor.to_string(),
                at: now,
            }],
            activities: ActivityLog::default(),
        }))
    }

    /// Merge a partial patch. Every touched field lands in the field-level
    /// history with its prior and new value; one "updated" activity is
    /// appended on top.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update(
        &mut self,
        id: &RecordId,
        patch: IssuePatch,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let touched = patch.touched_fields();
        let now = self.inner.tick();
        let issue = self.inner.at_mut(idx);

        let log_change = |history: &mut Vec<FieldChange>,
                              field: &str,
                              from: Option<String>,
                              to: Option<String>| {
            history.push(FieldChange {
                field: field.to_string(),
                from,
                to,
                changed_by: actor.to_string(),
                at: now,
            });
        };

        if let Some(title) = patch.title {
            log_change(
                &mut issue.history,
                "title",
                Some(issue.title.clone()),
                Some(title.clone()),
            );
            issue.title = title;
        }
        if let Some(description) = patch.description {
            log_change(
                &mut issue.history,
                "description",
                issue.description.clone(),
                Some(description.clone()),
            );
            issue.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            log_change(
                &mut issue.history,
                "priority",
                Some(issue.priority.to_string()),
                Some(priority.to_string()),
            );
            issue.priority = priority;
        }
        if let Some(issue_type) = patch.issue_type {
            log_change(
                &mut issue.history,
                "issue_type",
                Some(issue.issue_type.to_string()),
                Some(issue_type.to_string()),
            );
            issue.issue_type = issue_type;
        }
        if let Some(assignee_id) = patch.assignee_id {
            log_change(
                &mut issue.history,
                "assignee_id",
                issue.assignee_id.clone(),
                Some(assignee_id.clone()),
            );
            issue.assignee_id = Some(assignee_id);
        }
        if let Some(sprint_id) = patch.sprint_id {
            log_change(
                &mut issue.history,
                "sprint_id",
                issue.sprint_id.as_ref().map(ToString::to_string),
                Some(sprint_id.to_string()),
            );
            issue.sprint_id = Some(sprint_id);
        }
        if let Some(epic_id) = patch.epic_id {
            log_change(
                &mut issue.history,
                "epic_id",
                issue.epic_id.as_ref().map(ToString::to_string),
                Some(epic_id.to_string()),
            );
            issue.epic_id = Some(epic_id);
        }
        if let Some(story_points) = patch.story_points {
            log_change(
                &mut issue.history,
                "story_points",
                issue.story_points.map(|p| p.to_string()),
                Some(story_points.to_string()),
            );
            issue.story_points = Some(story_points);
        }
        if let Some(due_date) = patch.due_date {
            log_change(
                &mut issue.history,
                "due_date",
                issue.due_date.map(|d| d.to_rfc3339()),
                Some(due_date.to_rfc3339()),
            );
            issue.due_date = Some(due_date);
        }

        issue.touch(now);
        let description = if touched.is_empty() {
            "issue updated".to_string()
        } else {
            format!("issue updated: {}", touched.join(", "))
        };
        issue.activities.push(Activity {
            kind: ActivityKind::Updated,
            actor: actor.to_string(),
            description,
            at: now,
        });
        Ok(Applied::Changed)
    }

    /// Unchecked status transition: appends the history entry (prior and
    /// new value) and a "status_change" activity.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update_status(
        &mut self,
        id: &RecordId,
        to: IssueStatus,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let now = self.inner.tick();
        let issue = self.inner.at_mut(idx);
        let from = issue.status;
        Self::apply_transition(issue, from, to, None, actor, now);
        Ok(Applied::Changed)
    }

    /// Move an issue to a new status and board position atomically,
    /// guarded by a caller-supplied workflow predicate.
    ///
    /// # Errors
    ///
    /// [`StoreError::WorkflowViolation`] with the predicate's reason when
    /// the move is rejected; the issue's status, board position, history,
    /// and activities are left completely unchanged.
    pub fn reorder(
        &mut self,
        id: &RecordId,
        to: IssueStatus,
        to_position: u32,
        actor: &str,
        can_transition: impl Fn(IssueStatus, IssueStatus) -> Result<(), String>,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let from = self.inner.at(idx).status;
        if let Err(reason) = can_transition(from, to) {
            debug!(id = %id, from = %from, to = %to, "reorder rejected");
            return Err(StoreError::WorkflowViolation {
                from: from.to_string(),
                to: to.to_string(),
                reason,
            });
        }
        let now = self.inner.tick();
        let issue = self.inner.at_mut(idx);
        issue.column_order = to_position;
        Self::apply_transition(issue, from, to, Some(to_position), actor, now);
        Ok(Applied::Changed)
    }

    fn apply_transition(
        issue: &mut Issue,
        from: IssueStatus,
        to: IssueStatus,
        position: Option<u32>,
        actor: &str,
        now: DateTime<Utc>,
    ) {
        issue.status = to;
        issue.history.push(FieldChange {
            field: "status".to_string(),
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            changed_by: actor.to_string(),
            at: now,
        });
        issue.touch(now);
        let description = position.map_or_else(
            || format!("Status changed from {} to {}", from.label(), to.label()),
            |pos| {
                format!(
                    "Status changed from {} to {} (position {pos})",
                    from.label(),
                    to.label()
                )
            },
        );
        issue.activities.push(Activity {
            kind: ActivityKind::StatusChange,
            actor: actor.to_string(),
            description,
            at: now,
        });
    }

    /// Hard-remove a subtask from its parent. The only physical removal in
    /// the suite: subtasks are ephemeral children with no audit trail of
    /// their own; the parent's activity trail records the drop.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the target is not a subtask of the
    /// given parent; `NotFound` per store mode when either id is missing.
    pub fn remove_subtask(
        &mut self,
        parent_id: &RecordId,
        subtask_id: &RecordId,
        actor: &str,
    ) -> StoreResult<Applied> {
        if self.inner.locate(parent_id)?.is_none() {
            return Ok(Applied::Skipped);
        }
        let Some(subtask_idx) = self.inner.locate(subtask_id)? else {
            return Ok(Applied::Skipped);
        };
        let subtask = self.inner.at(subtask_idx);
        if subtask.issue_type != IssueType::Subtask
            || subtask.parent_id.as_ref() != Some(parent_id)
        {
            return Err(StoreError::Validation {
                field: "subtask",
                reason: format!("'{subtask_id}' is not a subtask of '{parent_id}'"),
            });
        }
        let title = subtask.title.clone();
        self.inner.remove_physical(subtask_idx);
        self.inner.add_activity(
            parent_id,
            ActivityKind::Note,
            actor,
            format!("subtask '{title}' removed"),
        )
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn delete(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        self.inner.soft_delete(id, actor)
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn restore(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        self.inner.restore(id, actor)
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn add_activity(
        &mut self,
        id: &RecordId,
        kind: ActivityKind,
        actor: &str,
        description: impl Into<String>,
    ) -> StoreResult<Applied> {
        self.inner.add_activity(id, kind, actor, description.into())
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Issue> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Issue] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Issue> {
        self.inner.iter_active()
    }

    /// Active issues of one project, in insertion order.
    pub fn by_project<'a>(
        &'a self,
        project_id: &RecordId,
    ) -> impl Iterator<Item = &'a Issue> {
        self.inner
            .iter_active()
            .filter(move |issue| &issue.project_id == project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockHandle, ManualClock};
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> IssueStore {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        IssueStore::new(
            StoreMode::Strict,
            ClockHandle::new(ManualClock::starting_at(start, Duration::seconds(30))),
        )
    }

    fn project() -> RecordId {
        RecordId::new_unchecked("proj-1")
    }

    #[test]
    fn add_seeds_history_anchor() {
        let mut issues = store();
        let issue = issues
            .add(NewIssue::new(project(), "Fix login"), "dev1")
            .unwrap();
        assert_eq!(issue.history().len(), 1);
        assert!(issue.history()[0].from.is_none());
        assert_eq!(issue.history()[0].to.as_deref(), Some("todo"));
    }

    #[test]
    fn update_logs_field_level_changes() {
        let mut issues = store();
        let id = issues
            .add(NewIssue::new(project(), "Fix login"), "dev1")
            .unwrap()
            .id
            .clone();

        let patch = IssuePatch {
            assignee_id: Some("dev2".into()),
            story_points: Some(5),
            ..IssuePatch::default()
        };
        issues.update(&id, patch, "dev1").unwrap();

        let issue = issues.get(&id).unwrap();
        assert_eq!(issue.history().len(), 3); // status anchor + 2 field changes
        let points = issue
            .history()
            .iter()
            .find(|c| c.field == "story_points")
            .unwrap();
        assert_eq!(points.from, None);
        assert_eq!(points.to.as_deref(), Some("5"));
        assert_eq!(issue.activities.len(), 2);
    }

    #[test]
    fn transitions_chain_contiguously() {
        let mut issues = store();
        let id = issues
            .add(NewIssue::new(project(), "Fix login"), "dev1")
            .unwrap()
            .id
            .clone();

        issues
            .update_status(&id, IssueStatus::InProgress, "dev1")
            .unwrap();
        issues.update_status(&id, IssueStatus::Done, "dev1").unwrap();

        let issue = issues.get(&id).unwrap();
        let status_changes: Vec<_> = issue
            .history()
            .iter()
            .filter(|c| c.field == "status")
            .collect();
        assert_eq!(status_changes.len(), 3);
        for pair in status_changes.windows(2) {
            assert_eq!(pair[1].from, pair[0].to);
        }
    }

    #[test]
    fn rejected_reorder_changes_nothing() {
        let mut issues = store();
        let id = issues
            .add(NewIssue::new(project(), "Fix login"), "dev1")
            .unwrap()
            .id
            .clone();
        let before = issues.get(&id).unwrap().clone();

        let err = issues
            .reorder(&id, IssueStatus::Done, 4, "dev1", |_, _| {
                Err("must pass review first".to_string())
            })
            .unwrap_err();

        match err {
            StoreError::WorkflowViolation { reason, .. } => {
                assert!(!reason.is_empty());
            }
            other => panic!("expected workflow violation, got {other:?}"),
        }
        assert_eq!(issues.get(&id).unwrap(), &before);
    }

    #[test]
    fn accepted_reorder_applies_status_and_position() {
        let mut issues = store();
        let id = issues
            .add(NewIssue::new(project(), "Fix login"), "dev1")
            .unwrap()
            .id
            .clone();

        issues
            .reorder(&id, IssueStatus::InProgress, 2, "dev1", |_, _| Ok(()))
            .unwrap();

        let issue = issues.get(&id).unwrap();
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert_eq!(issue.column_order, 2);
        assert_eq!(issue.history().len(), 2);
    }

    #[test]
    fn remove_subtask_is_physical_and_logged_on_parent() {
        let mut issues = store();
        let parent_id = issues
            .add(NewIssue::new(project(), "Epic work"), "dev1")
            .unwrap()
            .id
            .clone();
        let mut new_subtask = NewIssue::new(project(), "Small step");
        new_subtask.issue_type = IssueType::Subtask;
        new_subtask.parent_id = Some(parent_id.clone());
        let subtask_id = issues.add(new_subtask, "dev1").unwrap().id.clone();

        issues
            .remove_subtask(&parent_id, &subtask_id, "dev1")
            .unwrap();

        assert!(issues.get(&subtask_id).is_none());
        let parent = issues.get(&parent_id).unwrap();
        assert!(
            parent
                .activities
                .last()
                .unwrap()
                .description
                .contains("Small step")
        );
    }

    #[test]
    fn remove_subtask_rejects_non_children() {
        let mut issues = store();
        let a = issues
            .add(NewIssue::new(project(), "A"), "dev1")
            .unwrap()
            .id
            .clone();
        let b = issues
            .add(NewIssue::new(project(), "B"), "dev1")
            .unwrap()
            .id
            .clone();
        assert!(matches!(
            issues.remove_subtask(&a, &b, "dev1"),
            Err(StoreError::Validation { .. })
        ));
    }
}

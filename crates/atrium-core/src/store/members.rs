//! Project membership store: one record per user-project assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::member::{NewProjectMember, PermissionBundle, ProjectMember, ProjectRole};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for ProjectMember {
    const ENTITY: &'static str = "project member";

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
pub struct ProjectMemberStore {
    inner: Collection<ProjectMember>,
}

impl ProjectMemberStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Assign a user to a project.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the user already holds an active
    /// assignment to the same project.
    pub fn add(&mut self, new: NewProjectMember, actor: &str) -> StoreResult<&ProjectMember> {
        if new.user_id.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "user id",
                reason: "must not be empty".to_string(),
            });
        }
        if self
            .assignment_of(&new.project_id, &new.user_id)
            .is_some()
        {
            return Err(StoreError::Validation {
                field: "project member",
                reason: format!(
                    "'{}' is already assigned to project '{}'",
                    new.user_id, new.project_id
                ),
            });
        }
        Ok(self.inner.admit(actor, |id, now| ProjectMember {
            id,
            project_id: new.project_id,
            user_id: new.user_id,
            role: new.role,
            overrides: None,
            created_at: now,
            updated_at: now,
            deleted: false,
            activities: ActivityLog::default(),
        }))
    }

    /// Change the member's declared role. Overrides, when present, keep
    /// winning over the new role's defaults.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn set_role(
        &mut self,
        id: &RecordId,
        role: ProjectRole,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let from = self.inner.at(idx).role;
        if from == role {
            return Ok(Applied::Skipped);
        }
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("role changed from {from} to {role}"),
            |member| member.role = role,
        )
    }

    /// Set (or clear, with `None`) the explicit permission override.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn set_override(
        &mut self,
        id: &RecordId,
        overrides: Option<PermissionBundle>,
        actor: &str,
    ) -> StoreResult<Applied> {
        let description = if overrides.is_some() {
            "permission override set".to_string()
        } else {
            "permission override cleared".to_string()
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |member| {
                member.overrides = overrides;
            })
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
    pub fn get(&self, id: &RecordId) -> Option<&ProjectMember> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[ProjectMember] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &ProjectMember> {
        self.inner.iter_active()
    }

    /// Active assignments of one project.
    pub fn by_project<'a>(
        &'a self,
        project_id: &RecordId,
    ) -> impl Iterator<Item = &'a ProjectMember> {
        self.inner
            .iter_active()
            .filter(move |m| &m.project_id == project_id)
    }

    /// The user's active assignment to a project, if any. Soft-deleted
    /// assignments do not count.
    #[must_use]
    pub fn assignment_of(&self, project_id: &RecordId, user_id: &str) -> Option<&ProjectMember> {
        self.inner
            .iter_active()
            .find(|m| &m.project_id == project_id && m.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockHandle, ManualClock};
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> ProjectMemberStore {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        ProjectMemberStore::new(
            StoreMode::Strict,
            ClockHandle::new(ManualClock::starting_at(start, Duration::seconds(1))),
        )
    }

    fn project() -> RecordId {
        RecordId::new_unchecked("proj-1")
    }

    #[test]
    fn add_rejects_duplicate_assignment() {
        let mut members = store();
        members
            .add(NewProjectMember::new(project(), "u1", ProjectRole::Member), "pm")
            .unwrap();
        let err = members
            .add(NewProjectMember::new(project(), "u1", ProjectRole::Viewer), "pm")
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn deleted_assignment_can_be_replaced() {
        let mut members = store();
        let id = members
            .add(NewProjectMember::new(project(), "u1", ProjectRole::Member), "pm")
            .unwrap()
            .id
            .clone();
        members.delete(&id, "pm").unwrap();

        // The old record is soft-deleted, so a fresh assignment is allowed.
        members
            .add(NewProjectMember::new(project(), "u1", ProjectRole::Viewer), "pm")
            .unwrap();
        assert_eq!(
            members.assignment_of(&project(), "u1").unwrap().role,
            ProjectRole::Viewer
        );
        assert_eq!(members.list().len(), 2);
    }

    #[test]
    fn set_role_skips_no_op() {
        let mut members = store();
        let id = members
            .add(NewProjectMember::new(project(), "u1", ProjectRole::Member), "pm")
            .unwrap()
            .id
            .clone();
        assert_eq!(
            members.set_role(&id, ProjectRole::Member, "pm").unwrap(),
            Applied::Skipped
        );
        assert!(members.set_role(&id, ProjectRole::Admin, "pm").unwrap().changed());
        assert_eq!(members.get(&id).unwrap().role, ProjectRole::Admin);
    }

    #[test]
    fn override_survives_role_change() {
        let mut members = store();
        let id = members
            .add(NewProjectMember::new(project(), "u1", ProjectRole::Viewer), "pm")
            .unwrap()
            .id
            .clone();
        members
            .set_override(&id, Some(PermissionBundle::all()), "pm")
            .unwrap();
        members.set_role(&id, ProjectRole::Member, "pm").unwrap();
        assert_eq!(
            members.get(&id).unwrap().overrides,
            Some(PermissionBundle::all())
        );
    }
}

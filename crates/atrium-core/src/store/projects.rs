//! Project store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::project::{NewProject, Project, ProjectPatch};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Project {
    const ENTITY: &'static str = "project";

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
pub struct ProjectStore {
    inner: Collection<Project>,
}

impl ProjectStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a project, active by default.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name is empty.
    pub fn add(&mut self, new: NewProject, actor: &str) -> StoreResult<&Project> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "project name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Project {
            id,
            workspace_id: new.workspace_id,
            name: new.name,
            description: new.description,
            status: new.status,
            created_at: now,
            updated_at: now,
            deleted: false,
            activities: ActivityLog::default(),
        }))
    }

    /// Merge a partial patch and append one "updated" activity naming the
    /// touched fields.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update(
        &mut self,
        id: &RecordId,
        patch: ProjectPatch,
        actor: &str,
    ) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "project updated".to_string()
        } else {
            format!("project updated: {}", touched.join(", "))
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |project| {
                if let Some(name) = patch.name {
                    project.name = name;
                }
                if let Some(description) = patch.description {
                    project.description = Some(description);
                }
                if let Some(status) = patch.status {
                    project.status = status;
                }
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
    pub fn get(&self, id: &RecordId) -> Option<&Project> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Project] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Project> {
        self.inner.iter_active()
    }

    /// Active projects in one workspace, in insertion order.
    pub fn by_workspace<'a>(
        &'a self,
        workspace_id: &RecordId,
    ) -> impl Iterator<Item = &'a Project> {
        self.inner
            .iter_active()
            .filter(move |p| &p.workspace_id == workspace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockHandle, ManualClock};
    use crate::model::project::ProjectStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> ProjectStore {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        ProjectStore::new(
            StoreMode::Strict,
            ClockHandle::new(ManualClock::starting_at(start, Duration::seconds(1))),
        )
    }

    fn workspace() -> RecordId {
        RecordId::new_unchecked("ws-1")
    }

    #[test]
    fn add_defaults_to_active() {
        let mut projects = store();
        let project = projects
            .add(NewProject::new(workspace(), "Website"), "pm")
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.activities.len(), 1);
    }

    #[test]
    fn by_workspace_excludes_deleted_and_foreign() {
        let mut projects = store();
        let ws = workspace();
        let kept = projects
            .add(NewProject::new(ws.clone(), "Kept"), "pm")
            .unwrap()
            .id
            .clone();
        let dropped = projects
            .add(NewProject::new(ws.clone(), "Dropped"), "pm")
            .unwrap()
            .id
            .clone();
        projects
            .add(NewProject::new(RecordId::new_unchecked("ws-2"), "Other"), "pm")
            .unwrap();
        projects.delete(&dropped, "pm").unwrap();

        let names: Vec<_> = projects.by_workspace(&ws).map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Kept"]);
        assert!(projects.get(&kept).is_some());
    }

    #[test]
    fn status_patch_is_logged() {
        let mut projects = store();
        let id = projects
            .add(NewProject::new(workspace(), "Website"), "pm")
            .unwrap()
            .id
            .clone();
        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        projects.update(&id, patch, "pm").unwrap();
        let project = projects.get(&id).unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert!(
            project
                .activities
                .last()
                .unwrap()
                .description
                .contains("status")
        );
    }
}

//! Lead store: CRUD plus the stage-transition operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::lead::{Lead, LeadPatch, LeadStatus, NewLead, StageEntry};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Lead {
    const ENTITY: &'static str = "lead";

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
pub struct LeadStore {
    inner: Collection<Lead>,
}

impl LeadStore {
    #[must_use]
    pub fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a lead. Seeds the activity trail with one "created" entry
    /// and the stage history with its initial entry (`from = None`).
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name or email is empty.
    pub fn add(&mut self, new: NewLead, actor: &str) -> StoreResult<&Lead> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "lead name",
                reason: "must not be empty".to_string(),
            });
        }
        if new.email.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "lead email",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Lead {
            id,
            name: new.name,
            email: new.email,
            company: new.company,
            status: new.status,
            value: new.value,
            source: new.source,
            assigned_to: new.assigned_to,
            created_at: now,
            updated_at: now,
            deleted: false,
            stage_history: vec![StageEntry {
                from: None,
                to: new.status,
                changed_by: actor.to_string(),
                at: now,
                notes: None,
            }],
            activities: ActivityLog::default(),
        }))
    }

    /// Merge a partial patch and append one "updated" activity naming the
    /// touched fields.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update(&mut self, id: &RecordId, patch: LeadPatch, actor: &str) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "lead updated".to_string()
        } else {
            format!("lead updated: {}", touched.join(", "))
        };
        self.inner.mutate(id, actor, ActivityKind::Updated, description, |lead| {
            if let Some(name) = patch.name {
                lead.name = name;
            }
            if let Some(email) = patch.email {
                lead.email = email;
            }
            if let Some(company) = patch.company {
                lead.company = Some(company);
            }
            if let Some(value) = patch.value {
                lead.value = value;
            }
            if let Some(source) = patch.source {
                lead.source = Some(source);
            }
            if let Some(assigned_to) = patch.assigned_to {
                lead.assigned_to = Some(assigned_to);
            }
        })
    }

    /// Move the lead to a new pipeline stage. Appends a stage-history
    /// entry (carrying the prior status) plus a "status_change" activity.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update_status(
        &mut self,
        id: &RecordId,
        to: LeadStatus,
        changed_by: &str,
        notes: Option<String>,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let now = self.inner.tick();
        let lead = self.inner.at_mut(idx);
        let from = lead.status;
        lead.status = to;
        lead.stage_history.push(StageEntry {
            from: Some(from),
            to,
            changed_by: changed_by.to_string(),
            at: now,
            notes,
        });
        lead.touch(now);
        lead.activities.push(Activity {
            kind: ActivityKind::StatusChange,
            actor: changed_by.to_string(),
            description: format!("Status changed from {} to {}", from.label(), to.label()),
            at: now,
        });
        Ok(Applied::Changed)
    }

    /// Soft delete; the record stays reachable by [`Self::get`].
    ///
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

    /// Lookup by id; does not distinguish deleted from active.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Lead> {
        self.inner.get(id)
    }

    /// Every record, deleted included.
    #[must_use]
    pub fn list(&self) -> &[Lead] {
        self.inner.records()
    }

    /// Non-deleted records only.
    pub fn list_active(&self) -> impl Iterator<Item = &Lead> {
        self.inner.iter_active()
    }
}

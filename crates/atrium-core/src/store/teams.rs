//! Team store: membership lives inline on the team record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::member::{NewTeam, PermissionBundle, Team, TeamMembership, TeamRole};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Team {
    const ENTITY: &'static str = "team";

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
pub struct TeamStore {
    inner: Collection<Team>,
}

impl TeamStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a team with no members.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name is empty.
    pub fn add(&mut self, new: NewTeam, actor: &str) -> StoreResult<&Team> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "team name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Team {
            id,
            name: new.name,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted: false,
            activities: ActivityLog::default(),
        }))
    }

    /// Add a member with the given role and no overrides.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the user is already a member.
    pub fn add_member(
        &mut self,
        id: &RecordId,
        user_id: &str,
        role: TeamRole,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if self.inner.at(idx).membership_of(user_id).is_some() {
            return Err(StoreError::Validation {
                field: "team member",
                reason: format!("'{user_id}' is already a member"),
            });
        }
        // One stamp: added_at equals the team's updated_at for this mutation.
        let now = self.inner.tick();
        let team = self.inner.at_mut(idx);
        team.members.push(TeamMembership {
            user_id: user_id.to_string(),
            role,
            overrides: None,
            added_at: now,
        });
        team.touch(now);
        team.activities.push(Activity {
            kind: ActivityKind::Updated,
            actor: actor.to_string(),
            description: format!("member '{user_id}' added as {role}"),
            at: now,
        });
        Ok(Applied::Changed)
    }

    /// Drop a member. Hard removal: the membership record disappears, only
    /// the team's activity trail keeps the trace.
    ///
    /// # Errors
    ///
    /// [`StoreError::MemberNotFound`] when the user is not a member.
    pub fn remove_member(
        &mut self,
        id: &RecordId,
        user_id: &str,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if self.inner.at(idx).membership_of(user_id).is_none() {
            return Err(StoreError::MemberNotFound {
                container: "team",
                container_id: id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("member '{user_id}' removed"),
            |team| team.members.retain(|m| m.user_id != user_id),
        )
    }

    /// Set (or clear, with `None`) a member's explicit permission override.
    ///
    /// # Errors
    ///
    /// [`StoreError::MemberNotFound`] when the user is not a member.
    pub fn set_member_override(
        &mut self,
        id: &RecordId,
        user_id: &str,
        overrides: Option<PermissionBundle>,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if self.inner.at(idx).membership_of(user_id).is_none() {
            return Err(StoreError::MemberNotFound {
                container: "team",
                container_id: id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        let description = if overrides.is_some() {
            format!("permission override set for '{user_id}'")
        } else {
            format!("permission override cleared for '{user_id}'")
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |team| {
                if let Some(member) = team.members.iter_mut().find(|m| m.user_id == user_id) {
                    member.overrides = overrides;
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
    pub fn get(&self, id: &RecordId) -> Option<&Team> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Team] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Team> {
        self.inner.iter_active()
    }
}

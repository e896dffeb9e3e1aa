//! Role store: module-permission mutations and member assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::role::{
    ActionKind, FieldAccess, Module, ModulePermission, NewRole, Role, RolePatch, Scope,
};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Role {
    const ENTITY: &'static str = "role";

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
pub struct RoleStore {
    inner: Collection<Role>,
}

impl RoleStore {
    #[must_use]
    pub fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a role with one seeded (all-denied) permission entry per
    /// known module.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name is empty.
    pub fn add(&mut self, new: NewRole, actor: &str) -> StoreResult<&Role> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "role name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Role {
            id,
            name: new.name,
            role_type: new.role_type,
            permissions: Module::ALL.iter().copied().map(ModulePermission::seeded).collect(),
            assigned_to: Vec::new(),
            approval_authority_level: new.approval_authority_level,
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
    pub fn update(&mut self, id: &RecordId, patch: RolePatch, actor: &str) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "role updated".to_string()
        } else {
            format!("role updated: {}", touched.join(", "))
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |role| {
                if let Some(name) = patch.name {
                    role.name = name;
                }
                if let Some(level) = patch.approval_authority_level {
                    role.approval_authority_level = level;
                }
            })
    }

    /// Toggle one action on one module's entry. Sibling modules are never
    /// touched; the seeded array guarantees the entry exists.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn set_action(
        &mut self,
        id: &RecordId,
        module: Module,
        action: ActionKind,
        value: bool,
        actor: &str,
    ) -> StoreResult<Applied> {
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("permission {module}.{action} set to {value}"),
            |role| {
                if let Some(entry) = role.permissions.iter_mut().find(|p| p.module == module) {
                    entry.actions.set(action, value);
                }
            },
        )
    }

    /// Set the data scope of one module's entry.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn set_scope(
        &mut self,
        id: &RecordId,
        module: Module,
        scope: Scope,
        actor: &str,
    ) -> StoreResult<Applied> {
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("scope for {module} set to {scope}"),
            |role| {
                if let Some(entry) = role.permissions.iter_mut().find(|p| p.module == module) {
                    entry.scope = scope;
                }
            },
        )
    }

    /// Set a per-field visibility override on one module's entry.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn set_field_access(
        &mut self,
        id: &RecordId,
        module: Module,
        field: impl Into<String>,
        access: FieldAccess,
        actor: &str,
    ) -> StoreResult<Applied> {
        let field = field.into();
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("field access for {module}.{field} updated"),
            |role| {
                if let Some(entry) = role.permissions.iter_mut().find(|p| p.module == module) {
                    entry.field_access.insert(field, access);
                }
            },
        )
    }

    /// Record that a member holds this role. Re-assigning is a skip.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn assign_member(
        &mut self,
        id: &RecordId,
        user_id: &str,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if self.inner.at(idx).assigned_to.iter().any(|u| u == user_id) {
            return Ok(Applied::Skipped);
        }
        let user = user_id.to_string();
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("member '{user_id}' assigned"),
            |role| role.assigned_to.push(user),
        )
    }

    /// Drop a member from this role. Unassigning a non-holder is a skip.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn unassign_member(
        &mut self,
        id: &RecordId,
        user_id: &str,
        actor: &str,
    ) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if !self.inner.at(idx).assigned_to.iter().any(|u| u == user_id) {
            return Ok(Applied::Skipped);
        }
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("member '{user_id}' unassigned"),
            |role| role.assigned_to.retain(|u| u != user_id),
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
    pub fn get(&self, id: &RecordId) -> Option<&Role> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Role] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Role> {
        self.inner.iter_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockHandle, ManualClock};
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> RoleStore {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        RoleStore::new(
            StoreMode::Strict,
            ClockHandle::new(ManualClock::starting_at(start, Duration::seconds(1))),
        )
    }

    #[test]
    fn add_seeds_every_module() {
        let mut roles = store();
        let role = roles.add(NewRole::custom("Accountant"), "admin").unwrap();
        assert_eq!(role.permissions().len(), Module::ALL.len());
        for module in Module::ALL {
            let entry = role.permission_for(module).unwrap();
            assert!(!entry.actions.view);
            assert_eq!(entry.scope, Scope::Own);
        }
    }

    #[test]
    fn set_action_leaves_siblings_untouched() {
        let mut roles = store();
        let id = roles
            .add(NewRole::custom("Accountant"), "admin")
            .unwrap()
            .id
            .clone();

        roles
            .set_action(&id, Module::Invoices, ActionKind::Approve, true, "admin")
            .unwrap();

        let role = roles.get(&id).unwrap();
        assert!(role.permission_for(Module::Invoices).unwrap().actions.approve);
        for module in Module::ALL.iter().filter(|m| **m != Module::Invoices) {
            let entry = role.permission_for(*module).unwrap();
            assert_eq!(entry, &ModulePermission::seeded(*module));
        }
    }

    #[test]
    fn scope_and_field_access_target_one_module() {
        let mut roles = store();
        let id = roles
            .add(NewRole::custom("Accountant"), "admin")
            .unwrap()
            .id
            .clone();

        roles
            .set_scope(&id, Module::Reports, Scope::Organization, "admin")
            .unwrap();
        roles
            .set_field_access(&id, Module::Invoices, "total", FieldAccess::Read, "admin")
            .unwrap();

        let role = roles.get(&id).unwrap();
        assert_eq!(
            role.permission_for(Module::Reports).unwrap().scope,
            Scope::Organization
        );
        assert_eq!(
            role.permission_for(Module::Invoices)
                .unwrap()
                .field_access
                .get("total"),
            Some(&FieldAccess::Read)
        );
        assert!(role.permission_for(Module::Leads).unwrap().field_access.is_empty());
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut roles = store();
        let id = roles
            .add(NewRole::custom("Accountant"), "admin")
            .unwrap()
            .id
            .clone();

        assert!(roles.assign_member(&id, "u1", "admin").unwrap().changed());
        assert_eq!(
            roles.assign_member(&id, "u1", "admin").unwrap(),
            Applied::Skipped
        );
        assert_eq!(roles.get(&id).unwrap().assigned_to(), &["u1".to_string()]);

        assert!(roles.unassign_member(&id, "u1", "admin").unwrap().changed());
        assert_eq!(
            roles.unassign_member(&id, "u1", "admin").unwrap(),
            Applied::Skipped
        );
        assert!(roles.get(&id).unwrap().assigned_to().is_empty());
    }
}

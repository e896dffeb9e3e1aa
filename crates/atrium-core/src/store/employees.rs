//! Employee store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::employee::{Employee, EmployeePatch, NewEmployee};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Employee {
    const ENTITY: &'static str = "employee";

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
pub struct EmployeeStore {
    inner: Collection<Employee>,
}

impl EmployeeStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create an employee.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name or email is empty.
    pub fn add(&mut self, new: NewEmployee, actor: &str) -> StoreResult<&Employee> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "employee name",
                reason: "must not be empty".to_string(),
            });
        }
        if new.email.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "employee email",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Employee {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            position: new.position,
            department: new.department,
            notes: new.notes,
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
        patch: EmployeePatch,
        actor: &str,
    ) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "employee updated".to_string()
        } else {
            format!("employee updated: {}", touched.join(", "))
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |employee| {
                if let Some(name) = patch.name {
                    employee.name = name;
                }
                if let Some(email) = patch.email {
                    employee.email = email;
                }
                if let Some(phone) = patch.phone {
                    employee.phone = Some(phone);
                }
                if let Some(position) = patch.position {
                    employee.position = Some(position);
                }
                if let Some(department) = patch.department {
                    employee.department = Some(department);
                }
                if let Some(notes) = patch.notes {
                    employee.notes = Some(notes);
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
    pub fn get(&self, id: &RecordId) -> Option<&Employee> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Employee] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Employee> {
        self.inner.iter_active()
    }

    /// Active employees of one department, in insertion order.
    pub fn by_department<'a>(&'a self, department: &'a str) -> impl Iterator<Item = &'a Employee> {
        self.inner
            .iter_active()
            .filter(move |e| e.department.as_deref() == Some(department))
    }
}

//! Firm store: the issuing parties whose snapshots invoices embed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::firm::{Firm, FirmPatch, NewFirm};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Firm {
    const ENTITY: &'static str = "firm";

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
pub struct FirmStore {
    inner: Collection<Firm>,
}

impl FirmStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a firm.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name is empty.
    pub fn add(&mut self, new: NewFirm, actor: &str) -> StoreResult<&Firm> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "firm name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Firm {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            tax_id: new.tax_id,
            created_at: now,
            updated_at: now,
            deleted: false,
            activities: ActivityLog::default(),
        }))
    }

    /// Merge a partial patch. Invoices issued earlier keep their embedded
    /// snapshot of the prior values.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update(&mut self, id: &RecordId, patch: FirmPatch, actor: &str) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "firm updated".to_string()
        } else {
            format!("firm updated: {}", touched.join(", "))
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |firm| {
                if let Some(name) = patch.name {
                    firm.name = name;
                }
                if let Some(email) = patch.email {
                    firm.email = Some(email);
                }
                if let Some(phone) = patch.phone {
                    firm.phone = Some(phone);
                }
                if let Some(address) = patch.address {
                    firm.address = Some(address);
                }
                if let Some(tax_id) = patch.tax_id {
                    firm.tax_id = Some(tax_id);
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
    pub fn get(&self, id: &RecordId) -> Option<&Firm> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Firm] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Firm> {
        self.inner.iter_active()
    }
}

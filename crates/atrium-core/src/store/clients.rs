//! Client store, including ingestion of legacy-shaped records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::client::{Client, ClientPatch, NewClient, RawClient};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Client {
    const ENTITY: &'static str = "client";

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
pub struct ClientStore {
    inner: Collection<Client>,
}

impl ClientStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a client.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name is empty.
    pub fn add(&mut self, new: NewClient, actor: &str) -> StoreResult<&Client> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "client name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| Self::build(id, now, new)))
    }

    /// Normalize and admit a legacy-shaped record. A carried id is
    /// preserved (ingestion must not re-key existing data); otherwise a
    /// fresh one is assigned.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the raw record has no usable name
    /// or its id is already present.
    pub fn ingest(&mut self, raw: RawClient, actor: &str) -> StoreResult<&Client> {
        let (carried, fields) = raw.normalize()?;
        match carried {
            Some(id) => {
                if self.inner.get(&id).is_some() {
                    return Err(StoreError::Validation {
                        field: "client id",
                        reason: format!("'{id}' already ingested"),
                    });
                }
                Ok(self
                    .inner
                    .admit_with_id(actor, id, |id, now| Self::build(id, now, fields)))
            }
            None => Ok(self.inner.admit(actor, |id, now| Self::build(id, now, fields))),
        }
    }

    fn build(id: RecordId, now: DateTime<Utc>, new: NewClient) -> Client {
        Client {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            deleted: false,
            activities: ActivityLog::default(),
        }
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
        patch: ClientPatch,
        actor: &str,
    ) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "client updated".to_string()
        } else {
            format!("client updated: {}", touched.join(", "))
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |client| {
                if let Some(name) = patch.name {
                    client.name = name;
                }
                if let Some(email) = patch.email {
                    client.email = Some(email);
                }
                if let Some(phone) = patch.phone {
                    client.phone = Some(phone);
                }
                if let Some(company) = patch.company {
                    client.company = Some(company);
                }
                if let Some(notes) = patch.notes {
                    client.notes = Some(notes);
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
    pub fn get(&self, id: &RecordId) -> Option<&Client> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Client] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Client> {
        self.inner.iter_active()
    }
}

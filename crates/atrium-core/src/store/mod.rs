//! Entity stores.
//!
//! Each store holds the canonical in-memory collection for one entity type
//! and exposes CRUD, soft-delete/restore, activity append, and (where the
//! entity has workflow state) transition operations. All operations are
//! synchronous, single-threaded, and atomic per call: a mutator either
//! applies fully or returns an error with the record untouched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::activity::{Activity, ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{ParseEnumError, StoreError, StoreResult};
use crate::id::RecordId;

pub mod clients;
pub mod employees;
pub mod firms;
pub mod invoices;
pub mod issues;
pub mod leads;
pub mod members;
pub mod projects;
pub mod roles;
pub mod teams;

/// How mutators treat a missing id.
///
/// The original behavior was a silent no-op; that is preserved as
/// `Lenient`. `Strict` (the default) surfaces the miss as
/// [`StoreError::NotFound`] — silent no-ops are a common source of
/// "my edit didn't save" defects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    #[default]
    Strict,
    Lenient,
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        })
    }
}

impl FromStr for StoreMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            _ => Err(ParseEnumError {
                expected: "store mode",
                got: s.to_string(),
            }),
        }
    }
}

/// Outcome of a mutator: whether it changed anything. `Skipped` arises in
/// lenient mode (missing id) and for idempotent no-ops such as deleting an
/// already-deleted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Applied {
    Changed,
    Skipped,
}

impl Applied {
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Shared shape of every stored entity: identity, stamps, soft-delete
/// flag, and the activity trail the collection appends to.
pub trait Record {
    /// Human-facing entity name used in errors, logs, and descriptions.
    const ENTITY: &'static str;

    fn id(&self) -> &RecordId;
    fn touch(&mut self, at: DateTime<Utc>);
    fn is_deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);
    fn log_mut(&mut self) -> &mut ActivityLog;
}

/// Generic collection core shared by all stores.
///
/// Mutation is whole-record in place on the calling thread; `&mut self`
/// receivers make concurrent writers unrepresentable. Timestamps run
/// through a monotonic tick so `updated_at` strictly increases across
/// consecutive mutations even within one wall-clock millisecond.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub(crate) struct Collection<T> {
    records: Vec<T>,
    last_stamp: Option<DateTime<Utc>>,
    #[serde(skip)]
    mode: StoreMode,
    #[serde(skip)]
    clock: ClockHandle,
}

impl<T: Record> Collection<T> {
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            records: Vec::new(),
            last_stamp: None,
            mode,
            clock,
        }
    }

    /// Re-apply runtime settings after snapshot hydration (the clock and
    /// mode are not persisted).
    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.mode = mode;
        self.clock = clock;
    }

    /// Next stamp: the clock's now, nudged forward when it would not
    /// strictly exceed the previous stamp.
    pub(crate) fn tick(&mut self) -> DateTime<Utc> {
        let mut now = self.clock.now();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + Duration::milliseconds(1);
            }
        }
        self.last_stamp = Some(now);
        now
    }

    /// Admit a freshly built record: assigns the id and creation stamp,
    /// seeds exactly one "created" activity, and stores it.
    pub(crate) fn admit(
        &mut self,
        actor: &str,
        build: impl FnOnce(RecordId, DateTime<Utc>) -> T,
    ) -> &T {
        let now = self.tick();
        let mut record = build(RecordId::fresh(), now);
        record.log_mut().push(Activity {
            kind: ActivityKind::Created,
            actor: actor.to_string(),
            description: format!("{} created", T::ENTITY),
            at: now,
        });
        debug!(entity = T::ENTITY, id = %record.id(), "record created");
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Variant of [`Self::admit`] for ingestion paths that carry an id.
    pub(crate) fn admit_with_id(
        &mut self,
        actor: &str,
        id: RecordId,
        build: impl FnOnce(RecordId, DateTime<Utc>) -> T,
    ) -> &T {
        let now = self.tick();
        let mut record = build(id, now);
        record.log_mut().push(Activity {
            kind: ActivityKind::Created,
            actor: actor.to_string(),
            description: format!("{} created", T::ENTITY),
            at: now,
        });
        debug!(entity = T::ENTITY, id = %record.id(), "record ingested");
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Index of `id`, or the mode-dependent miss outcome: `Err(NotFound)`
    /// in strict mode, `Ok(None)` in lenient mode.
    pub(crate) fn locate(&self, id: &RecordId) -> StoreResult<Option<usize>> {
        match self.records.iter().position(|r| r.id() == id) {
            Some(idx) => Ok(Some(idx)),
            None => match self.mode {
                StoreMode::Strict => Err(StoreError::NotFound {
                    entity: T::ENTITY,
                    id: id.to_string(),
                }),
                StoreMode::Lenient => {
                    debug!(entity = T::ENTITY, id = %id, "missing id ignored (lenient)");
                    Ok(None)
                }
            },
        }
    }

    pub(crate) fn at(&self, idx: usize) -> &T {
        &self.records[idx]
    }

    pub(crate) fn at_mut(&mut self, idx: usize) -> &mut T {
        &mut self.records[idx]
    }

    pub(crate) fn get(&self, id: &RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub(crate) fn records(&self) -> &[T] {
        &self.records
    }

    pub(crate) fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.records.iter().filter(|r| !r.is_deleted())
    }

    /// Apply `f` to the record, stamp it, and append one activity entry.
    pub(crate) fn mutate(
        &mut self,
        id: &RecordId,
        actor: &str,
        kind: ActivityKind,
        description: String,
        f: impl FnOnce(&mut T),
    ) -> StoreResult<Applied> {
        let Some(idx) = self.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let now = self.tick();
        let record = &mut self.records[idx];
        f(record);
        record.touch(now);
        record.log_mut().push(Activity {
            kind,
            actor: actor.to_string(),
            description,
            at: now,
        });
        debug!(entity = T::ENTITY, id = %id, kind = %kind, "record mutated");
        Ok(Applied::Changed)
    }

    /// Soft delete: flips the flag, never removes the record. Deleting an
    /// already-deleted record is a skip, not an error.
    pub(crate) fn soft_delete(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        let Some(idx) = self.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if self.records[idx].is_deleted() {
            return Ok(Applied::Skipped);
        }
        self.mutate(
            id,
            actor,
            ActivityKind::Deleted,
            format!("{} deleted", T::ENTITY),
            |record| record.set_deleted(true),
        )
    }

    /// Clear the soft-delete flag. Restoring an active record is a skip.
    pub(crate) fn restore(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        let Some(idx) = self.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if !self.records[idx].is_deleted() {
            return Ok(Applied::Skipped);
        }
        self.mutate(
            id,
            actor,
            ActivityKind::Restored,
            format!("{} restored", T::ENTITY),
            |record| record.set_deleted(false),
        )
    }

    /// Append an arbitrary typed activity entry, touching nothing else
    /// but `updated_at`.
    pub(crate) fn add_activity(
        &mut self,
        id: &RecordId,
        kind: ActivityKind,
        actor: &str,
        description: String,
    ) -> StoreResult<Applied> {
        self.mutate(id, actor, kind, description, |_| {})
    }

    /// Physically remove the record at `idx`. Reserved for ephemeral
    /// sub-entities (e.g. a dropped subtask) where no audit trail is kept.
    pub(crate) fn remove_physical(&mut self, idx: usize) -> T {
        self.records.remove(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreMode;
    use std::str::FromStr;

    #[test]
    fn mode_defaults_to_strict() {
        assert_eq!(StoreMode::default(), StoreMode::Strict);
    }

    #[test]
    fn mode_parses_both_values() {
        assert_eq!(StoreMode::from_str("strict").unwrap(), StoreMode::Strict);
        assert_eq!(StoreMode::from_str("LENIENT").unwrap(), StoreMode::Lenient);
        assert!(StoreMode::from_str("loose").is_err());
    }
}

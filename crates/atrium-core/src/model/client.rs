//! Client records and the legacy-shape ingestion adapter.
//!
//! Backend contracts for clients drifted over time (`_id` next to `id`,
//! duplicated name/phone spellings). The domain model keeps exactly one
//! canonical shape; [`RawClient`] normalizes whatever the wire delivered
//! at the ingestion boundary instead of letting the union of historical
//! shapes leak inward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityLog;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;

/// Canonical client record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

/// Client fields minus system fields, for `ClientStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            company: None,
            notes: None,
        }
    }
}

/// Partial update for a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl ClientPatch {
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.email.is_some() {
            fields.push("email");
        }
        if self.phone.is_some() {
            fields.push("phone");
        }
        if self.company.is_some() {
            fields.push("company");
        }
        if self.notes.is_some() {
            fields.push("notes");
        }
        fields
    }
}

/// The loosely-shaped client record as historical backends emitted it.
///
/// Both `id` and `_id` may be present (either wins, `id` preferred), the
/// display name arrives under `name` or `clientName`, and the phone under
/// `phone` or `phoneNumber`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClient {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "_id")]
    pub legacy_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "clientName")]
    pub client_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawClient {
    /// Collapse the historical shape into `(carried id, canonical fields)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when no usable name is present.
    pub fn normalize(self) -> StoreResult<(Option<RecordId>, NewClient)> {
        let name = self
            .name
            .or(self.client_name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(StoreError::Validation {
                field: "client name",
                reason: "missing or empty in raw record".to_string(),
            })?;

        let id = self
            .id
            .or(self.legacy_id)
            .filter(|raw| !raw.is_empty())
            .map(RecordId::new_unchecked);

        Ok((
            id,
            NewClient {
                name,
                email: self.email,
                phone: self.phone.or(self.phone_number),
                company: self.company,
                notes: self.notes,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::RawClient;

    #[test]
    fn normalize_prefers_modern_fields() {
        let raw: RawClient = serde_json::from_str(
            r#"{"id":"c-1","_id":"old-9","name":"Globex","clientName":"Globex Ltd",
                "phone":"111","phoneNumber":"222"}"#,
        )
        .unwrap();
        let (id, fields) = raw.normalize().unwrap();
        assert_eq!(id.unwrap().as_str(), "c-1");
        assert_eq!(fields.name, "Globex");
        assert_eq!(fields.phone.as_deref(), Some("111"));
    }

    #[test]
    fn normalize_falls_back_to_legacy_fields() {
        let raw: RawClient = serde_json::from_str(
            r#"{"_id":"old-9","clientName":"Initech","phoneNumber":"555"}"#,
        )
        .unwrap();
        let (id, fields) = raw.normalize().unwrap();
        assert_eq!(id.unwrap().as_str(), "old-9");
        assert_eq!(fields.name, "Initech");
        assert_eq!(fields.phone.as_deref(), Some("555"));
    }

    #[test]
    fn normalize_requires_a_name() {
        let raw: RawClient = serde_json::from_str(r#"{"id":"c-2","name":"  "}"#).unwrap();
        assert!(raw.normalize().is_err());
    }

    #[test]
    fn normalize_without_id_lets_the_store_assign_one() {
        let raw: RawClient = serde_json::from_str(r#"{"name":"Hooli"}"#).unwrap();
        let (id, _) = raw.normalize().unwrap();
        assert!(id.is_none());
    }
}

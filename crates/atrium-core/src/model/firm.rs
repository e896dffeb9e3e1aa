//! The issuing firm: the business entity whose details invoices embed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityLog;
use crate::id::RecordId;
use crate::model::invoice::PartySnapshot;

/// A firm record. Invoices never reference a firm by id; they embed a
/// [`PartySnapshot`] taken at issue time (see [`Firm::party_snapshot`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

impl Firm {
    /// Point-in-time billing snapshot for embedding into an invoice.
    /// Later edits to the firm leave issued invoices untouched.
    #[must_use]
    pub fn party_snapshot(&self) -> PartySnapshot {
        PartySnapshot {
            name: self.name.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
        }
    }
}

/// Firm fields minus system fields, for `FirmStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFirm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl NewFirm {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            tax_id: None,
        }
    }
}

/// Partial update for a firm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirmPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl FirmPatch {
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
        if self.address.is_some() {
            fields.push("address");
        }
        if self.tax_id.is_some() {
            fields.push("tax_id");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::{Firm, NewFirm};
    use crate::activity::ActivityLog;
    use crate::id::RecordId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn party_snapshot_copies_billing_fields() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let firm = Firm {
            id: RecordId::new_unchecked("firm-1"),
            name: "Atrium LLC".into(),
            email: Some("billing@atrium.test".into()),
            phone: Some("555".into()),
            address: Some("1 Main St".into()),
            tax_id: Some("TX-9".into()),
            created_at: at,
            updated_at: at,
            deleted: false,
            activities: ActivityLog::default(),
        };

        let snapshot = firm.party_snapshot();
        assert_eq!(snapshot.name, "Atrium LLC");
        assert_eq!(snapshot.email.as_deref(), Some("billing@atrium.test"));
        assert_eq!(snapshot.address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn new_firm_starts_bare() {
        let new = NewFirm::new("Atrium LLC");
        assert!(new.email.is_none());
        assert!(new.tax_id.is_none());
    }
}

//! Append-only activity trail attached to every record.
//!
//! Every mutating store operation appends exactly one entry carrying the
//! actor, a timestamp, and a human-readable description. Entries are never
//! edited or removed after the fact; [`ActivityLog`] exposes no mutable
//! access to past entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// The typed event catalog for activity entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Record creation (seeded exactly once by `add`).
    Created,
    /// Partial-patch merge.
    Updated,
    /// Status/stage transition; a matching entry lands in the record's
    /// dedicated transition log as well.
    StatusChange,
    /// Soft delete.
    Deleted,
    /// Soft-delete reversal.
    Restored,
    /// Logged phone call.
    Call,
    /// Logged email.
    Email,
    /// Logged meeting.
    Meeting,
    /// Free-form note.
    Note,
}

impl ActivityKind {
    /// All known kinds in catalog order.
    pub const ALL: [Self; 9] = [
        Self::Created,
        Self::Updated,
        Self::StatusChange,
        Self::Deleted,
        Self::Restored,
        Self::Call,
        Self::Email,
        Self::Meeting,
        Self::Note,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChange => "status_change",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "status_change" => Ok(Self::StatusChange),
            "deleted" => Ok(Self::Deleted),
            "restored" => Ok(Self::Restored),
            "call" => Ok(Self::Call),
            "email" => Ok(Self::Email),
            "meeting" => Ok(Self::Meeting),
            "note" => Ok(Self::Note),
            _ => Err(ParseEnumError {
                expected: "activity kind",
                got: s.to_string(),
            }),
        }
    }
}

/// One immutable entry in a record's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub actor: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

/// Append-only log of [`Activity`] entries.
///
/// The inner vector is private: consumers read through `entries`/`iter`
/// and only the stores append, so retroactive edits are unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog(Vec<Activity>);

impl ActivityLog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[Activity] {
        &self.0
    }

    #[must_use]
    pub fn last(&self) -> Option<&Activity> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activity> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, entry: Activity) {
        self.0.push(entry);
    }
}

impl<'a> IntoIterator for &'a ActivityLog {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityKind;
    use std::str::FromStr;

    #[test]
    fn kind_json_roundtrips() {
        assert_eq!(
            serde_json::to_string(&ActivityKind::StatusChange).unwrap(),
            "\"status_change\""
        );
        assert_eq!(
            serde_json::from_str::<ActivityKind>("\"restored\"").unwrap(),
            ActivityKind::Restored
        );
    }

    #[test]
    fn display_parse_roundtrips() {
        for kind in ActivityKind::ALL {
            let rendered = kind.to_string();
            assert_eq!(ActivityKind::from_str(&rendered).unwrap(), kind);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(ActivityKind::from_str("archived").is_err());
        assert!(ActivityKind::from_str("").is_err());
    }
}

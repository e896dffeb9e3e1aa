//! Sales lead: pipeline status, stage history, audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::activity::ActivityLog;
use crate::error::ParseEnumError;
use crate::id::RecordId;

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStatus {
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::Won,
        Self::Lost,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Human-facing label used in activity descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Whether the lead has left the pipeline (won or lost).
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "qualified" => Ok(Self::Qualified),
            "proposal" => Ok(Self::Proposal),
            "negotiation" => Ok(Self::Negotiation),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            _ => Err(ParseEnumError {
                expected: "lead status",
                got: s.to_string(),
            }),
        }
    }
}

/// One stage transition. Entries form a contiguous chain: each entry's
/// `from` equals the previous entry's `to`, and the seed entry written at
/// creation has `from = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub from: Option<LeadStatus>,
    pub to: LeadStatus,
    pub changed_by: String,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A sales lead record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub value: f64,
    pub source: Option<String>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub(crate) stage_history: Vec<StageEntry>,
    pub activities: ActivityLog,
}

impl Lead {
    /// The stage-transition log, distinct from the general activity trail.
    #[must_use]
    pub fn stage_history(&self) -> &[StageEntry] {
        &self.stage_history
    }
}

/// Lead fields minus system fields, for `LeadStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub value: f64,
    pub source: Option<String>,
    pub assigned_to: Option<String>,
}

impl NewLead {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            company: None,
            status: LeadStatus::New,
            value: 0.0,
            source: None,
            assigned_to: None,
        }
    }
}

/// Partial update for a lead. `None` fields are left untouched; status is
/// deliberately absent — transitions go through `LeadStore::update_status`
/// so the stage history stays contiguous.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub value: Option<f64>,
    pub source: Option<String>,
    pub assigned_to: Option<String>,
}

impl LeadPatch {
    /// Names of the fields this patch touches, for the activity entry's
    /// change-category description (not a full diff).
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.email.is_some() {
            fields.push("email");
        }
        if self.company.is_some() {
            fields.push("company");
        }
        if self.value.is_some() {
            fields.push("value");
        }
        if self.source.is_some() {
            fields.push("source");
        }
        if self.assigned_to.is_some() {
            fields.push("assigned_to");
        }
        fields
    }
}

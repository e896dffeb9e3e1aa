//! Projects group issues within a workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::activity::ActivityLog;
use crate::error::ParseEnumError;
use crate::id::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Paused,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [Self; 4] = [Self::Active, Self::Paused, Self::Completed, Self::Archived];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseEnumError {
                expected: "project status",
                got: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub workspace_id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

/// Project fields minus system fields, for `ProjectStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub workspace_id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
}

impl NewProject {
    #[must_use]
    pub fn new(workspace_id: RecordId, name: impl Into<String>) -> Self {
        Self {
            workspace_id,
            name: name.into(),
            description: None,
            status: ProjectStatus::default(),
        }
    }
}

/// Partial update for a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectStatus;
    use std::str::FromStr;

    #[test]
    fn status_display_parse_roundtrips() {
        for status in ProjectStatus::ALL {
            let rendered = status.to_string();
            assert_eq!(ProjectStatus::from_str(&rendered).unwrap(), status);
        }
    }

    #[test]
    fn default_is_active() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Active);
    }
}

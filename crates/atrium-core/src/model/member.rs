//! Team and project membership records, and the fixed permission bundles
//! their roles map to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::activity::ActivityLog;
use crate::error::ParseEnumError;
use crate::id::RecordId;

/// Fixed-shape permission record resolved for a member. Either the default
/// bundle of the member's declared role or the member's explicit override;
/// there is no third source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionBundle {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_members: bool,
    pub can_manage_settings: bool,
}

impl PermissionBundle {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
            can_manage_members: true,
            can_manage_settings: true,
        }
    }

    #[must_use]
    pub const fn read_only() -> Self {
        Self {
            can_view: true,
            can_create: false,
            can_edit: false,
            can_delete: false,
            can_manage_members: false,
            can_manage_settings: false,
        }
    }
}

/// Role of a member within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl ProjectRole {
    pub const ALL: [Self; 4] = [Self::Owner, Self::Admin, Self::Member, Self::Viewer];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    /// The fixed default bundle for this role. Baked into the resolver,
    /// not stored per assignment.
    #[must_use]
    pub const fn default_bundle(self) -> PermissionBundle {
        match self {
            Self::Owner => PermissionBundle::all(),
            Self::Admin => PermissionBundle {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: true,
                can_manage_members: true,
                can_manage_settings: false,
            },
            Self::Member => PermissionBundle {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: false,
                can_manage_members: false,
                can_manage_settings: false,
            },
            Self::Viewer => PermissionBundle::read_only(),
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseEnumError {
                expected: "project role",
                got: s.to_string(),
            }),
        }
    }
}

/// Role of a member within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Admin,
    Lead,
    Member,
    Viewer,
}

impl TeamRole {
    pub const ALL: [Self; 4] = [Self::Admin, Self::Lead, Self::Member, Self::Viewer];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lead => "lead",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    /// The fixed default bundle for this role.
    #[must_use]
    pub const fn default_bundle(self) -> PermissionBundle {
        match self {
            Self::Admin => PermissionBundle::all(),
            Self::Lead => PermissionBundle {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: false,
                can_manage_members: true,
                can_manage_settings: false,
            },
            Self::Member => PermissionBundle {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: false,
                can_manage_members: false,
                can_manage_settings: false,
            },
            Self::Viewer => PermissionBundle::read_only(),
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "lead" => Ok(Self::Lead),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseEnumError {
                expected: "team role",
                got: s.to_string(),
            }),
        }
    }
}

/// One user's membership within a team. Lives inline on the [`Team`]
/// record; dropping a membership is a hard removal (the team's activity
/// trail records it, the membership itself carries none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub user_id: String,
    pub role: TeamRole,
    pub overrides: Option<PermissionBundle>,
    pub added_at: DateTime<Utc>,
}

/// A team record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: RecordId,
    pub name: String,
    pub(crate) members: Vec<TeamMembership>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

impl Team {
    #[must_use]
    pub fn members(&self) -> &[TeamMembership] {
        &self.members
    }

    #[must_use]
    pub fn membership_of(&self, user_id: &str) -> Option<&TeamMembership> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}

/// Team fields minus system fields, for `TeamStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
}

impl NewTeam {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One user's assignment to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub id: RecordId,
    pub project_id: RecordId,
    pub user_id: String,
    pub role: ProjectRole,
    pub overrides: Option<PermissionBundle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

/// Assignment fields minus system fields, for `ProjectMemberStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjectMember {
    pub project_id: RecordId,
    pub user_id: String,
    pub role: ProjectRole,
}

impl NewProjectMember {
    #[must_use]
    pub fn new(project_id: RecordId, user_id: impl Into<String>, role: ProjectRole) -> Self {
        Self {
            project_id,
            user_id: user_id.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PermissionBundle, ProjectRole, TeamRole};
    use std::str::FromStr;

    #[test]
    fn role_display_parse_roundtrips() {
        for role in ProjectRole::ALL {
            assert_eq!(ProjectRole::from_str(&role.to_string()).unwrap(), role);
        }
        for role in TeamRole::ALL {
            assert_eq!(TeamRole::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn owner_and_admin_bundles_differ_only_in_settings() {
        let owner = ProjectRole::Owner.default_bundle();
        let admin = ProjectRole::Admin.default_bundle();
        assert_eq!(owner, PermissionBundle::all());
        assert!(!admin.can_manage_settings);
        assert!(admin.can_manage_members);
    }

    #[test]
    fn viewer_bundles_are_read_only() {
        assert_eq!(
            ProjectRole::Viewer.default_bundle(),
            PermissionBundle::read_only()
        );
        assert_eq!(
            TeamRole::Viewer.default_bundle(),
            PermissionBundle::read_only()
        );
    }
}

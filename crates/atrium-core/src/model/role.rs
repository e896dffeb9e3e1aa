//! Roles: per-module permission entries with actions, data scope, and
//! field access.
//!
//! A role's permission array is pre-seeded with an entry for every known
//! module at creation time, so a module is never implicitly missing and
//! single-module mutations can never leave the array partially populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use crate::activity::ActivityLog;
use crate::error::ParseEnumError;
use crate::id::RecordId;

/// The closed set of suite modules permissions are granted against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Leads,
    Clients,
    Invoices,
    Employees,
    Projects,
    Issues,
    Reports,
    Settings,
}

impl Module {
    /// All known modules in catalog order. Role creation seeds one
    /// permission entry per element.
    pub const ALL: [Self; 8] = [
        Self::Leads,
        Self::Clients,
        Self::Invoices,
        Self::Employees,
        Self::Projects,
        Self::Issues,
        Self::Reports,
        Self::Settings,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Clients => "clients",
            Self::Invoices => "invoices",
            Self::Employees => "employees",
            Self::Projects => "projects",
            Self::Issues => "issues",
            Self::Reports => "reports",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leads" => Ok(Self::Leads),
            "clients" => Ok(Self::Clients),
            "invoices" => Ok(Self::Invoices),
            "employees" => Ok(Self::Employees),
            "projects" => Ok(Self::Projects),
            "issues" => Ok(Self::Issues),
            "reports" => Ok(Self::Reports),
            "settings" => Ok(Self::Settings),
            _ => Err(ParseEnumError {
                expected: "module",
                got: s.to_string(),
            }),
        }
    }
}

/// The five togglable actions on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    View,
    Create,
    Edit,
    Delete,
    Approve,
}

impl ActionKind {
    pub const ALL: [Self; 5] = [
        Self::View,
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Approve,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Approve => "approve",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-action booleans for one module entry. All false by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub approve: bool,
}

impl Actions {
    pub(crate) const fn set(&mut self, action: ActionKind, value: bool) {
        match action {
            ActionKind::View => self.view = value,
            ActionKind::Create => self.create = value,
            ActionKind::Edit => self.edit = value,
            ActionKind::Delete => self.delete = value,
            ActionKind::Approve => self.approve = value,
        }
    }

    #[must_use]
    pub const fn get(self, action: ActionKind) -> bool {
        match action {
            ActionKind::View => self.view,
            ActionKind::Create => self.create,
            ActionKind::Edit => self.edit,
            ActionKind::Delete => self.delete,
            ActionKind::Approve => self.approve,
        }
    }
}

/// Data visibility scope for a module entry. Serialized as
/// `"self" | "team" | "department" | "organization"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[serde(rename = "self")]
    Own,
    Team,
    Department,
    Organization,
}

impl Scope {
    pub const ALL: [Self; 4] = [Self::Own, Self::Team, Self::Department, Self::Organization];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Own => "self",
            Self::Team => "team",
            Self::Department => "department",
            Self::Organization => "organization",
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::Own
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self" => Ok(Self::Own),
            "team" => Ok(Self::Team),
            "department" => Ok(Self::Department),
            "organization" => Ok(Self::Organization),
            _ => Err(ParseEnumError {
                expected: "scope",
                got: s.to_string(),
            }),
        }
    }
}

/// Per-field visibility override within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAccess {
    Hidden,
    Read,
    Edit,
}

/// One module's permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    pub module: Module,
    pub actions: Actions,
    pub scope: Scope,
    #[serde(default)]
    pub field_access: BTreeMap<String, FieldAccess>,
}

impl ModulePermission {
    /// The entry a freshly created role carries for `module`: every action
    /// false, scope `self`, no field overrides.
    #[must_use]
    pub fn seeded(module: Module) -> Self {
        Self {
            module,
            actions: Actions::default(),
            scope: Scope::default(),
            field_access: BTreeMap::new(),
        }
    }
}

/// System roles ship with the suite; custom roles are tenant-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    System,
    Custom,
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::Custom => "custom",
        })
    }
}

/// A role record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RecordId,
    pub name: String,
    pub role_type: RoleType,
    pub(crate) permissions: Vec<ModulePermission>,
    pub(crate) assigned_to: Vec<String>,
    pub approval_authority_level: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

impl Role {
    /// The full permission array, one entry per known module.
    #[must_use]
    pub fn permissions(&self) -> &[ModulePermission] {
        &self.permissions
    }

    /// The entry for one module. Always present: the array is seeded with
    /// every known module at creation.
    #[must_use]
    pub fn permission_for(&self, module: Module) -> Option<&ModulePermission> {
        self.permissions.iter().find(|p| p.module == module)
    }

    /// Member ids currently holding this role.
    #[must_use]
    pub fn assigned_to(&self) -> &[String] {
        &self.assigned_to
    }
}

/// Role fields minus system fields, for `RoleStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub role_type: RoleType,
    pub approval_authority_level: u8,
}

impl NewRole {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role_type: RoleType::Custom,
            approval_authority_level: 0,
        }
    }
}

/// Partial update for a role's own fields (not its permission entries).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolePatch {
    pub name: Option<String>,
    pub approval_authority_level: Option<u8>,
}

impl RolePatch {
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.approval_authority_level.is_some() {
            fields.push("approval_authority_level");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, Actions, Module, ModulePermission, Scope};
    use std::str::FromStr;

    #[test]
    fn module_display_parse_roundtrips() {
        for module in Module::ALL {
            let rendered = module.to_string();
            assert_eq!(Module::from_str(&rendered).unwrap(), module);
        }
    }

    #[test]
    fn scope_serializes_self_keyword() {
        assert_eq!(serde_json::to_string(&Scope::Own).unwrap(), "\"self\"");
        assert_eq!(serde_json::from_str::<Scope>("\"self\"").unwrap(), Scope::Own);
    }

    #[test]
    fn seeded_entry_denies_everything() {
        let entry = ModulePermission::seeded(Module::Invoices);
        for action in ActionKind::ALL {
            assert!(!entry.actions.get(action));
        }
        assert_eq!(entry.scope, Scope::Own);
        assert!(entry.field_access.is_empty());
    }

    #[test]
    fn action_set_get_roundtrips() {
        let mut actions = Actions::default();
        actions.set(ActionKind::Approve, true);
        assert!(actions.get(ActionKind::Approve));
        assert!(!actions.get(ActionKind::View));
    }
}

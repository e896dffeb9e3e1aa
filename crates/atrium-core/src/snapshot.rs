//! JSON snapshots: the whole suite serialized as one document keyed by
//! store name. A persistence side-channel, not a journal; loading replaces
//! in-memory state wholesale.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::store::clients::ClientStore;
use crate::store::employees::EmployeeStore;
use crate::store::firms::FirmStore;
use crate::store::invoices::InvoiceStore;
use crate::store::issues::IssueStore;
use crate::store::leads::LeadStore;
use crate::store::members::ProjectMemberStore;
use crate::store::projects::ProjectStore;
use crate::store::roles::RoleStore;
use crate::store::teams::TeamStore;

/// Owned document shape, used on load.
#[derive(Debug, Deserialize)]
pub(crate) struct SuiteSnapshot {
    pub leads: LeadStore,
    pub clients: ClientStore,
    pub invoices: InvoiceStore,
    pub employees: EmployeeStore,
    pub firms: FirmStore,
    pub projects: ProjectStore,
    pub issues: IssueStore,
    pub project_members: ProjectMemberStore,
    pub teams: TeamStore,
    pub roles: RoleStore,
}

/// Borrowed view of the same shape, used on save.
#[derive(Debug, Serialize)]
pub(crate) struct SnapshotView<'a> {
    pub leads: &'a LeadStore,
    pub clients: &'a ClientStore,
    pub invoices: &'a InvoiceStore,
    pub employees: &'a EmployeeStore,
    pub firms: &'a FirmStore,
    pub projects: &'a ProjectStore,
    pub issues: &'a IssueStore,
    pub project_members: &'a ProjectMemberStore,
    pub teams: &'a TeamStore,
    pub roles: &'a RoleStore,
}

pub(crate) fn write_snapshot(path: &Path, view: &SnapshotView<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(view).context("Failed to serialize snapshot")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "snapshot written");
    Ok(())
}

pub(crate) fn read_snapshot(path: &Path) -> Result<SuiteSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot = serde_json::from_str::<SuiteSnapshot>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(path = %path.display(), "snapshot loaded");
    Ok(snapshot)
}

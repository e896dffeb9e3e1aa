//! The suite container: one instance owns every entity store and the
//! runtime settings they share.

use anyhow::Result;
use std::path::Path;

use crate::clock::ClockHandle;
use crate::config::SuiteConfig;
use crate::snapshot::{self, SnapshotView};
use crate::store::StoreMode;
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

/// All stores of one tenant, wired to a shared clock and store mode.
///
/// Single-threaded by construction: every mutator takes `&mut self` on the
/// owning store, so cross-store operations are naturally serialized.
#[derive(Debug)]
pub struct Suite {
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
    config: SuiteConfig,
    clock: ClockHandle,
}

impl Suite {
    #[must_use]
    pub fn new(config: SuiteConfig) -> Self {
        Self::with_clock(config, ClockHandle::default())
    }

    /// Construct with an explicit clock; tests inject a manual one.
    #[must_use]
    pub fn with_clock(config: SuiteConfig, clock: ClockHandle) -> Self {
        let mode = config.store.mode;
        Self {
            leads: LeadStore::new(mode, clock.clone()),
            clients: ClientStore::new(mode, clock.clone()),
            invoices: InvoiceStore::new(mode, clock.clone()),
            employees: EmployeeStore::new(mode, clock.clone()),
            firms: FirmStore::new(mode, clock.clone()),
            projects: ProjectStore::new(mode, clock.clone()),
            issues: IssueStore::new(mode, clock.clone()),
            project_members: ProjectMemberStore::new(mode, clock.clone()),
            teams: TeamStore::new(mode, clock.clone()),
            roles: RoleStore::new(mode, clock.clone()),
            config,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> StoreMode {
        self.config.store.mode
    }

    /// Write every store to one JSON document at `path`.
    ///
    /// # Errors
    ///
    /// I/O or serialization failure, with the path in the error chain.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        snapshot::write_snapshot(
            path,
            &SnapshotView {
                leads: &self.leads,
                clients: &self.clients,
                invoices: &self.invoices,
                employees: &self.employees,
                firms: &self.firms,
                projects: &self.projects,
                issues: &self.issues,
                project_members: &self.project_members,
                teams: &self.teams,
                roles: &self.roles,
            },
        )
    }

    /// Replace in-memory state with the document at `path`. The clock and
    /// store mode are runtime settings, not persisted; they are re-applied
    /// to every hydrated store.
    ///
    /// # Errors
    ///
    /// I/O or parse failure, with the path in the error chain.
    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        let loaded = snapshot::read_snapshot(path)?;
        let mode = self.config.store.mode;

        self.leads = loaded.leads;
        self.clients = loaded.clients;
        self.invoices = loaded.invoices;
        self.employees = loaded.employees;
        self.firms = loaded.firms;
        self.projects = loaded.projects;
        self.issues = loaded.issues;
        self.project_members = loaded.project_members;
        self.teams = loaded.teams;
        self.roles = loaded.roles;

        self.leads.configure(mode, self.clock.clone());
        self.clients.configure(mode, self.clock.clone());
        self.invoices.configure(mode, self.clock.clone());
        self.employees.configure(mode, self.clock.clone());
        self.firms.configure(mode, self.clock.clone());
        self.projects.configure(mode, self.clock.clone());
        self.issues.configure(mode, self.clock.clone());
        self.project_members.configure(mode, self.clock.clone());
        self.teams.configure(mode, self.clock.clone());
        self.roles.configure(mode, self.clock.clone());
        Ok(())
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::new(SuiteConfig::default())
    }
}

//! Read-only data sources.
//!
//! Analytics never touch a store's mutation surface: they consume these
//! narrow traits, which the core stores implement over their active
//! (non-deleted) records. Tests can substitute plain slices.

use atrium_core::RecordId;
use atrium_core::model::issue::Issue;
use atrium_core::model::member::{ProjectMember, Team};
use atrium_core::model::project::Project;
use atrium_core::store::issues::IssueStore;
use atrium_core::store::members::ProjectMemberStore;
use atrium_core::store::projects::ProjectStore;
use atrium_core::store::teams::TeamStore;

pub trait IssueSource {
    /// Active issues of one project.
    fn issues_for_project(&self, project_id: &RecordId) -> Vec<&Issue>;

    /// Every active issue.
    fn all_issues(&self) -> Vec<&Issue>;
}

pub trait ProjectSource {
    /// Active projects of one workspace.
    fn projects_for_workspace(&self, workspace_id: &RecordId) -> Vec<&Project>;
}

pub trait MemberSource {
    /// Active assignments of one project.
    fn members_for_project(&self, project_id: &RecordId) -> Vec<&ProjectMember>;
}

pub trait TeamSource {
    fn team(&self, team_id: &RecordId) -> Option<&Team>;

    /// Every active team.
    fn teams(&self) -> Vec<&Team>;
}

impl IssueSource for IssueStore {
    fn issues_for_project(&self, project_id: &RecordId) -> Vec<&Issue> {
        self.by_project(project_id).collect()
    }

    fn all_issues(&self) -> Vec<&Issue> {
        self.list_active().collect()
    }
}

impl ProjectSource for ProjectStore {
    fn projects_for_workspace(&self, workspace_id: &RecordId) -> Vec<&Project> {
        self.by_workspace(workspace_id).collect()
    }
}

impl MemberSource for ProjectMemberStore {
    fn members_for_project(&self, project_id: &RecordId) -> Vec<&ProjectMember> {
        self.by_project(project_id).collect()
    }
}

impl TeamSource for TeamStore {
    fn team(&self, team_id: &RecordId) -> Option<&Team> {
        self.get(team_id).filter(|t| !t.deleted)
    }

    fn teams(&self) -> Vec<&Team> {
        self.list_active().collect()
    }
}

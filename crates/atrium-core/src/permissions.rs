//! Permission resolution for project and team members.
//!
//! A member's effective permissions come from exactly two sources: the
//! explicit override stored on the membership, or the fixed default bundle
//! of the member's declared role. The override wins verbatim when present;
//! bundles are never merged field-by-field. A missing membership is an
//! error, never an empty bundle, so "no access" and "not a member" stay
//! distinguishable.

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::member::PermissionBundle;
use crate::store::members::ProjectMemberStore;
use crate::store::teams::TeamStore;

/// Effective permissions of `user_id` on a project. Soft-deleted
/// assignments do not count as membership.
///
/// # Errors
///
/// [`StoreError::MemberNotFound`] when the user holds no active assignment
/// to the project.
pub fn resolve_project_permissions(
    members: &ProjectMemberStore,
    project_id: &RecordId,
    user_id: &str,
) -> StoreResult<PermissionBundle> {
    let member = members.assignment_of(project_id, user_id).ok_or_else(|| {
        StoreError::MemberNotFound {
            container: "project",
            container_id: project_id.to_string(),
            user_id: user_id.to_string(),
        }
    })?;
    let resolved = member
        .overrides
        .unwrap_or_else(|| member.role.default_bundle());
    debug!(
        project = %project_id,
        user = user_id,
        overridden = member.overrides.is_some(),
        "project permissions resolved"
    );
    Ok(resolved)
}

/// Effective permissions of `user_id` on a team.
///
/// # Errors
///
/// [`StoreError::NotFound`] per store mode when the team id is missing;
/// [`StoreError::MemberNotFound`] when the user is not on the team.
pub fn resolve_team_permissions(
    teams: &TeamStore,
    team_id: &RecordId,
    user_id: &str,
) -> StoreResult<PermissionBundle> {
    let team = teams.get(team_id).ok_or_else(|| StoreError::NotFound {
        entity: "team",
        id: team_id.to_string(),
    })?;
    let membership = team
        .membership_of(user_id)
        .ok_or_else(|| StoreError::MemberNotFound {
            container: "team",
            container_id: team_id.to_string(),
            user_id: user_id.to_string(),
        })?;
    let resolved = membership
        .overrides
        .unwrap_or_else(|| membership.role.default_bundle());
    debug!(
        team = %team_id,
        user = user_id,
        overridden = membership.overrides.is_some(),
        "team permissions resolved"
    );
    Ok(resolved)
}

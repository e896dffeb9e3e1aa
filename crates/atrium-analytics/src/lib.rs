#![forbid(unsafe_code)]
//! atrium-analytics: derived analytics over the atrium entity stores.
//!
//! Everything here is pure read-time derivation: functions take read-only
//! source traits plus an explicit evaluation time, and return owned value
//! types. Nothing writes back and nothing is cached.
//!
//! # Conventions
//!
//! - **Errors**: absent-by-construction; lookups that can miss return
//!   `Option`.
//! - **Logging**: `tracing` macros (`debug!` at derivation points).

pub mod project;
pub mod source;
pub mod team;
pub mod workspace;

pub use project::{
    DistributionEntry, MemberWorkload, ProjectAnalytics, TaskMetrics,
    average_task_completion_time, project_analytics, tasks_completed_in_period,
};
pub use source::{IssueSource, MemberSource, ProjectSource, TeamSource};
pub use team::{TeamProductivity, team_productivity};
pub use workspace::{
    ProjectBreakdown, TeamTaskCount, WorkspaceAnalytics, workspace_analytics,
};

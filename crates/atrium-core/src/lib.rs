#![forbid(unsafe_code)]
//! atrium-core: the in-memory domain core of the suite.
//!
//! Entity stores (leads, clients, invoices, employees, firms, projects,
//! issues, teams, roles, project members) with CRUD, soft delete,
//! per-record activity trails, and
//! workflow-checked transitions; permission resolution for project and team
//! members; and JSON snapshot persistence. Derived analytics live in the
//! `atrium-analytics` crate.
//!
//! # Conventions
//!
//! - **Errors**: store operations return [`error::StoreResult`];
//!   file-touching paths (config, snapshots) return `anyhow::Result`.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod activity;
pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod permissions;
pub(crate) mod snapshot;
pub mod store;
pub mod suite;

pub use activity::{Activity, ActivityKind, ActivityLog};
pub use clock::{Clock, ClockHandle, ManualClock, SystemClock};
pub use config::{SuiteConfig, load_config};
pub use error::{ErrorCode, ParseEnumError, StoreError, StoreResult};
pub use id::RecordId;
pub use permissions::{resolve_project_permissions, resolve_team_permissions};
pub use store::{Applied, StoreMode};
pub use suite::Suite;

//! Canonical entity shapes. Every record follows one pattern: opaque id,
//! `created_at`/`updated_at` stamps, a soft-delete flag, and an append-only
//! activity trail; entities with workflow state carry a dedicated
//! transition log on top.

pub mod client;
pub mod employee;
pub mod firm;
pub mod invoice;
pub mod issue;
pub mod lead;
pub mod member;
pub mod project;
pub mod role;

//! Core domain logic for IssueDesk.
//! This crate is the single source of truth for membership and access rules.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::guard::guard_update;
pub use access::membership::MembershipIndex;
pub use access::scope::{scope_for, VisibilityScope};
pub use access::{decide, Action, Decision, Denial, Request, ResourceKind};
pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::user::Principal;
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

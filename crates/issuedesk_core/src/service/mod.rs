//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate access decisions, write-once guards and repository calls
//!   into use-case level APIs.
//! - Keep transport layers decoupled from storage and policy details.
//!
//! # Invariants
//! - Every resource operation is decided against current membership before
//!   any write.
//! - Detail reads of absent and invisible resources fail identically with
//!   `Denial::NotFound`.

use crate::access::membership::MembershipIndex;
use crate::access::scope::VisibilityScope;
use crate::access::{decide, AccessPolicy, Denial, Request};
use crate::model::project::ProjectId;
use crate::model::user::Principal;
use crate::model::ValidationError;
use crate::repo::RepoError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment_service;
pub mod contributor_service;
pub mod issue_service;
pub mod project_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by all resource services.
#[derive(Debug)]
pub enum ServiceError {
    /// Request refused: not found, forbidden or invalid.
    Denied(Denial),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Returns the denial when the request was refused.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Denied(denial) => Some(denial),
            _ => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(denial) => write!(f, "{denial}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(denial) => Some(denial),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<Denial> for ServiceError {
    fn from(value: Denial) -> Self {
        Self::Denied(value)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Denied(value.into())
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            // A row vanishing between load and write reads as absence.
            RepoError::NotFound { .. } => Self::Denied(Denial::NotFound),
            other => Self::Repo(other),
        }
    }
}

/// Runs policy `P` and converts a denial into `ServiceError::Denied`.
pub(crate) fn authorize<P, M>(
    index: &M,
    principal: &Principal,
    request: Request<'_, P::Resource, P::Draft, P::Patch>,
) -> ServiceResult<()>
where
    P: AccessPolicy,
    M: MembershipIndex + ?Sized,
{
    decide::<P, M>(index, principal, request)?.into_result()?;
    Ok(())
}

/// Unwraps a loaded row, treating absence as `NotFound`.
pub(crate) fn found<T>(row: Option<T>) -> ServiceResult<T> {
    row.ok_or(ServiceError::Denied(Denial::NotFound))
}

/// Checks listed rows against `scope` resolved through `projects_of`.
///
/// `project_of` maps a row to the project its visibility derives from.
pub(crate) fn check_listing<T, M, F>(
    index: &M,
    scope: &VisibilityScope,
    rows: &[T],
    project_of: F,
) -> ServiceResult<()>
where
    M: MembershipIndex + ?Sized,
    F: Fn(&T) -> ProjectId,
{
    if rows.is_empty() {
        return Ok(());
    }
    let resolved = scope.resolve(index)?;
    if let Some(row) = rows.iter().find(|row| !resolved.admits(project_of(row))) {
        error!(
            "event=scope_check module=service status=error kind={} user_id={} project_id={}",
            scope.kind().as_str(),
            scope.user_id(),
            project_of(row)
        );
        return Err(ServiceError::InconsistentState(
            "listing returned a row outside the caller's scope",
        ));
    }
    Ok(())
}

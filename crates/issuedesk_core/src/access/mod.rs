//! Access control for projects, contributors, issues and comments.
//!
//! # Responsibility
//! - Decide whether a principal may perform an action on one resource
//!   (`policy`), from membership facts only (`membership`).
//! - Restrict listings to the resources a principal may see (`scope`).
//! - Reject changes to write-once fields (`guard`).
//!
//! # Invariants
//! - Decisions are recomputed from current membership on every call; no
//!   decision is cached.
//! - A detail read outside the principal's scope is `NotFound`, never
//!   `Forbidden`, so existence does not leak.
//! - Validation denials are reported before authorization denials, except
//!   the top-level "contributor of the parent project" check on create.

use crate::model::user::Principal;
use crate::model::ValidationError;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod guard;
pub mod membership;
pub mod policy;
pub mod scope;

use membership::MembershipIndex;

/// Operation a principal intends to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// Maps a transport verb onto an action. Unknown verbs map to `None`.
    pub fn from_method(method: &str) -> Option<Self> {
        match method.trim().to_ascii_uppercase().as_str() {
            "GET" | "HEAD" => Some(Self::Read),
            "POST" => Some(Self::Create),
            "PATCH" | "PUT" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Resource families governed by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    Contributor,
    Issue,
    Comment,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Contributor => "contributor",
            Self::Issue => "issue",
            Self::Comment => "comment",
        }
    }
}

/// Terminal refusal returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Resource is absent, or invisible to the principal.
    NotFound,
    /// Resource is visible but the principal lacks the right.
    Forbidden(String),
    /// Payload or referential problem on one field.
    Validation {
        field: &'static str,
        message: String,
    },
}

impl Denial {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Short stable label used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Validation { .. } => "validation",
        }
    }
}

impl Display for Denial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Forbidden(reason) => write!(f, "forbidden: {reason}"),
            Self::Validation { field, message } => write!(f, "invalid {field}: {message}"),
        }
    }
}

impl Error for Denial {}

impl From<ValidationError> for Denial {
    fn from(value: ValidationError) -> Self {
        Self::Validation {
            field: value.field,
            message: value.message,
        }
    }
}

/// Outcome of one access decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts into `Result` so callers can propagate denials with `?`.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial),
        }
    }
}

impl From<Result<(), Denial>> for Decision {
    fn from(value: Result<(), Denial>) -> Self {
        match value {
            Ok(()) => Self::Allow,
            Err(denial) => Self::Deny(denial),
        }
    }
}

/// Failure of one policy evaluation: either a refusal or a lookup error.
#[derive(Debug)]
pub enum AccessError {
    Denied(Denial),
    Lookup(RepoError),
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(denial) => write!(f, "{denial}"),
            Self::Lookup(err) => write!(f, "membership lookup failed: {err}"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(denial) => Some(denial),
            Self::Lookup(err) => Some(err),
        }
    }
}

impl From<Denial> for AccessError {
    fn from(value: Denial) -> Self {
        Self::Denied(value)
    }
}

impl From<ValidationError> for AccessError {
    fn from(value: ValidationError) -> Self {
        Self::Denied(value.into())
    }
}

impl From<RepoError> for AccessError {
    fn from(value: RepoError) -> Self {
        Self::Lookup(value)
    }
}

pub type AccessResult = Result<(), AccessError>;

/// One request against a resource kind: the action plus what it acts on.
///
/// `R` is the stored resource, `C` the creation payload, `U` the patch.
#[derive(Debug)]
pub enum Request<'a, R, C, U> {
    Create(&'a C),
    Read(&'a R),
    Update(&'a R, &'a U),
    Delete(&'a R),
}

impl<R, C, U> Request<'_, R, C, U> {
    pub fn action(&self) -> Action {
        match self {
            Self::Create(_) => Action::Create,
            Self::Read(_) => Action::Read,
            Self::Update(..) => Action::Update,
            Self::Delete(_) => Action::Delete,
        }
    }
}

/// Access rules for one resource kind.
///
/// Implementations only query `MembershipIndex`; they never write.
pub trait AccessPolicy {
    const KIND: ResourceKind;
    type Resource;
    type Draft;
    type Patch;

    fn evaluate<M: MembershipIndex + ?Sized>(
        index: &M,
        principal: &Principal,
        request: &Request<'_, Self::Resource, Self::Draft, Self::Patch>,
    ) -> AccessResult;
}

/// Evaluates `request` under policy `P` and logs the outcome.
///
/// The outer `Result` carries membership lookup failures; the returned
/// `Decision` is the authorization answer.
pub fn decide<P, M>(
    index: &M,
    principal: &Principal,
    request: Request<'_, P::Resource, P::Draft, P::Patch>,
) -> RepoResult<Decision>
where
    P: AccessPolicy,
    M: MembershipIndex + ?Sized,
{
    let decision = match P::evaluate(index, principal, &request) {
        Ok(()) => Decision::Allow,
        Err(AccessError::Denied(denial)) => Decision::Deny(denial),
        Err(AccessError::Lookup(err)) => return Err(err),
    };
    match &decision {
        Decision::Allow => debug!(
            "event=access_decision module=access kind={} action={} status=allow",
            P::KIND.as_str(),
            request.action().as_str()
        ),
        Decision::Deny(denial) => debug!(
            "event=access_decision module=access kind={} action={} status=deny reason={}",
            P::KIND.as_str(),
            request.action().as_str(),
            denial.code()
        ),
    }
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::{Action, Decision, Denial};
    use crate::model::ValidationError;

    #[test]
    fn maps_transport_verbs_to_actions() {
        assert_eq!(Action::from_method("GET"), Some(Action::Read));
        assert_eq!(Action::from_method("head"), Some(Action::Read));
        assert_eq!(Action::from_method("POST"), Some(Action::Create));
        assert_eq!(Action::from_method("PATCH"), Some(Action::Update));
        assert_eq!(Action::from_method("PUT"), Some(Action::Update));
        assert_eq!(Action::from_method("DELETE"), Some(Action::Delete));
        assert_eq!(Action::from_method("OPTIONS"), None);
    }

    #[test]
    fn validation_error_keeps_field_name() {
        let denial = Denial::from(ValidationError::new("title", "too long"));
        assert_eq!(denial, Denial::validation("title", "too long"));
        assert_eq!(denial.code(), "validation");
    }

    #[test]
    fn decision_round_trips_through_result() {
        assert!(Decision::from(Ok(())).is_allowed());
        let denied = Decision::from(Err(Denial::NotFound));
        assert_eq!(denied.into_result(), Err(Denial::NotFound));
    }
}

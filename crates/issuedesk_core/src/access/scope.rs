//! Visibility scope resolution for listings.
//!
//! # Responsibility
//! - Produce, per principal and resource kind, the predicate selecting
//!   exactly the rows that principal may read.
//! - Resolve the same scope as a project set for checking loaded rows.
//!
//! # Invariants
//! - Scope is derived from contributor membership only.
//! - Issue and comment scopes cascade through their project with a join,
//!   never with per-row lookups.
//! - Callers AND extra filters onto the scope; they never replace it.

use super::membership::MembershipIndex;
use super::ResourceKind;
use crate::model::project::ProjectId;
use crate::model::user::{Principal, UserId};
use crate::repo::RepoResult;
use rusqlite::types::Value;
use std::collections::BTreeSet;

const MEMBER_PROJECTS_SQL: &str =
    "SELECT scope_c.project_id FROM contributors scope_c WHERE scope_c.user_id = ?";

/// Rows of one resource kind visible to one principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityScope {
    kind: ResourceKind,
    user_id: UserId,
}

/// SQL rendering of a scope: a boolean clause plus its bind values.
///
/// The clause references the unaliased table of the resource kind
/// (`projects`, `contributors`, `issues`, `comments`).
#[derive(Debug, Clone, PartialEq)]
pub struct ScopePredicate {
    pub clause: String,
    pub params: Vec<Value>,
}

/// Returns the listing scope of `kind` for `principal`.
pub fn scope_for(principal: &Principal, kind: ResourceKind) -> VisibilityScope {
    VisibilityScope {
        kind,
        user_id: principal.user_id(),
    }
}

impl VisibilityScope {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Renders the scope as a join predicate for the kind's table.
    pub fn sql_predicate(&self) -> ScopePredicate {
        let clause = match self.kind {
            ResourceKind::Project => format!("projects.id IN ({MEMBER_PROJECTS_SQL})"),
            ResourceKind::Contributor => {
                format!("contributors.project_id IN ({MEMBER_PROJECTS_SQL})")
            }
            ResourceKind::Issue => format!("issues.project_id IN ({MEMBER_PROJECTS_SQL})"),
            ResourceKind::Comment => "comments.issue_id IN (
                SELECT scope_i.id
                FROM issues scope_i
                INNER JOIN contributors scope_c ON scope_c.project_id = scope_i.project_id
                WHERE scope_c.user_id = ?
            )"
            .to_string(),
        };
        ScopePredicate {
            clause,
            params: vec![Value::Text(self.user_id.to_string())],
        }
    }

    /// Resolves the scope in memory through `projects_of`.
    ///
    /// Services check loaded listings against it; row selection itself
    /// goes through `sql_predicate`.
    pub fn resolve<M: MembershipIndex + ?Sized>(&self, index: &M) -> RepoResult<ResolvedScope> {
        Ok(ResolvedScope {
            kind: self.kind,
            projects: index.projects_of(self.user_id)?,
        })
    }
}

/// Scope materialized as the principal's project set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    kind: ResourceKind,
    projects: BTreeSet<ProjectId>,
}

impl ResolvedScope {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Whether a resource whose (possibly derived) project is `project_id`
    /// falls inside the scope.
    pub fn admits(&self, project_id: ProjectId) -> bool {
        self.projects.contains(&project_id)
    }

    pub fn projects(&self) -> &BTreeSet<ProjectId> {
        &self.projects
    }
}

#[cfg(test)]
mod tests {
    use super::scope_for;
    use crate::access::ResourceKind;
    use crate::model::user::Principal;
    use rusqlite::types::Value;
    use uuid::Uuid;

    #[test]
    fn every_kind_binds_the_principal_once() {
        let principal = Principal::new(Uuid::new_v4());
        for kind in [
            ResourceKind::Project,
            ResourceKind::Contributor,
            ResourceKind::Issue,
            ResourceKind::Comment,
        ] {
            let predicate = scope_for(&principal, kind).sql_predicate();
            assert_eq!(predicate.clause.matches('?').count(), 1);
            assert_eq!(
                predicate.params,
                vec![Value::Text(principal.user_id().to_string())]
            );
        }
    }

    #[test]
    fn comment_scope_joins_through_issues() {
        let principal = Principal::new(Uuid::new_v4());
        let predicate = scope_for(&principal, ResourceKind::Comment).sql_predicate();
        assert!(predicate.clause.starts_with("comments.issue_id IN"));
        assert!(predicate.clause.contains("INNER JOIN contributors"));
    }
}

//! Membership fact base consumed by the evaluator and scope resolver.
//!
//! # Responsibility
//! - Answer point-in-time questions about contributor membership and
//!   authorship.
//!
//! # Invariants
//! - Answers reflect committed state at call time; callers must not cache
//!   them across requests.

use crate::model::issue::IssueId;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::RepoResult;
use std::collections::BTreeSet;

/// Query contract over contributor and authorship facts.
pub trait MembershipIndex {
    /// Whether `user_id` is a contributor of `project_id`.
    ///
    /// Returns `false` for unknown projects.
    fn is_contributor(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool>;

    /// All projects `user_id` contributes to.
    fn projects_of(&self, user_id: UserId) -> RepoResult<BTreeSet<ProjectId>>;

    /// Uniqueness check run before inserting a contributor pair.
    fn exists_contributor(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool>;

    /// Author of `project_id`, or `None` when the project does not exist.
    fn project_author(&self, project_id: ProjectId) -> RepoResult<Option<UserId>>;

    /// Project owning `issue_id`, or `None` when the issue does not exist.
    fn issue_project(&self, issue_id: IssueId) -> RepoResult<Option<ProjectId>>;
}

impl<T: MembershipIndex + ?Sized> MembershipIndex for &T {
    fn is_contributor(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool> {
        (**self).is_contributor(user_id, project_id)
    }

    fn projects_of(&self, user_id: UserId) -> RepoResult<BTreeSet<ProjectId>> {
        (**self).projects_of(user_id)
    }

    fn exists_contributor(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool> {
        (**self).exists_contributor(user_id, project_id)
    }

    fn project_author(&self, project_id: ProjectId) -> RepoResult<Option<UserId>> {
        (**self).project_author(project_id)
    }

    fn issue_project(&self, issue_id: IssueId) -> RepoResult<Option<ProjectId>> {
        (**self).issue_project(issue_id)
    }
}

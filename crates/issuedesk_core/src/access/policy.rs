//! Per-resource access rules.
//!
//! # Responsibility
//! - One `AccessPolicy` implementation per resource kind.
//!
//! # Invariants
//! - Reads, updates and deletes of a resource outside the principal's
//!   projects are `NotFound`.
//! - Only the author of a project, issue or comment may change or delete it.
//! - On create, an unknown parent is `Forbidden`: membership of a missing
//!   project cannot be established.
//! - Create order: parent membership, payload format, assignee membership,
//!   then authorship.

use super::membership::MembershipIndex;
use super::{AccessPolicy, AccessResult, Denial, Request, ResourceKind};
use crate::model::comment::{Comment, CommentPatch, NewComment};
use crate::model::contributor::{Contributor, NewContributor};
use crate::model::issue::{Issue, IssuePatch, NewIssue};
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::user::{Principal, UserId};
use std::convert::Infallible;

/// Rules for projects.
pub struct ProjectPolicy;

/// Rules for contributor membership records.
pub struct ContributorPolicy;

/// Rules for issues.
pub struct IssuePolicy;

/// Rules for comments.
pub struct CommentPolicy;

impl AccessPolicy for ProjectPolicy {
    const KIND: ResourceKind = ResourceKind::Project;
    type Resource = Project;
    type Draft = NewProject;
    type Patch = ProjectPatch;

    fn evaluate<M: MembershipIndex + ?Sized>(
        index: &M,
        principal: &Principal,
        request: &Request<'_, Project, NewProject, ProjectPatch>,
    ) -> AccessResult {
        match request {
            Request::Create(draft) => {
                draft.validate()?;
                require_self_authored(principal, draft.author_id, "a project")
            }
            Request::Read(project) => require_visible(index, principal, project.id),
            Request::Update(project, patch) => {
                require_visible(index, principal, project.id)?;
                patch.validate()?;
                require_author(principal, project.author_id, "project")
            }
            Request::Delete(project) => {
                require_visible(index, principal, project.id)?;
                require_author(principal, project.author_id, "project")
            }
        }
    }
}

impl AccessPolicy for ContributorPolicy {
    const KIND: ResourceKind = ResourceKind::Contributor;
    type Resource = Contributor;
    type Draft = NewContributor;
    type Patch = Infallible;

    fn evaluate<M: MembershipIndex + ?Sized>(
        index: &M,
        principal: &Principal,
        request: &Request<'_, Contributor, NewContributor, Infallible>,
    ) -> AccessResult {
        match request {
            Request::Create(draft) => match index.project_author(draft.project_id)? {
                Some(author_id) if principal.is(author_id) => Ok(()),
                Some(_) => Err(Denial::forbidden(
                    "only the project author can add contributors",
                )
                .into()),
                None => Err(Denial::forbidden("project does not exist").into()),
            },
            Request::Read(contributor) => {
                require_visible(index, principal, contributor.project_id)
            }
            Request::Update(_, never) => match **never {},
            Request::Delete(contributor) => {
                require_visible(index, principal, contributor.project_id)?;
                match index.project_author(contributor.project_id)? {
                    Some(author_id) if principal.is(author_id) => Ok(()),
                    _ => Err(Denial::forbidden(
                        "only the project author can remove contributors",
                    )
                    .into()),
                }
            }
        }
    }
}

impl AccessPolicy for IssuePolicy {
    const KIND: ResourceKind = ResourceKind::Issue;
    type Resource = Issue;
    type Draft = NewIssue;
    type Patch = IssuePatch;

    fn evaluate<M: MembershipIndex + ?Sized>(
        index: &M,
        principal: &Principal,
        request: &Request<'_, Issue, NewIssue, IssuePatch>,
    ) -> AccessResult {
        match request {
            Request::Create(draft) => {
                require_contributor_to_write(index, principal, draft.project_id)?;
                draft.validate()?;
                if let Some(assignee) = draft.assigned_user_id {
                    require_assignable(index, assignee, draft.project_id)?;
                }
                require_self_authored(principal, draft.author_id, "an issue")
            }
            Request::Read(issue) => require_visible(index, principal, issue.project_id),
            Request::Update(issue, patch) => {
                require_visible(index, principal, issue.project_id)?;
                patch.validate()?;
                if let Some(assignee) = patch.new_assignee() {
                    require_assignable(index, assignee, issue.project_id)?;
                }
                require_author(principal, issue.author_id, "issue")
            }
            Request::Delete(issue) => {
                require_visible(index, principal, issue.project_id)?;
                require_author(principal, issue.author_id, "issue")
            }
        }
    }
}

impl AccessPolicy for CommentPolicy {
    const KIND: ResourceKind = ResourceKind::Comment;
    type Resource = Comment;
    type Draft = NewComment;
    type Patch = CommentPatch;

    fn evaluate<M: MembershipIndex + ?Sized>(
        index: &M,
        principal: &Principal,
        request: &Request<'_, Comment, NewComment, CommentPatch>,
    ) -> AccessResult {
        match request {
            Request::Create(draft) => {
                let project_id = index
                    .issue_project(draft.issue_id)?
                    .ok_or_else(|| Denial::forbidden("issue does not exist"))?;
                require_contributor_to_write(index, principal, project_id)?;
                draft.validate()?;
                require_self_authored(principal, draft.author_id, "a comment")
            }
            Request::Read(comment) => require_visible(index, principal, comment.project_id),
            Request::Update(comment, patch) => {
                require_visible(index, principal, comment.project_id)?;
                patch.validate()?;
                require_author(principal, comment.author_id, "comment")
            }
            Request::Delete(comment) => {
                require_visible(index, principal, comment.project_id)?;
                require_author(principal, comment.author_id, "comment")
            }
        }
    }
}

fn require_visible<M: MembershipIndex + ?Sized>(
    index: &M,
    principal: &Principal,
    project_id: ProjectId,
) -> AccessResult {
    if index.is_contributor(principal.user_id(), project_id)? {
        Ok(())
    } else {
        Err(Denial::NotFound.into())
    }
}

fn require_contributor_to_write<M: MembershipIndex + ?Sized>(
    index: &M,
    principal: &Principal,
    project_id: ProjectId,
) -> AccessResult {
    if index.is_contributor(principal.user_id(), project_id)? {
        Ok(())
    } else {
        Err(Denial::forbidden("you must be a contributor of the project").into())
    }
}

fn require_assignable<M: MembershipIndex + ?Sized>(
    index: &M,
    assignee: UserId,
    project_id: ProjectId,
) -> AccessResult {
    if index.is_contributor(assignee, project_id)? {
        Ok(())
    } else {
        Err(Denial::validation(
            "assigned_user",
            "assigned user must be a project contributor",
        )
        .into())
    }
}

fn require_self_authored(principal: &Principal, author_id: UserId, what: &str) -> AccessResult {
    if principal.is(author_id) {
        Ok(())
    } else {
        Err(Denial::forbidden(format!("cannot author {what} for another user")).into())
    }
}

fn require_author(principal: &Principal, author_id: UserId, what: &str) -> AccessResult {
    if principal.is(author_id) {
        Ok(())
    } else {
        Err(Denial::forbidden(format!("only the {what} author can do this")).into())
    }
}

//! Comment use-case service.
//!
//! Visibility of a comment follows its issue's project; `issue` and
//! `author` are write-once.

use super::{authorize, check_listing, found, ServiceResult};
use crate::access::guard::guard_update;
use crate::access::membership::MembershipIndex;
use crate::access::policy::CommentPolicy;
use crate::access::scope::scope_for;
use crate::access::{Request, ResourceKind};
use crate::model::comment::{Comment, CommentId, CommentPatch, NewComment};
use crate::model::issue::IssueId;
use crate::model::user::Principal;
use crate::repo::comment_repo::{CommentListQuery, CommentRepository};
use log::info;

/// Comment service facade over a repository and a membership index.
pub struct CommentService<R: CommentRepository, M: MembershipIndex> {
    repo: R,
    index: M,
}

impl<R: CommentRepository, M: MembershipIndex> CommentService<R, M> {
    pub fn new(repo: R, index: M) -> Self {
        Self { repo, index }
    }

    pub fn create_comment(
        &self,
        principal: &Principal,
        draft: &NewComment,
    ) -> ServiceResult<Comment> {
        authorize::<CommentPolicy, _>(&self.index, principal, Request::Create(draft))?;
        let comment = self.repo.create_comment(draft)?;
        info!(
            "event=comment_create module=service status=ok issue_id={} comment_id={}",
            comment.issue_id, comment.id
        );
        Ok(comment)
    }

    pub fn get_comment(&self, principal: &Principal, id: CommentId) -> ServiceResult<Comment> {
        let comment = found(self.repo.get_comment(id)?)?;
        authorize::<CommentPolicy, _>(&self.index, principal, Request::Read(&comment))?;
        Ok(comment)
    }

    /// Lists visible comments, optionally for one issue.
    pub fn list_comments(
        &self,
        principal: &Principal,
        issue_id: Option<IssueId>,
    ) -> ServiceResult<Vec<Comment>> {
        let mut query = CommentListQuery::new(scope_for(principal, ResourceKind::Comment));
        query.issue_id = issue_id;
        let comments = self.repo.list_comments(&query)?;
        check_listing(&self.index, &query.scope, &comments, |comment| comment.project_id)?;
        Ok(comments)
    }

    pub fn update_comment(
        &self,
        principal: &Principal,
        id: CommentId,
        patch: &CommentPatch,
    ) -> ServiceResult<Comment> {
        let mut comment = found(self.repo.get_comment(id)?)?;
        authorize::<CommentPolicy, _>(&self.index, principal, Request::Read(&comment))?;
        guard_update(&comment, patch)?;
        authorize::<CommentPolicy, _>(&self.index, principal, Request::Update(&comment, patch))?;

        patch.apply_to(&mut comment);
        Ok(self.repo.update_comment(&comment)?)
    }

    pub fn delete_comment(&self, principal: &Principal, id: CommentId) -> ServiceResult<()> {
        let comment = found(self.repo.get_comment(id)?)?;
        authorize::<CommentPolicy, _>(&self.index, principal, Request::Delete(&comment))?;
        self.repo.delete_comment(id)?;
        info!("event=comment_delete module=service status=ok comment_id={id}");
        Ok(())
    }
}

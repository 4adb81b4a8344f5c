//! Issue use-case service.
//!
//! # Invariants
//! - Issues are created and listed only inside projects the principal
//!   contributes to.
//! - `project` and `author` are write-once; the assignee is re-checked on
//!   every change.

use super::{authorize, check_listing, found, ServiceResult};
use crate::access::guard::guard_update;
use crate::access::membership::MembershipIndex;
use crate::access::policy::IssuePolicy;
use crate::access::scope::scope_for;
use crate::access::{Request, ResourceKind};
use crate::model::issue::{Issue, IssueId, IssuePatch, NewIssue};
use crate::model::user::Principal;
use crate::repo::issue_repo::{IssueListQuery, IssueRepository};
use log::info;

/// Issue service facade over a repository and a membership index.
pub struct IssueService<R: IssueRepository, M: MembershipIndex> {
    repo: R,
    index: M,
}

impl<R: IssueRepository, M: MembershipIndex> IssueService<R, M> {
    pub fn new(repo: R, index: M) -> Self {
        Self { repo, index }
    }

    pub fn create_issue(&self, principal: &Principal, draft: &NewIssue) -> ServiceResult<Issue> {
        authorize::<IssuePolicy, _>(&self.index, principal, Request::Create(draft))?;
        let issue = self.repo.create_issue(draft)?;
        info!(
            "event=issue_create module=service status=ok project_id={} issue_id={}",
            issue.project_id, issue.id
        );
        Ok(issue)
    }

    pub fn get_issue(&self, principal: &Principal, id: IssueId) -> ServiceResult<Issue> {
        let issue = found(self.repo.get_issue(id)?)?;
        authorize::<IssuePolicy, _>(&self.index, principal, Request::Read(&issue))?;
        Ok(issue)
    }

    /// Lists visible issues, optionally filtered by exact title.
    pub fn list_issues(
        &self,
        principal: &Principal,
        title: Option<&str>,
    ) -> ServiceResult<Vec<Issue>> {
        let mut query = IssueListQuery::new(scope_for(principal, ResourceKind::Issue));
        query.title = title.map(str::to_string);
        let issues = self.repo.list_issues(&query)?;
        check_listing(&self.index, &query.scope, &issues, |issue| issue.project_id)?;
        Ok(issues)
    }

    pub fn update_issue(
        &self,
        principal: &Principal,
        id: IssueId,
        patch: &IssuePatch,
    ) -> ServiceResult<Issue> {
        let mut issue = found(self.repo.get_issue(id)?)?;
        authorize::<IssuePolicy, _>(&self.index, principal, Request::Read(&issue))?;
        guard_update(&issue, patch)?;
        authorize::<IssuePolicy, _>(&self.index, principal, Request::Update(&issue, patch))?;

        patch.apply_to(&mut issue);
        let updated = self.repo.update_issue(&issue)?;
        info!(
            "event=issue_update module=service status=ok issue_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes an issue and its comments.
    pub fn delete_issue(&self, principal: &Principal, id: IssueId) -> ServiceResult<()> {
        let issue = found(self.repo.get_issue(id)?)?;
        authorize::<IssuePolicy, _>(&self.index, principal, Request::Delete(&issue))?;
        self.repo.delete_issue(id)?;
        info!("event=issue_delete module=service status=ok issue_id={id}");
        Ok(())
    }
}

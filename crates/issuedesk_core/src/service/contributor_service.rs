//! Contributor membership use-case service.
//!
//! # Invariants
//! - Only the project author adds or removes contributors.
//! - A `(user, project)` pair exists at most once.
//! - The project author always remains a contributor of their project.

use super::{authorize, check_listing, found, ServiceError, ServiceResult};
use crate::access::membership::MembershipIndex;
use crate::access::policy::ContributorPolicy;
use crate::access::scope::scope_for;
use crate::access::{Denial, Request, ResourceKind};
use crate::model::contributor::{Contributor, ContributorId, NewContributor};
use crate::model::project::ProjectId;
use crate::model::user::Principal;
use crate::repo::contributor_repo::{ContributorListQuery, ContributorRepository};
use crate::repo::RepoError;
use log::info;

const DUPLICATE_MESSAGE: &str = "user is already a contributor of this project";

/// Contributor service facade over a repository and a membership index.
pub struct ContributorService<R: ContributorRepository, M: MembershipIndex> {
    repo: R,
    index: M,
}

impl<R: ContributorRepository, M: MembershipIndex> ContributorService<R, M> {
    pub fn new(repo: R, index: M) -> Self {
        Self { repo, index }
    }

    /// Adds `draft.user_id` to `draft.project_id`.
    ///
    /// # Errors
    /// - `Forbidden` unless `principal` authored the project.
    /// - `Validation` on `user` for an existing pair or an unknown user.
    pub fn add_contributor(
        &self,
        principal: &Principal,
        draft: &NewContributor,
    ) -> ServiceResult<Contributor> {
        authorize::<ContributorPolicy, _>(&self.index, principal, Request::Create(draft))?;
        if self
            .index
            .exists_contributor(draft.user_id, draft.project_id)?
        {
            return Err(Denial::validation("user", DUPLICATE_MESSAGE).into());
        }

        let contributor = self.repo.create_contributor(draft).map_err(|err| match err {
            RepoError::Duplicate(_) => Denial::validation("user", DUPLICATE_MESSAGE).into(),
            RepoError::MissingReference(_) => {
                Denial::validation("user", "user does not exist").into()
            }
            other => ServiceError::from(other),
        })?;
        info!(
            "event=contributor_add module=service status=ok project_id={} contributor_id={}",
            contributor.project_id, contributor.id
        );
        Ok(contributor)
    }

    pub fn get_contributor(
        &self,
        principal: &Principal,
        id: ContributorId,
    ) -> ServiceResult<Contributor> {
        let contributor = found(self.repo.get_contributor(id)?)?;
        authorize::<ContributorPolicy, _>(&self.index, principal, Request::Read(&contributor))?;
        Ok(contributor)
    }

    /// Lists visible membership records, optionally for one project.
    pub fn list_contributors(
        &self,
        principal: &Principal,
        project_id: Option<ProjectId>,
    ) -> ServiceResult<Vec<Contributor>> {
        let mut query = ContributorListQuery::new(scope_for(principal, ResourceKind::Contributor));
        query.project_id = project_id;
        let contributors = self.repo.list_contributors(&query)?;
        check_listing(&self.index, &query.scope, &contributors, |contributor| {
            contributor.project_id
        })?;
        Ok(contributors)
    }

    /// Membership records are immutable; visible records answer `Forbidden`.
    pub fn update_contributor(
        &self,
        principal: &Principal,
        id: ContributorId,
    ) -> ServiceResult<Contributor> {
        let contributor = found(self.repo.get_contributor(id)?)?;
        authorize::<ContributorPolicy, _>(&self.index, principal, Request::Read(&contributor))?;
        Err(Denial::forbidden("contributor records cannot be modified").into())
    }

    pub fn remove_contributor(&self, principal: &Principal, id: ContributorId) -> ServiceResult<()> {
        let contributor = found(self.repo.get_contributor(id)?)?;
        authorize::<ContributorPolicy, _>(&self.index, principal, Request::Delete(&contributor))?;
        if self.index.project_author(contributor.project_id)? == Some(contributor.user_id) {
            return Err(Denial::validation(
                "user",
                "the project author cannot be removed from contributors",
            )
            .into());
        }

        self.repo.delete_contributor(id)?;
        info!(
            "event=contributor_remove module=service status=ok project_id={} contributor_id={id}",
            contributor.project_id
        );
        Ok(())
    }
}

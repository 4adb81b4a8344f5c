//! Project use-case service and lifecycle coordination.
//!
//! # Responsibility
//! - Create projects so that the author is a contributor from the first
//!   committed moment.
//! - Gate every project read and write through `ProjectPolicy`.
//!
//! # Invariants
//! - After a successful create, `is_contributor(author, project)` holds;
//!   otherwise the call reports `InconsistentState`.
//! - `author` is write-once.

use super::{authorize, check_listing, found, ServiceError, ServiceResult};
use crate::access::guard::guard_update;
use crate::access::membership::MembershipIndex;
use crate::access::policy::ProjectPolicy;
use crate::access::scope::scope_for;
use crate::access::{Request, ResourceKind};
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::user::Principal;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use log::{info, warn};

/// Project service facade over a repository and a membership index.
pub struct ProjectService<R: ProjectRepository, M: MembershipIndex> {
    repo: R,
    index: M,
}

impl<R: ProjectRepository, M: MembershipIndex> ProjectService<R, M> {
    pub fn new(repo: R, index: M) -> Self {
        Self { repo, index }
    }

    /// Creates a project authored by `principal`.
    pub fn create_project(
        &self,
        principal: &Principal,
        draft: &NewProject,
    ) -> ServiceResult<Project> {
        authorize::<ProjectPolicy, _>(&self.index, principal, Request::Create(draft))?;

        let project = self.repo.create_project_with_author(draft).map_err(|err| {
            warn!("event=project_create module=service status=error error={err}");
            ServiceError::from(err)
        })?;
        if !self.index.is_contributor(project.author_id, project.id)? {
            return Err(ServiceError::InconsistentState(
                "project author missing from contributors after create",
            ));
        }

        info!(
            "event=project_create module=service status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    pub fn get_project(&self, principal: &Principal, id: ProjectId) -> ServiceResult<Project> {
        let project = found(self.repo.get_project(id)?)?;
        authorize::<ProjectPolicy, _>(&self.index, principal, Request::Read(&project))?;
        Ok(project)
    }

    /// Lists visible projects, optionally filtered by exact description.
    pub fn list_projects(
        &self,
        principal: &Principal,
        description: Option<&str>,
    ) -> ServiceResult<Vec<Project>> {
        let mut query = ProjectListQuery::new(scope_for(principal, ResourceKind::Project));
        query.description = description.map(str::to_string);
        let projects = self.repo.list_projects(&query)?;
        check_listing(&self.index, &query.scope, &projects, |project| project.id)?;
        Ok(projects)
    }

    pub fn update_project(
        &self,
        principal: &Principal,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> ServiceResult<Project> {
        let mut project = found(self.repo.get_project(id)?)?;
        authorize::<ProjectPolicy, _>(&self.index, principal, Request::Read(&project))?;
        guard_update(&project, patch)?;
        authorize::<ProjectPolicy, _>(&self.index, principal, Request::Update(&project, patch))?;

        patch.apply_to(&mut project);
        let updated = self.repo.update_project(&project)?;
        info!(
            "event=project_update module=service status=ok project_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes a project together with its contributors, issues and comments.
    pub fn delete_project(&self, principal: &Principal, id: ProjectId) -> ServiceResult<()> {
        let project = found(self.repo.get_project(id)?)?;
        authorize::<ProjectPolicy, _>(&self.index, principal, Request::Delete(&project))?;
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }
}

//! Contributor membership model.
//!
//! A contributor record is the fact "user X may see and write inside
//! project Y". At most one record exists per `(user, project)` pair.

use super::project::ProjectId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable contributor record identifier.
pub type ContributorId = Uuid;

/// Persisted membership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "project")]
    pub project_id: ProjectId,
    pub created_at: i64,
}

/// Membership creation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContributor {
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "project")]
    pub project_id: ProjectId,
}

impl NewContributor {
    pub fn new(user_id: UserId, project_id: ProjectId) -> Self {
        Self {
            user_id,
            project_id,
        }
    }
}

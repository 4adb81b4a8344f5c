//! Comment model.
//!
//! `Comment::project_id` is not stored on the comment row; repositories
//! resolve it through the parent issue so visibility checks need no extra
//! lookup.

use super::issue::IssueId;
use super::project::ProjectId;
use super::user::UserId;
use super::{check_required_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable comment identifier.
pub type CommentId = Uuid;

const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Comment read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(rename = "issue")]
    pub issue_id: IssueId,
    /// Project of the parent issue.
    #[serde(rename = "project")]
    pub project_id: ProjectId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    #[serde(rename = "issue")]
    pub issue_id: IssueId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    pub description: String,
}

impl NewComment {
    pub fn new(issue_id: IssueId, author_id: UserId, description: impl Into<String>) -> Self {
        Self {
            issue_id,
            author_id,
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required_text("description", &self.description, DESCRIPTION_MAX_CHARS)
    }
}

/// Partial update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPatch {
    #[serde(rename = "issue", default)]
    pub issue_id: Option<IssueId>,
    #[serde(rename = "author", default)]
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CommentPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(description) = self.description.as_deref() {
            check_required_text("description", description, DESCRIPTION_MAX_CHARS)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, comment: &mut Comment) {
        if let Some(description) = self.description.as_ref() {
            comment.description = description.clone();
        }
    }
}

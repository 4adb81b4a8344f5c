//! Project model.
//!
//! # Invariants
//! - `author_id` never changes after creation.
//! - The author is registered as a contributor in the creating transaction.

use super::user::UserId;
use super::{check_required_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Platform a project targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectType {
    #[default]
    #[serde(rename = "front-end")]
    FrontEnd,
    #[serde(rename = "back-end")]
    BackEnd,
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "ios")]
    Ios,
}

impl ProjectType {
    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrontEnd => "front-end",
            Self::BackEnd => "back-end",
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "front-end" => Some(Self::FrontEnd),
            "back-end" => Some(Self::BackEnd),
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }
}

/// Persisted project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    #[serde(rename = "author")]
    pub author_id: UserId,
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ProjectType,
}

impl NewProject {
    pub fn new(author_id: UserId, description: impl Into<String>, kind: ProjectType) -> Self {
        Self {
            author_id,
            description: description.into(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required_text("description", &self.description, DESCRIPTION_MAX_CHARS)
    }
}

/// Partial update payload. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// Write-once; only accepted when equal to the stored author.
    #[serde(rename = "author", default)]
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<ProjectType>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(description) = self.description.as_deref() {
            check_required_text("description", description, DESCRIPTION_MAX_CHARS)?;
        }
        Ok(())
    }

    /// Copies mutable fields onto `project`. Write-once fields are ignored.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(description) = self.description.as_ref() {
            project.description = description.clone();
        }
        if let Some(kind) = self.kind {
            project.kind = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewProject, ProjectType};
    use uuid::Uuid;

    #[test]
    fn project_type_round_trips_storage_value() {
        for kind in [
            ProjectType::FrontEnd,
            ProjectType::BackEnd,
            ProjectType::Android,
            ProjectType::Ios,
        ] {
            assert_eq!(ProjectType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ProjectType::parse("Invalid type"), None);
    }

    #[test]
    fn blank_description_is_rejected() {
        let draft = NewProject::new(Uuid::new_v4(), "  ", ProjectType::Ios);
        let err = draft.validate().expect_err("blank description must fail");
        assert_eq!(err.field, "description");
    }
}

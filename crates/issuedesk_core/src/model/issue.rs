//! Issue model.
//!
//! # Responsibility
//! - Define the issue record and its create/update payloads.
//! - Validate title/description/priority formats.
//!
//! # Invariants
//! - `project_id` and `author_id` are write-once.
//! - `assigned_user_id`, when set, names a contributor of `project_id`
//!   (checked by the access evaluator, not here).

use super::project::ProjectId;
use super::user::UserId;
use super::{check_required_text, check_text_length, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable issue identifier.
pub type IssueId = Uuid;

pub const ISSUE_PRIORITY_MAX: u8 = 5;
pub const ISSUE_PRIORITY_DEFAULT: u8 = ISSUE_PRIORITY_MAX;

const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    Bug,
    Todo,
    Feature,
}

impl IssueTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Todo => "todo",
            Self::Feature => "feature",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bug" => Some(Self::Bug),
            "todo" => Some(Self::Todo),
            "feature" => Some(Self::Feature),
            _ => None,
        }
    }
}

/// Issue progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    #[default]
    InWork,
    Released,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InWork => "in_work",
            Self::Released => "released",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_work" => Some(Self::InWork),
            "released" => Some(Self::Released),
            _ => None,
        }
    }
}

/// Persisted issue record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    #[serde(rename = "project")]
    pub project_id: ProjectId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    #[serde(rename = "assigned_user")]
    pub assigned_user_id: Option<UserId>,
    pub tag: IssueTag,
    pub state: IssueState,
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    #[serde(rename = "project")]
    pub project_id: ProjectId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    #[serde(rename = "assigned_user", default)]
    pub assigned_user_id: Option<UserId>,
    pub tag: IssueTag,
    #[serde(default)]
    pub state: IssueState,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    ISSUE_PRIORITY_DEFAULT
}

impl NewIssue {
    /// Creates a payload with default state, priority and empty description.
    pub fn new(
        project_id: ProjectId,
        author_id: UserId,
        tag: IssueTag,
        title: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            author_id,
            assigned_user_id: None,
            tag,
            state: IssueState::default(),
            title: title.into(),
            description: String::new(),
            priority: ISSUE_PRIORITY_DEFAULT,
        }
    }

    pub fn with_assignee(mut self, user_id: UserId) -> Self {
        self.assigned_user_id = Some(user_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required_text("title", &self.title, TITLE_MAX_CHARS)?;
        check_text_length("description", &self.description, DESCRIPTION_MAX_CHARS)?;
        check_priority(self.priority)
    }
}

/// Partial update payload.
///
/// `assigned_user_id` distinguishes "leave as is" (`None`) from "clear the
/// assignee" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePatch {
    #[serde(rename = "project", default)]
    pub project_id: Option<ProjectId>,
    #[serde(rename = "author", default)]
    pub author_id: Option<UserId>,
    #[serde(
        rename = "assigned_user",
        default,
        deserialize_with = "deserialize_present"
    )]
    pub assigned_user_id: Option<Option<UserId>>,
    #[serde(default)]
    pub tag: Option<IssueTag>,
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
}

impl IssuePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = self.title.as_deref() {
            check_required_text("title", title, TITLE_MAX_CHARS)?;
        }
        if let Some(description) = self.description.as_deref() {
            check_text_length("description", description, DESCRIPTION_MAX_CHARS)?;
        }
        if let Some(priority) = self.priority {
            check_priority(priority)?;
        }
        Ok(())
    }

    /// The assignee this patch would set, if it sets a non-empty one.
    pub fn new_assignee(&self) -> Option<UserId> {
        self.assigned_user_id.flatten()
    }

    /// Copies mutable fields onto `issue`. Write-once fields are ignored.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(assigned_user_id) = self.assigned_user_id {
            issue.assigned_user_id = assigned_user_id;
        }
        if let Some(tag) = self.tag {
            issue.tag = tag;
        }
        if let Some(state) = self.state {
            issue.state = state;
        }
        if let Some(title) = self.title.as_ref() {
            issue.title = title.clone();
        }
        if let Some(description) = self.description.as_ref() {
            issue.description = description.clone();
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
    }
}

fn check_priority(priority: u8) -> Result<(), ValidationError> {
    if priority > ISSUE_PRIORITY_MAX {
        return Err(ValidationError::new(
            "priority",
            format!("ensure this value is less than or equal to {ISSUE_PRIORITY_MAX}"),
        ));
    }
    Ok(())
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{IssuePatch, IssueState, IssueTag, NewIssue, ISSUE_PRIORITY_DEFAULT};
    use uuid::Uuid;

    #[test]
    fn new_issue_uses_documented_defaults() {
        let issue = NewIssue::new(Uuid::new_v4(), Uuid::new_v4(), IssueTag::Todo, "TODO Issue");
        assert_eq!(issue.state, IssueState::InWork);
        assert_eq!(issue.priority, ISSUE_PRIORITY_DEFAULT);
        assert!(issue.description.is_empty());
        issue.validate().expect("defaults should validate");
    }

    #[test]
    fn priority_above_five_is_rejected() {
        let mut issue = NewIssue::new(Uuid::new_v4(), Uuid::new_v4(), IssueTag::Bug, "crash");
        issue.priority = 6;
        let err = issue.validate().expect_err("priority 6 must fail");
        assert_eq!(err.field, "priority");
    }

    #[test]
    fn long_title_is_rejected() {
        let issue = NewIssue::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            IssueTag::Feature,
            "x".repeat(101),
        );
        assert_eq!(issue.validate().expect_err("too long").field, "title");
    }

    #[test]
    fn patch_distinguishes_absent_and_null_assignee() {
        let absent: IssuePatch = serde_json::from_str(r#"{"title":"t"}"#).expect("parse");
        assert_eq!(absent.assigned_user_id, None);

        let cleared: IssuePatch =
            serde_json::from_str(r#"{"assigned_user":null}"#).expect("parse");
        assert_eq!(cleared.assigned_user_id, Some(None));
        assert_eq!(cleared.new_assignee(), None);
    }

    #[test]
    fn tag_and_state_use_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&IssueState::InWork).expect("serialize"),
            "\"in_work\""
        );
        assert_eq!(IssueTag::parse("feature"), Some(IssueTag::Feature));
        assert_eq!(IssueState::parse(IssueState::Released.as_str()), Some(IssueState::Released));
    }
}

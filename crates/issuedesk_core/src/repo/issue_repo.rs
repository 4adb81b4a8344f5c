//! Issue repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `project_id` and `author_id` are never rewritten by `update_issue`.
//! - Deleting an issue cascades to its comments.

use super::{classify_write_error, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::access::scope::VisibilityScope;
use crate::model::issue::{Issue, IssueId, IssueState, IssueTag, NewIssue};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const ISSUE_SELECT_SQL: &str = "SELECT
    issues.id,
    issues.project_id,
    issues.author_id,
    issues.assigned_user_id,
    issues.tag,
    issues.state,
    issues.title,
    issues.description,
    issues.priority,
    issues.created_at,
    issues.updated_at
FROM issues";

/// Query options for issue listings.
#[derive(Debug, Clone)]
pub struct IssueListQuery {
    pub scope: VisibilityScope,
    /// Exact title match.
    pub title: Option<String>,
}

impl IssueListQuery {
    pub fn new(scope: VisibilityScope) -> Self {
        Self { scope, title: None }
    }
}

/// Repository interface for issue persistence.
pub trait IssueRepository {
    fn create_issue(&self, issue: &NewIssue) -> RepoResult<Issue>;
    fn get_issue(&self, id: IssueId) -> RepoResult<Option<Issue>>;
    fn list_issues(&self, query: &IssueListQuery) -> RepoResult<Vec<Issue>>;
    /// Persists mutable fields of `issue` and bumps `updated_at`.
    fn update_issue(&self, issue: &Issue) -> RepoResult<Issue>;
    fn delete_issue(&self, id: IssueId) -> RepoResult<()>;
}

/// SQLite-backed issue repository.
pub struct SqliteIssueRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIssueRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["issues"])?;
        Ok(Self { conn })
    }
}

impl IssueRepository for SqliteIssueRepository<'_> {
    fn create_issue(&self, issue: &NewIssue) -> RepoResult<Issue> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO issues (
                    id,
                    project_id,
                    author_id,
                    assigned_user_id,
                    tag,
                    state,
                    title,
                    description,
                    priority
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    id.to_string(),
                    issue.project_id.to_string(),
                    issue.author_id.to_string(),
                    issue.assigned_user_id.map(|user_id| user_id.to_string()),
                    issue.tag.as_str(),
                    issue.state.as_str(),
                    issue.title.as_str(),
                    issue.description.as_str(),
                    issue.priority,
                ],
            )
            .map_err(|err| classify_write_error(err, "issue"))?;

        self.get_issue(id)?
            .ok_or(RepoError::NotFound { entity: "issue", id })
    }

    fn get_issue(&self, id: IssueId) -> RepoResult<Option<Issue>> {
        self.conn
            .query_row(
                &format!("{ISSUE_SELECT_SQL} WHERE issues.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_issue_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_issues(&self, query: &IssueListQuery) -> RepoResult<Vec<Issue>> {
        let scope = query.scope.sql_predicate();
        let mut sql = format!("{ISSUE_SELECT_SQL} WHERE {}", scope.clause);
        let mut bind_values: Vec<Value> = scope.params;

        if let Some(title) = query.title.as_ref() {
            sql.push_str(" AND issues.title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        sql.push_str(" ORDER BY issues.created_at ASC, issues.rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut issues = Vec::new();
        while let Some(row) = rows.next()? {
            issues.push(parse_issue_row(row)?);
        }
        Ok(issues)
    }

    fn update_issue(&self, issue: &Issue) -> RepoResult<Issue> {
        let changed = self
            .conn
            .execute(
                "UPDATE issues
                 SET
                    assigned_user_id = ?2,
                    tag = ?3,
                    state = ?4,
                    title = ?5,
                    description = ?6,
                    priority = ?7,
                    updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
                 WHERE id = ?1;",
                params![
                    issue.id.to_string(),
                    issue.assigned_user_id.map(|user_id| user_id.to_string()),
                    issue.tag.as_str(),
                    issue.state.as_str(),
                    issue.title.as_str(),
                    issue.description.as_str(),
                    issue.priority,
                ],
            )
            .map_err(|err| classify_write_error(err, "issue"))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "issue",
                id: issue.id,
            });
        }

        self.get_issue(issue.id)?.ok_or(RepoError::NotFound {
            entity: "issue",
            id: issue.id,
        })
    }

    fn delete_issue(&self, id: IssueId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM issues WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "issue", id });
        }
        Ok(())
    }
}

fn parse_issue_row(row: &Row<'_>) -> RepoResult<Issue> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    let author_text: String = row.get("author_id")?;
    let assignee_text: Option<String> = row.get("assigned_user_id")?;
    let tag_text: String = row.get("tag")?;
    let state_text: String = row.get("state")?;
    let priority: i64 = row.get("priority")?;

    let tag = IssueTag::parse(&tag_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid issue tag `{tag_text}` in issues.tag"))
    })?;
    let state = IssueState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid issue state `{state_text}` in issues.state"))
    })?;
    let priority = u8::try_from(priority).map_err(|_| {
        RepoError::InvalidData(format!("invalid priority `{priority}` in issues.priority"))
    })?;
    let assigned_user_id = assignee_text
        .as_deref()
        .map(|value| parse_uuid(value, "issues.assigned_user_id"))
        .transpose()?;

    Ok(Issue {
        id: parse_uuid(&id_text, "issues.id")?,
        project_id: parse_uuid(&project_text, "issues.project_id")?,
        author_id: parse_uuid(&author_text, "issues.author_id")?,
        assigned_user_id,
        tag,
        state,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

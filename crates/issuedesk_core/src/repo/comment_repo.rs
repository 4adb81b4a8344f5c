//! Comment repository contracts and SQLite implementation.
//!
//! Comments carry no project column; every read joins the parent issue to
//! fill `Comment::project_id`.

use super::{classify_write_error, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::access::scope::VisibilityScope;
use crate::model::comment::{Comment, CommentId, NewComment};
use crate::model::issue::IssueId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT
    comments.id,
    comments.issue_id,
    issues.project_id,
    comments.author_id,
    comments.description,
    comments.created_at,
    comments.updated_at
FROM comments
INNER JOIN issues ON issues.id = comments.issue_id";

/// Query options for comment listings.
#[derive(Debug, Clone)]
pub struct CommentListQuery {
    pub scope: VisibilityScope,
    pub issue_id: Option<IssueId>,
}

impl CommentListQuery {
    pub fn new(scope: VisibilityScope) -> Self {
        Self {
            scope,
            issue_id: None,
        }
    }
}

/// Repository interface for comment persistence.
pub trait CommentRepository {
    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn list_comments(&self, query: &CommentListQuery) -> RepoResult<Vec<Comment>>;
    fn update_comment(&self, comment: &Comment) -> RepoResult<Comment>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["comments", "issues"])?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO comments (id, issue_id, author_id, description)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    id.to_string(),
                    comment.issue_id.to_string(),
                    comment.author_id.to_string(),
                    comment.description.as_str(),
                ],
            )
            .map_err(|err| classify_write_error(err, "comment"))?;

        self.get_comment(id)?.ok_or(RepoError::NotFound {
            entity: "comment",
            id,
        })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        self.conn
            .query_row(
                &format!("{COMMENT_SELECT_SQL} WHERE comments.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_comment_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_comments(&self, query: &CommentListQuery) -> RepoResult<Vec<Comment>> {
        let scope = query.scope.sql_predicate();
        let mut sql = format!("{COMMENT_SELECT_SQL} WHERE {}", scope.clause);
        let mut bind_values: Vec<Value> = scope.params;

        if let Some(issue_id) = query.issue_id {
            sql.push_str(" AND comments.issue_id = ?");
            bind_values.push(Value::Text(issue_id.to_string()));
        }
        sql.push_str(" ORDER BY comments.created_at ASC, comments.rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn update_comment(&self, comment: &Comment) -> RepoResult<Comment> {
        let changed = self.conn.execute(
            "UPDATE comments
             SET
                description = ?2,
                updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
             WHERE id = ?1;",
            params![comment.id.to_string(), comment.description.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id: comment.id,
            });
        }

        self.get_comment(comment.id)?.ok_or(RepoError::NotFound {
            entity: "comment",
            id: comment.id,
        })
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id,
            });
        }
        Ok(())
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id_text: String = row.get("id")?;
    let issue_text: String = row.get("issue_id")?;
    let project_text: String = row.get("project_id")?;
    let author_text: String = row.get("author_id")?;

    Ok(Comment {
        id: parse_uuid(&id_text, "comments.id")?,
        issue_id: parse_uuid(&issue_text, "comments.issue_id")?,
        project_id: parse_uuid(&project_text, "issues.project_id")?,
        author_id: parse_uuid(&author_text, "comments.author_id")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects together with the author's contributor record.
//! - Provide scope-restricted project listings.
//!
//! # Invariants
//! - `create_project_with_author` writes the project row and the author
//!   membership in one immediate transaction; either both commit or
//!   neither does.
//! - Deleting a project cascades to its contributors, issues and comments
//!   through foreign keys.

use super::{classify_write_error, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::access::scope::VisibilityScope;
use crate::model::project::{NewProject, Project, ProjectId, ProjectType};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    projects.id,
    projects.author_id,
    projects.description,
    projects.type,
    projects.created_at,
    projects.updated_at
FROM projects";

/// Query options for project listings.
#[derive(Debug, Clone)]
pub struct ProjectListQuery {
    /// Rows the caller may see. Always applied.
    pub scope: VisibilityScope,
    /// Exact description match.
    pub description: Option<String>,
}

impl ProjectListQuery {
    pub fn new(scope: VisibilityScope) -> Self {
        Self {
            scope,
            description: None,
        }
    }
}

/// Repository interface for project persistence.
pub trait ProjectRepository {
    /// Inserts the project and registers its author as contributor.
    fn create_project_with_author(&self, project: &NewProject) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    /// Persists mutable fields of `project` and bumps `updated_at`.
    fn update_project(&self, project: &Project) -> RepoResult<Project>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["projects", "contributors"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project_with_author(&self, project: &NewProject) -> RepoResult<Project> {
        let project_id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO projects (id, author_id, description, type)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project_id.to_string(),
                project.author_id.to_string(),
                project.description.as_str(),
                project.kind.as_str(),
            ],
        )
        .map_err(|err| classify_write_error(err, "project"))?;
        tx.execute(
            "INSERT INTO contributors (id, user_id, project_id)
             VALUES (?1, ?2, ?3);",
            params![
                Uuid::new_v4().to_string(),
                project.author_id.to_string(),
                project_id.to_string(),
            ],
        )
        .map_err(|err| classify_write_error(err, "contributor"))?;
        tx.commit()?;

        self.get_project(project_id)?.ok_or(RepoError::NotFound {
            entity: "project",
            id: project_id,
        })
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE projects.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_project_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let scope = query.scope.sql_predicate();
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE {}", scope.clause);
        let mut bind_values: Vec<Value> = scope.params;

        if let Some(description) = query.description.as_ref() {
            sql.push_str(" AND projects.description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        sql.push_str(" ORDER BY projects.created_at ASC, projects.rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> RepoResult<Project> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                description = ?2,
                type = ?3,
                updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.description.as_str(),
                project.kind.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id: project.id,
            });
        }

        self.get_project(project.id)?.ok_or(RepoError::NotFound {
            entity: "project",
            id: project.id,
        })
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let author_text: String = row.get("author_id")?;
    let kind_text: String = row.get("type")?;
    let kind = ProjectType::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid project type `{kind_text}` in projects.type"))
    })?;

    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        author_id: parse_uuid(&author_text, "projects.author_id")?,
        description: row.get("description")?,
        kind,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

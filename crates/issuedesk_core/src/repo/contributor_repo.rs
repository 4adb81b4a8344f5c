//! Contributor repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(user_id, project_id)` is unique; a second insert of the same pair
//!   is `RepoError::Duplicate("contributor")`.
//! - An insert naming a missing user or project is
//!   `RepoError::MissingReference("contributor")`.

use super::{classify_write_error, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::access::scope::VisibilityScope;
use crate::model::contributor::{Contributor, ContributorId, NewContributor};
use crate::model::project::ProjectId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const CONTRIBUTOR_SELECT_SQL: &str = "SELECT
    contributors.id,
    contributors.user_id,
    contributors.project_id,
    contributors.created_at
FROM contributors";

/// Query options for contributor listings.
#[derive(Debug, Clone)]
pub struct ContributorListQuery {
    pub scope: VisibilityScope,
    pub project_id: Option<ProjectId>,
}

impl ContributorListQuery {
    pub fn new(scope: VisibilityScope) -> Self {
        Self {
            scope,
            project_id: None,
        }
    }
}

/// Repository interface for membership records.
pub trait ContributorRepository {
    fn create_contributor(&self, contributor: &NewContributor) -> RepoResult<Contributor>;
    fn get_contributor(&self, id: ContributorId) -> RepoResult<Option<Contributor>>;
    fn list_contributors(&self, query: &ContributorListQuery) -> RepoResult<Vec<Contributor>>;
    fn delete_contributor(&self, id: ContributorId) -> RepoResult<()>;
}

/// SQLite-backed contributor repository.
pub struct SqliteContributorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContributorRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["contributors"])?;
        Ok(Self { conn })
    }
}

impl ContributorRepository for SqliteContributorRepository<'_> {
    fn create_contributor(&self, contributor: &NewContributor) -> RepoResult<Contributor> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO contributors (id, user_id, project_id)
                 VALUES (?1, ?2, ?3);",
                params![
                    id.to_string(),
                    contributor.user_id.to_string(),
                    contributor.project_id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "contributor"))?;

        self.get_contributor(id)?.ok_or(RepoError::NotFound {
            entity: "contributor",
            id,
        })
    }

    fn get_contributor(&self, id: ContributorId) -> RepoResult<Option<Contributor>> {
        self.conn
            .query_row(
                &format!("{CONTRIBUTOR_SELECT_SQL} WHERE contributors.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_contributor_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_contributors(&self, query: &ContributorListQuery) -> RepoResult<Vec<Contributor>> {
        let scope = query.scope.sql_predicate();
        let mut sql = format!("{CONTRIBUTOR_SELECT_SQL} WHERE {}", scope.clause);
        let mut bind_values: Vec<Value> = scope.params;

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND contributors.project_id = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }
        sql.push_str(" ORDER BY contributors.created_at ASC, contributors.rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut contributors = Vec::new();
        while let Some(row) = rows.next()? {
            contributors.push(parse_contributor_row(row)?);
        }
        Ok(contributors)
    }

    fn delete_contributor(&self, id: ContributorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contributors WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contributor",
                id,
            });
        }
        Ok(())
    }
}

fn parse_contributor_row(row: &Row<'_>) -> RepoResult<Contributor> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let project_text: String = row.get("project_id")?;

    Ok(Contributor {
        id: parse_uuid(&id_text, "contributors.id")?,
        user_id: parse_uuid(&user_text, "contributors.user_id")?,
        project_id: parse_uuid(&project_text, "contributors.project_id")?,
        created_at: row.get("created_at")?,
    })
}

//! SQLite implementation of the membership index.
//!
//! Every call reads the current committed state of `contributors`,
//! `projects` and `issues`; nothing is memoized.

use super::{ensure_connection_ready, parse_uuid, RepoResult};
use crate::access::membership::MembershipIndex;
use crate::model::issue::IssueId;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeSet;

/// Membership index backed by the `contributors` table.
pub struct SqliteMembershipIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMembershipIndex<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["contributors", "projects", "issues"])?;
        Ok(Self { conn })
    }

    fn pair_exists(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM contributors
                WHERE user_id = ?1 AND project_id = ?2
            );",
            [user_id.to_string(), project_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl MembershipIndex for SqliteMembershipIndex<'_> {
    fn is_contributor(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool> {
        self.pair_exists(user_id, project_id)
    }

    fn projects_of(&self, user_id: UserId) -> RepoResult<BTreeSet<ProjectId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT project_id FROM contributors WHERE user_id = ?1;")?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut projects = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let project_text: String = row.get(0)?;
            projects.insert(parse_uuid(&project_text, "contributors.project_id")?);
        }
        Ok(projects)
    }

    fn exists_contributor(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<bool> {
        self.pair_exists(user_id, project_id)
    }

    fn project_author(&self, project_id: ProjectId) -> RepoResult<Option<UserId>> {
        let author_text: Option<String> = self
            .conn
            .query_row(
                "SELECT author_id FROM projects WHERE id = ?1;",
                [project_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        author_text
            .as_deref()
            .map(|value| parse_uuid(value, "projects.author_id"))
            .transpose()
    }

    fn issue_project(&self, issue_id: IssueId) -> RepoResult<Option<ProjectId>> {
        let project_text: Option<String> = self
            .conn
            .query_row(
                "SELECT project_id FROM issues WHERE id = ?1;",
                [issue_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        project_text
            .as_deref()
            .map(|value| parse_uuid(value, "issues.project_id"))
            .transpose()
    }
}

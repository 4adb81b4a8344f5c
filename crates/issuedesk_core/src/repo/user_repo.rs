//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `username` uniqueness is enforced by storage and reported as
//!   `RepoError::Duplicate("user")`.

use super::{
    bool_to_int, classify_write_error, ensure_connection_ready, parse_bool, parse_uuid,
    RepoError, RepoResult,
};
use crate::model::user::{NewUser, User, UserId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    age,
    can_be_contacted,
    can_data_be_shared,
    created_at
FROM users";

/// Repository interface for user registry operations.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Lists users, optionally restricted to one exact username.
    fn list_users(&self, username: Option<&str>) -> RepoResult<Vec<User>>;
    /// Persists username, age and consent flags of `user`.
    fn update_user(&self, user: &User) -> RepoResult<User>;
    /// Deletes the user. Authored projects, memberships, issues and comments
    /// go with it; assignments to the user are cleared.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO users (
                    id,
                    username,
                    age,
                    can_be_contacted,
                    can_data_be_shared
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    id.to_string(),
                    user.username.as_str(),
                    user.age,
                    bool_to_int(user.can_be_contacted),
                    bool_to_int(user.can_data_be_shared),
                ],
            )
            .map_err(|err| classify_write_error(err, "user"))?;

        self.get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_users(&self, username: Option<&str>) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(username) = username {
            sql.push_str(" AND username = ?");
            bind_values.push(Value::Text(username.to_string()));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    username = ?2,
                    age = ?3,
                    can_be_contacted = ?4,
                    can_data_be_shared = ?5
                 WHERE id = ?1;",
                params![
                    user.id.to_string(),
                    user.username.as_str(),
                    user.age,
                    bool_to_int(user.can_be_contacted),
                    bool_to_int(user.can_data_be_shared),
                ],
            )
            .map_err(|err| classify_write_error(err, "user"))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }

        self.get_user(user.id)?.ok_or(RepoError::NotFound {
            entity: "user",
            id: user.id,
        })
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let age: i64 = row.get("age")?;
    let age = u32::try_from(age)
        .map_err(|_| RepoError::InvalidData(format!("invalid age `{age}` in users.age")))?;

    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        username: row.get("username")?,
        age,
        can_be_contacted: parse_bool(row.get("can_be_contacted")?, "users.can_be_contacted")?,
        can_data_be_shared: parse_bool(
            row.get("can_data_be_shared")?,
            "users.can_data_be_shared",
        )?,
        created_at: row.get("created_at")?,
    })
}

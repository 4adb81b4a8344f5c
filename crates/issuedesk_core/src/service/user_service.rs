//! User registry service.
//!
//! Users are visible to every principal; registration only enforces format
//! rules and username uniqueness. Only the account owner may edit or delete
//! an account.

use super::{found, ServiceError, ServiceResult};
use crate::access::Denial;
use crate::model::user::{NewUser, Principal, User, UserId, UserPatch};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::info;

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a user after format validation.
    ///
    /// # Errors
    /// - `Validation` on `username` when the name is taken.
    pub fn register_user(&self, user: &NewUser) -> ServiceResult<User> {
        user.validate()?;
        let created = self.repo.create_user(user).map_err(username_taken)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_user(&self, id: UserId) -> ServiceResult<User> {
        found(self.repo.get_user(id)?)
    }

    pub fn list_users(&self, username: Option<&str>) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_users(username)?)
    }

    /// Applies `patch` to the principal's own account.
    ///
    /// # Errors
    /// - `NotFound` when the user does not exist.
    /// - `Forbidden` when `id` is not the principal's account.
    /// - `Validation` when a supplied field breaks a format rule or the new
    ///   username is taken.
    pub fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        patch: &UserPatch,
    ) -> ServiceResult<User> {
        let mut user = found(self.repo.get_user(id)?)?;
        ensure_owner(principal, id)?;
        patch.validate()?;
        patch.apply_to(&mut user);

        let updated = self.repo.update_user(&user).map_err(username_taken)?;
        info!(
            "event=user_update module=service status=ok user_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes the principal's own account along with everything it authored.
    pub fn delete_user(&self, principal: &Principal, id: UserId) -> ServiceResult<()> {
        found(self.repo.get_user(id)?)?;
        ensure_owner(principal, id)?;
        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }
}

fn ensure_owner(principal: &Principal, id: UserId) -> ServiceResult<()> {
    if principal.is(id) {
        Ok(())
    } else {
        Err(Denial::forbidden("only the account owner may change this account").into())
    }
}

fn username_taken(err: RepoError) -> ServiceError {
    match err {
        RepoError::Duplicate(_) => {
            Denial::validation("username", "a user with that username already exists").into()
        }
        other => ServiceError::from(other),
    }
}

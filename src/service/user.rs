/// User operations: validated create/update and mutual friendships.
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::models::{User, UserDraft};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::validation::validate_user;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        UserService { users }
    }

    /// Validate and store a new user; a blank name becomes the login
    pub async fn create(&self, user: UserDraft) -> AppResult<User> {
        validate_user(&user, Utc::now().date_naive())?;
        let user = user.with_default_name();

        let created = self.users.create(&user).await?;
        log::info!("Created user id={} login={:?}", created.id, created.login);
        Ok(created)
    }

    pub async fn update(&self, id: i64, user: UserDraft) -> AppResult<User> {
        validate_user(&user, Utc::now().date_naive())?;

        let updated = self.users.update(id, &user).await?;
        log::info!("Updated user id={}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.users.delete(id).await?;
        log::info!("Deleted user id={}", id);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.users.get(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    /// Both users must exist before the pair is checked
    pub async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.users.ensure_exists(user_id).await?;
        self.users.ensure_exists(friend_id).await?;
        if user_id == friend_id {
            log::warn!("User {} tried to befriend themselves", user_id);
            return Err(AppError::Validation(
                "A user cannot be their own friend".to_string(),
            ));
        }
        self.users.add_friend(user_id, friend_id).await?;
        log::info!("Users {} and {} are now friends", user_id, friend_id);
        Ok(())
    }

    pub async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.users.remove_friend(user_id, friend_id).await?;
        log::info!("Users {} and {} are no longer friends", user_id, friend_id);
        Ok(())
    }

    /// Friends of a user, ascending by id
    pub async fn friends(&self, id: i64) -> AppResult<Vec<User>> {
        let user = self.users.get(id).await?;
        let ids: Vec<i64> = user.friends.into_iter().collect();
        self.users.get_many(&ids).await
    }

    /// Users who are friends of both, ascending by id
    pub async fn common_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>> {
        let user = self.users.get(user_id).await?;
        let other = self.users.get(other_id).await?;

        let common: BTreeSet<i64> = user.friends.intersection(&other.friends).copied().collect();
        let ids: Vec<i64> = common.into_iter().collect();
        self.users.get_many(&ids).await
    }
}

/// User persistence and friendship records.
/// Friendship is mutual: one call writes or removes both directions.
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

use super::models::{User, UserDraft};
use super::DbPool;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &UserDraft) -> AppResult<User>;
    /// Overwrite the user's fields; a blank name keeps the stored one
    async fn update(&self, id: i64, user: &UserDraft) -> AppResult<User>;
    /// Remove the user together with their friendships and likes
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn get(&self, id: i64) -> AppResult<User>;
    /// Resolve ids to users in the given order, failing on the first missing id
    async fn get_many(&self, ids: &[i64]) -> AppResult<Vec<User>>;
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()>;
    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()>;
    async fn ensure_exists(&self, id: i64) -> AppResult<()>;
}

pub fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User with id={id} not found"))
}

/// SQLite-backed user store
pub struct SqliteUserStore {
    pool: DbPool,
}

impl SqliteUserStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteUserStore { pool }
    }

    fn user_from_row(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            login: row.get(2)?,
            name: row.get(3)?,
            birthday: row.get(4)?,
            friends: BTreeSet::new(),
        })
    }

    fn friend_ids(conn: &Connection, id: i64) -> AppResult<BTreeSet<i64>> {
        let mut stmt = conn.prepare("SELECT friend_id FROM friendships WHERE user_id = ?1")?;
        let ids = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<BTreeSet<i64>, _>>()?;
        Ok(ids)
    }

    fn load_user(conn: &Connection, id: i64) -> AppResult<User> {
        let mut user = conn
            .query_row(
                "SELECT id, email, login, name, birthday FROM users WHERE id = ?1",
                params![id],
                Self::user_from_row,
            )
            .optional()?
            .ok_or_else(|| user_not_found(id))?;
        user.friends = Self::friend_ids(conn, id)?;
        Ok(user)
    }

    fn require_user(conn: &Connection, id: i64) -> AppResult<()> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(user_not_found(id))
        }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create(&self, user: &UserDraft) -> AppResult<User> {
        let conn = self.pool.lock().await;

        conn.execute(
            "INSERT INTO users (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4)",
            params![user.email, user.login, user.display_name(), user.birthday],
        )?;

        Self::load_user(&conn, conn.last_insert_rowid())
    }

    async fn update(&self, id: i64, user: &UserDraft) -> AppResult<User> {
        let conn = self.pool.lock().await;
        let name = user.has_name().then(|| user.display_name());

        let changed = conn.execute(
            "UPDATE users SET email = ?1, login = ?2, name = COALESCE(?3, name), birthday = ?4 WHERE id = ?5",
            params![user.email, user.login, name, user.birthday, id],
        )?;
        if changed == 0 {
            return Err(user_not_found(id));
        }

        Self::load_user(&conn, id)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut conn = self.pool.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM friendships WHERE user_id = ?1 OR friend_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM film_likes WHERE user_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(user_not_found(id));
        }

        tx.commit()?;
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<User> {
        let conn = self.pool.lock().await;
        Self::load_user(&conn, id)
    }

    async fn get_many(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        let conn = self.pool.lock().await;
        ids.iter().map(|id| Self::load_user(&conn, *id)).collect()
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let conn = self.pool.lock().await;

        let mut stmt =
            conn.prepare("SELECT id, email, login, name, birthday FROM users ORDER BY id")?;
        let mut users = stmt
            .query_map([], Self::user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for user in &mut users {
            user.friends = Self::friend_ids(&conn, user.id)?;
        }

        Ok(users)
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        let mut conn = self.pool.lock().await;
        let tx = conn.transaction()?;

        Self::require_user(&tx, user_id)?;
        Self::require_user(&tx, friend_id)?;
        tx.execute(
            "INSERT OR IGNORE INTO friendships (user_id, friend_id) VALUES (?1, ?2), (?2, ?1)",
            params![user_id, friend_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        let mut conn = self.pool.lock().await;
        let tx = conn.transaction()?;

        Self::require_user(&tx, user_id)?;
        Self::require_user(&tx, friend_id)?;
        tx.execute(
            "DELETE FROM friendships WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)",
            params![user_id, friend_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let conn = self.pool.lock().await;
        Self::require_user(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use chrono::NaiveDate;

    fn draft(login: &str, name: Option<&str>) -> UserDraft {
        UserDraft {
            email: format!("{login}@example.com"),
            login: login.to_string(),
            name: name.map(str::to_string),
            birthday: NaiveDate::from_ymd_opt(2000, 8, 20).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_user_defaults_name() {
        let store = SqliteUserStore::new(create_test_pool());
        let user = store
            .create(&draft("common", None))
            .await
            .expect("Failed to create user");

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "common");
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(2000, 8, 20).unwrap());
    }

    #[tokio::test]
    async fn test_update_user() {
        let store = SqliteUserStore::new(create_test_pool());
        let user = store.create(&draft("alice", Some("Alice"))).await.unwrap();

        let renamed = store
            .update(user.id, &draft("alice2", Some("Alicia")))
            .await
            .expect("Failed to update");
        assert_eq!(renamed.login, "alice2");
        assert_eq!(renamed.name, "Alicia");

        let kept = store
            .update(user.id, &draft("alice3", None))
            .await
            .expect("Failed to update");
        assert_eq!(kept.login, "alice3");
        assert_eq!(kept.name, "Alicia");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = SqliteUserStore::new(create_test_pool());
        let result = store.update(77, &draft("ghost", None)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_friendship_is_mutual() {
        let store = SqliteUserStore::new(create_test_pool());
        let a = store.create(&draft("a", None)).await.unwrap();
        let b = store.create(&draft("b", None)).await.unwrap();

        store.add_friend(a.id, b.id).await.expect("Failed to add friend");
        store.add_friend(a.id, b.id).await.expect("Repeated add should not fail");

        assert!(store.get(a.id).await.unwrap().friends.contains(&b.id));
        assert!(store.get(b.id).await.unwrap().friends.contains(&a.id));

        store.remove_friend(b.id, a.id).await.expect("Failed to remove friend");
        assert!(store.get(a.id).await.unwrap().friends.is_empty());
        assert!(store.get(b.id).await.unwrap().friends.is_empty());
    }

    #[tokio::test]
    async fn test_friend_with_missing_user() {
        let store = SqliteUserStore::new(create_test_pool());
        let a = store.create(&draft("a", None)).await.unwrap();

        assert!(matches!(store.add_friend(a.id, 99).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.add_friend(99, a.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.remove_friend(a.id, 99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_friendships() {
        let store = SqliteUserStore::new(create_test_pool());
        let a = store.create(&draft("a", None)).await.unwrap();
        let b = store.create(&draft("b", None)).await.unwrap();
        let c = store.create(&draft("c", None)).await.unwrap();
        store.add_friend(a.id, b.id).await.unwrap();
        store.add_friend(c.id, b.id).await.unwrap();

        store.delete(b.id).await.expect("Failed to delete");

        assert!(matches!(store.get(b.id).await, Err(AppError::NotFound(_))));
        assert!(store.get(a.id).await.unwrap().friends.is_empty());
        assert!(store.get(c.id).await.unwrap().friends.is_empty());
        assert!(matches!(store.delete(b.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_many_and_list() {
        let store = SqliteUserStore::new(create_test_pool());
        let a = store.create(&draft("a", None)).await.unwrap();
        let b = store.create(&draft("b", None)).await.unwrap();

        let users = store.get_many(&[b.id, a.id]).await.unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(matches!(store.get_many(&[a.id, 42]).await, Err(AppError::NotFound(_))));
    }
}

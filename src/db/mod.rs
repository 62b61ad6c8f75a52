/// Database layer for persistent storage.
/// Exposes one store trait per entity with SQLite and in-memory backends.

pub mod film_store;
pub mod genre_store;
pub mod init;
pub mod memory;
pub mod models;
pub mod mpa_store;
pub mod user_store;

pub use film_store::{FilmStore, SqliteFilmStore};
pub use genre_store::{GenreStore, SqliteGenreStore};
pub use memory::MemoryStore;
pub use mpa_store::{MpaStore, SqliteMpaStore};
pub use user_store::{SqliteUserStore, UserStore};

use rusqlite::{Connection, Result as SqliteResult};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type DbPool = Arc<Mutex<Connection>>;

/// Create a connection pool (simplified for single-threaded SQLite)
pub fn create_pool(db_path: &str) -> SqliteResult<DbPool> {
    let conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}

/// One handle per entity store, all backed by the same storage
#[derive(Clone)]
pub struct Stores {
    pub films: Arc<dyn FilmStore>,
    pub users: Arc<dyn UserStore>,
    pub genres: Arc<dyn GenreStore>,
    pub mpa: Arc<dyn MpaStore>,
}

impl Stores {
    pub fn sqlite(pool: DbPool) -> Self {
        Stores {
            films: Arc::new(SqliteFilmStore::new(pool.clone())),
            users: Arc::new(SqliteUserStore::new(pool.clone())),
            genres: Arc::new(SqliteGenreStore::new(pool.clone())),
            mpa: Arc::new(SqliteMpaStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Stores {
            films: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            genres: Arc::new(store.clone()),
            mpa: Arc::new(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::UserDraft;
    use chrono::NaiveDate;

    fn draft() -> UserDraft {
        UserDraft {
            email: "shared@example.com".to_string(),
            login: "shared".to_string(),
            name: None,
            birthday: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_stores_share_pool() {
        let stores = Stores::sqlite(create_test_pool());
        let user = stores.users.create(&draft()).await.expect("Failed to create user");
        assert_eq!(stores.users.get(user.id).await.unwrap().login, "shared");
        assert_eq!(stores.genres.list().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_in_memory_stores_share_state() {
        let stores = Stores::in_memory();
        let user = stores.users.create(&draft()).await.expect("Failed to create user");
        assert!(stores.users.ensure_exists(user.id).await.is_ok());
        assert_eq!(stores.mpa.list().await.unwrap().len(), 5);
    }

    #[test]
    fn test_create_pool_on_disk() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("filmorate.db");
        let pool = create_pool(path.to_str().unwrap()).expect("Failed to create pool");
        assert!(path.exists());
        drop(pool);
    }
}

/// Genre reference data. Read-only apart from the seed written at startup.
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use super::models::Genre;
use super::DbPool;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Genre>>;
    async fn get(&self, id: i64) -> AppResult<Genre>;

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        self.get(id).await.map(|_| ())
    }
}

pub fn genre_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Genre with id={id} not found"))
}

pub struct SqliteGenreStore {
    pool: DbPool,
}

impl SqliteGenreStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteGenreStore { pool }
    }
}

#[async_trait]
impl GenreStore for SqliteGenreStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let conn = self.pool.lock().await;

        let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY id")?;
        let genres = stmt
            .query_map([], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(genres)
    }

    async fn get(&self, id: i64) -> AppResult<Genre> {
        let conn = self.pool.lock().await;

        conn.query_row(
            "SELECT id, name FROM genres WHERE id = ?1",
            params![id],
            |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| genre_not_found(id))
    }
}

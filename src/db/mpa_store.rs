/// MPA rating reference data.
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::models::MpaRating;
use super::DbPool;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait MpaStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<MpaRating>>;
    async fn get(&self, id: i64) -> AppResult<MpaRating>;

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        self.get(id).await.map(|_| ())
    }
}

pub fn mpa_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("MPA rating with id={id} not found"))
}

pub struct SqliteMpaStore {
    pool: DbPool,
}

impl SqliteMpaStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteMpaStore { pool }
    }

    fn rating_from_row(row: &Row) -> rusqlite::Result<MpaRating> {
        Ok(MpaRating {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

#[async_trait]
impl MpaStore for SqliteMpaStore {
    async fn list(&self) -> AppResult<Vec<MpaRating>> {
        let conn = self.pool.lock().await;

        let mut stmt = conn.prepare("SELECT id, name FROM mpa_ratings ORDER BY id")?;
        let ratings = stmt
            .query_map([], Self::rating_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }

    async fn get(&self, id: i64) -> AppResult<MpaRating> {
        let conn = self.pool.lock().await;

        conn.query_row(
            "SELECT id, name FROM mpa_ratings WHERE id = ?1",
            params![id],
            Self::rating_from_row,
        )
        .optional()?
        .ok_or_else(|| mpa_not_found(id))
    }
}

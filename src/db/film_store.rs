/// Film persistence.
/// Defines the `FilmStore` seam used by the film service and its SQLite
/// implementation. Genre links and likes are read back with every film so a
/// returned `Film` is always a complete snapshot.
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

use super::models::{Film, FilmDraft, Genre, MpaRating};
use super::DbPool;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait FilmStore: Send + Sync {
    async fn create(&self, film: &FilmDraft) -> AppResult<Film>;
    /// Overwrite the film's fields and genre links; likes are kept, as is the
    /// rating when the draft names none
    async fn update(&self, id: i64, film: &FilmDraft) -> AppResult<Film>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn get(&self, id: i64) -> AppResult<Film>;
    async fn list(&self) -> AppResult<Vec<Film>>;
    /// Films ordered by like count descending, then id ascending, at most `count`
    async fn popular(&self, count: usize) -> AppResult<Vec<Film>>;
    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()>;
    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()>;
    async fn ensure_exists(&self, id: i64) -> AppResult<()>;
}

/// Order films by like count (descending) with ties broken by ascending id,
/// keeping at most `count` of them
pub fn rank_by_likes(mut films: Vec<Film>, count: usize) -> Vec<Film> {
    films.sort_by(|a, b| b.like_count().cmp(&a.like_count()).then(a.id.cmp(&b.id)));
    films.truncate(count);
    films
}

pub fn film_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Film with id={id} not found"))
}

const SELECT_FILM: &str = "SELECT f.id, f.name, f.description, f.release_date, f.duration, f.mpa_id, m.name
     FROM films f LEFT JOIN mpa_ratings m ON f.mpa_id = m.id";

/// SQLite-backed film store
pub struct SqliteFilmStore {
    pool: DbPool,
}

impl SqliteFilmStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteFilmStore { pool }
    }

    fn film_from_row(row: &Row) -> rusqlite::Result<Film> {
        let mpa_id: Option<i64> = row.get(5)?;
        let mpa_name: Option<String> = row.get(6)?;

        Ok(Film {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            release_date: row.get(3)?,
            duration: row.get(4)?,
            genres: Vec::new(),
            mpa: mpa_id.zip(mpa_name).map(|(id, name)| MpaRating { id, name }),
            likes: BTreeSet::new(),
        })
    }

    /// Fill in genre links (in stored order) and likes for a film row
    fn attach_relations(conn: &Connection, film: &mut Film) -> AppResult<()> {
        let mut genre_stmt = conn.prepare(
            "SELECT g.id, g.name FROM film_genres fg JOIN genres g ON fg.genre_id = g.id
             WHERE fg.film_id = ?1 ORDER BY fg.position",
        )?;
        film.genres = genre_stmt
            .query_map(params![film.id], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut like_stmt = conn.prepare("SELECT user_id FROM film_likes WHERE film_id = ?1")?;
        film.likes = like_stmt
            .query_map(params![film.id], |row| row.get(0))?
            .collect::<Result<BTreeSet<i64>, _>>()?;

        Ok(())
    }

    fn load_film(conn: &Connection, id: i64) -> AppResult<Film> {
        let mut film = conn
            .query_row(&format!("{SELECT_FILM} WHERE f.id = ?1"), params![id], Self::film_from_row)
            .optional()?
            .ok_or_else(|| film_not_found(id))?;
        Self::attach_relations(conn, &mut film)?;
        Ok(film)
    }

    fn load_films(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> AppResult<Vec<Film>> {
        let mut stmt = conn.prepare(sql)?;
        let mut films = stmt
            .query_map(params, Self::film_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for film in &mut films {
            Self::attach_relations(conn, film)?;
        }
        Ok(films)
    }

    fn replace_genres(conn: &Connection, film_id: i64, genre_ids: &[i64]) -> AppResult<()> {
        conn.execute("DELETE FROM film_genres WHERE film_id = ?1", params![film_id])?;
        let mut stmt =
            conn.prepare("INSERT OR IGNORE INTO film_genres (film_id, genre_id, position) VALUES (?1, ?2, ?3)")?;
        for (position, genre_id) in genre_ids.iter().enumerate() {
            stmt.execute(params![film_id, genre_id, position as i64])?;
        }
        Ok(())
    }

    fn film_exists(conn: &Connection, id: i64) -> AppResult<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM films WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

#[async_trait]
impl FilmStore for SqliteFilmStore {
    async fn create(&self, film: &FilmDraft) -> AppResult<Film> {
        let mut conn = self.pool.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO films (name, description, release_date, duration, mpa_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![film.name, film.description, film.release_date, film.duration, film.mpa_id],
        )?;
        let id = tx.last_insert_rowid();
        Self::replace_genres(&tx, id, &film.genre_ids)?;

        let created = Self::load_film(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    async fn update(&self, id: i64, film: &FilmDraft) -> AppResult<Film> {
        let mut conn = self.pool.lock().await;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE films SET name = ?1, description = ?2, release_date = ?3, duration = ?4, mpa_id = COALESCE(?5, mpa_id) WHERE id = ?6",
            params![film.name, film.description, film.release_date, film.duration, film.mpa_id, id],
        )?;
        if changed == 0 {
            return Err(film_not_found(id));
        }
        Self::replace_genres(&tx, id, &film.genre_ids)?;

        let updated = Self::load_film(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut conn = self.pool.lock().await;
        let tx = conn.transaction()?;

        // Link rows also cascade, but are cleared explicitly for databases
        // opened without foreign key enforcement.
        tx.execute("DELETE FROM film_genres WHERE film_id = ?1", params![id])?;
        tx.execute("DELETE FROM film_likes WHERE film_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM films WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(film_not_found(id));
        }

        tx.commit()?;
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<Film> {
        let conn = self.pool.lock().await;
        Self::load_film(&conn, id)
    }

    async fn list(&self) -> AppResult<Vec<Film>> {
        let conn = self.pool.lock().await;
        Self::load_films(&conn, &format!("{SELECT_FILM} ORDER BY f.id"), [])
    }

    async fn popular(&self, count: usize) -> AppResult<Vec<Film>> {
        let conn = self.pool.lock().await;
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        Self::load_films(
            &conn,
            "SELECT f.id, f.name, f.description, f.release_date, f.duration, f.mpa_id, m.name
             FROM films f
             LEFT JOIN mpa_ratings m ON f.mpa_id = m.id
             LEFT JOIN film_likes fl ON fl.film_id = f.id
             GROUP BY f.id
             ORDER BY COUNT(fl.user_id) DESC, f.id ASC
             LIMIT ?1",
            params![limit],
        )
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let conn = self.pool.lock().await;
        if !Self::film_exists(&conn, film_id)? {
            return Err(film_not_found(film_id));
        }
        conn.execute(
            "INSERT OR IGNORE INTO film_likes (film_id, user_id) VALUES (?1, ?2)",
            params![film_id, user_id],
        )?;
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let conn = self.pool.lock().await;
        if !Self::film_exists(&conn, film_id)? {
            return Err(film_not_found(film_id));
        }
        conn.execute(
            "DELETE FROM film_likes WHERE film_id = ?1 AND user_id = ?2",
            params![film_id, user_id],
        )?;
        Ok(())
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let conn = self.pool.lock().await;
        if Self::film_exists(&conn, id)? {
            Ok(())
        } else {
            Err(film_not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use chrono::NaiveDate;

    fn draft(name: &str) -> FilmDraft {
        FilmDraft {
            name: name.to_string(),
            description: Some("adipisicing".to_string()),
            release_date: NaiveDate::from_ymd_opt(1967, 3, 25).unwrap(),
            duration: 100,
            genre_ids: vec![],
            mpa_id: None,
        }
    }

    async fn insert_user(pool: &DbPool, login: &str) -> i64 {
        let conn = pool.lock().await;
        conn.execute(
            "INSERT INTO users (email, login, name, birthday) VALUES (?1, ?2, ?2, '1990-01-01')",
            params![format!("{login}@example.com"), login],
        )
        .expect("Failed to insert user");
        conn.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_create_film() {
        let store = SqliteFilmStore::new(create_test_pool());
        let film = store
            .create(&FilmDraft {
                genre_ids: vec![2, 1],
                mpa_id: Some(3),
                ..draft("nisi eiusmod")
            })
            .await
            .expect("Failed to create film");

        assert_eq!(film.id, 1);
        assert_eq!(film.name, "nisi eiusmod");
        assert_eq!(film.release_date, NaiveDate::from_ymd_opt(1967, 3, 25).unwrap());
        assert_eq!(film.mpa.as_ref().map(|m| m.name.as_str()), Some("PG-13"));
        let genre_ids: Vec<i64> = film.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![2, 1]);
        assert!(film.likes.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_genres_and_keeps_likes() {
        let pool = create_test_pool();
        let store = SqliteFilmStore::new(pool.clone());
        let user_id = insert_user(&pool, "alice").await;
        let film = store
            .create(&FilmDraft {
                genre_ids: vec![1, 2],
                ..draft("Before")
            })
            .await
            .expect("Failed to create film");
        store.add_like(film.id, user_id).await.expect("Failed to like");

        let updated = store
            .update(
                film.id,
                &FilmDraft {
                    genre_ids: vec![4],
                    mpa_id: Some(1),
                    ..draft("Anna")
                },
            )
            .await
            .expect("Failed to update film");

        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.genres, vec![Genre { id: 4, name: "Thriller".to_string() }]);
        assert_eq!(updated.mpa.map(|m| m.id), Some(1));
        assert!(updated.likes.contains(&user_id));
    }

    #[tokio::test]
    async fn test_update_without_mpa_keeps_rating() {
        let store = SqliteFilmStore::new(create_test_pool());
        let film = store
            .create(&FilmDraft { mpa_id: Some(3), ..draft("Rated") })
            .await
            .expect("Failed to create film");

        let updated = store
            .update(film.id, &draft("Still rated"))
            .await
            .expect("Failed to update film");
        assert_eq!(updated.name, "Still rated");
        assert_eq!(updated.mpa.map(|m| m.name), Some("PG-13".to_string()));
    }

    #[tokio::test]
    async fn test_repeated_genre_ids_stored_once() {
        let store = SqliteFilmStore::new(create_test_pool());
        let film = store
            .create(&FilmDraft { genre_ids: vec![2, 1, 2], ..draft("Twice") })
            .await
            .expect("Repeated genre ids should not fail the insert");

        let genre_ids: Vec<i64> = film.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_update_missing_film() {
        let store = SqliteFilmStore::new(create_test_pool());
        let result = store.update(42, &draft("Ghost")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_nonexistent_film() {
        let store = SqliteFilmStore::new(create_test_pool());
        assert!(matches!(store.get(9).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.ensure_exists(9).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_film_clears_likes() {
        let pool = create_test_pool();
        let store = SqliteFilmStore::new(pool.clone());
        let user_id = insert_user(&pool, "bob").await;
        let film = store.create(&draft("Doomed")).await.expect("Failed to create");
        store.add_like(film.id, user_id).await.expect("Failed to like");

        store.delete(film.id).await.expect("Failed to delete");

        assert!(matches!(store.get(film.id).await, Err(AppError::NotFound(_))));
        let conn = pool.lock().await;
        let likes: i64 = conn
            .query_row("SELECT COUNT(*) FROM film_likes", [], |row| row.get(0))
            .expect("Query failed");
        assert_eq!(likes, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_film() {
        let store = SqliteFilmStore::new(create_test_pool());
        assert!(matches!(store.delete(3).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_likes_are_idempotent() {
        let pool = create_test_pool();
        let store = SqliteFilmStore::new(pool.clone());
        let user_id = insert_user(&pool, "carol").await;
        let film = store.create(&draft("Liked")).await.expect("Failed to create");

        store.add_like(film.id, user_id).await.expect("Failed to like");
        store.add_like(film.id, user_id).await.expect("Second like should not fail");
        assert_eq!(store.get(film.id).await.unwrap().like_count(), 1);

        store.remove_like(film.id, user_id).await.expect("Failed to unlike");
        store.remove_like(film.id, user_id).await.expect("Second unlike should not fail");
        assert_eq!(store.get(film.id).await.unwrap().like_count(), 0);
    }

    #[tokio::test]
    async fn test_like_missing_film() {
        let pool = create_test_pool();
        let store = SqliteFilmStore::new(pool.clone());
        let user_id = insert_user(&pool, "dave").await;
        assert!(matches!(store.add_like(5, user_id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.remove_like(5, user_id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_popular_orders_by_likes_then_id() {
        let pool = create_test_pool();
        let store = SqliteFilmStore::new(pool.clone());
        let users = [
            insert_user(&pool, "u1").await,
            insert_user(&pool, "u2").await,
            insert_user(&pool, "u3").await,
        ];
        let a = store.create(&draft("A")).await.unwrap();
        let b = store.create(&draft("B")).await.unwrap();
        let c = store.create(&draft("C")).await.unwrap();
        let d = store.create(&draft("D")).await.unwrap();

        for user in users {
            store.add_like(c.id, user).await.unwrap();
        }
        store.add_like(b.id, users[0]).await.unwrap();
        store.add_like(d.id, users[1]).await.unwrap();

        let ids: Vec<i64> = store.popular(10).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![c.id, b.id, d.id, a.id]);

        let top2: Vec<i64> = store.popular(2).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(top2, vec![c.id, b.id]);
    }

    #[test]
    fn test_rank_by_likes() {
        let film = |id: i64, likes: &[i64]| Film {
            id,
            name: format!("film{id}"),
            description: None,
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            duration: 90,
            genres: vec![],
            mpa: None,
            likes: likes.iter().copied().collect(),
        };
        let ranked = rank_by_likes(
            vec![film(1, &[]), film(2, &[1]), film(3, &[1, 2]), film(4, &[2])],
            3,
        );
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 4]);
    }
}

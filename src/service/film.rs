/// Film operations: validated create/update, likes and the popularity ranking.
use crate::db::init::DEFAULT_MPA_ID;
use crate::db::models::{Film, FilmDraft};
use crate::db::{FilmStore, GenreStore, MpaStore, UserStore};
use crate::error::AppResult;
use crate::validation::{validate_count, validate_film};
use std::sync::Arc;

#[derive(Clone)]
pub struct FilmService {
    films: Arc<dyn FilmStore>,
    users: Arc<dyn UserStore>,
    genres: Arc<dyn GenreStore>,
    ratings: Arc<dyn MpaStore>,
}

impl FilmService {
    pub fn new(
        films: Arc<dyn FilmStore>,
        users: Arc<dyn UserStore>,
        genres: Arc<dyn GenreStore>,
        ratings: Arc<dyn MpaStore>,
    ) -> Self {
        FilmService {
            films,
            users,
            genres,
            ratings,
        }
    }

    /// Validate and store a new film; a film without a rating is rated G
    pub async fn create(&self, film: FilmDraft) -> AppResult<Film> {
        let mut film = distinct_genres(film);
        film.mpa_id.get_or_insert(DEFAULT_MPA_ID);
        validate_film(&film)?;
        self.check_references(&film).await?;

        let created = self.films.create(&film).await?;
        log::info!("Created film id={} name={:?}", created.id, created.name);
        Ok(created)
    }

    /// Replace a film's fields and genres; an absent rating keeps the stored one
    pub async fn update(&self, id: i64, film: FilmDraft) -> AppResult<Film> {
        let film = distinct_genres(film);
        validate_film(&film)?;
        self.films.ensure_exists(id).await?;
        self.check_references(&film).await?;

        let updated = self.films.update(id, &film).await?;
        log::info!("Updated film id={}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.films.delete(id).await?;
        log::info!("Deleted film id={}", id);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<Film> {
        self.films.get(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Film>> {
        self.films.list().await
    }

    pub async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.films.ensure_exists(film_id).await?;
        self.users.ensure_exists(user_id).await?;
        self.films.add_like(film_id, user_id).await?;
        log::info!("User {} liked film {}", user_id, film_id);
        Ok(())
    }

    pub async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.films.ensure_exists(film_id).await?;
        self.users.ensure_exists(user_id).await?;
        self.films.remove_like(film_id, user_id).await?;
        log::info!("User {} removed like from film {}", user_id, film_id);
        Ok(())
    }

    /// Most liked films first, ties by ascending id
    pub async fn popular(&self, count: i64) -> AppResult<Vec<Film>> {
        let count = validate_count(count)?;
        self.films.popular(count).await
    }

    /// Every referenced genre and rating must exist before a film is written
    async fn check_references(&self, film: &FilmDraft) -> AppResult<()> {
        for genre_id in &film.genre_ids {
            self.genres.ensure_exists(*genre_id).await?;
        }
        if let Some(mpa_id) = film.mpa_id {
            self.ratings.ensure_exists(mpa_id).await?;
        }
        Ok(())
    }
}

fn distinct_genres(film: FilmDraft) -> FilmDraft {
    let ids = film.genre_ids.clone();
    film.with_genres(ids)
}

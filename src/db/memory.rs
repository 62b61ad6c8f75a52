/// In-memory storage backend.
/// Implements every store trait over one shared state so that cross-entity
/// cleanup (a deleted user's likes and friendships) stays consistent. Values
/// are cloned out on every read; callers never hold references into the maps.
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::film_store::{film_not_found, rank_by_likes, FilmStore};
use super::genre_store::{genre_not_found, GenreStore};
use super::init::{GENRES, MPA_RATINGS};
use super::models::{Film, FilmDraft, Genre, MpaRating, User, UserDraft};
use super::mpa_store::{mpa_not_found, MpaStore};
use super::user_store::{user_not_found, UserStore};
use crate::error::AppResult;

#[derive(Debug, Default)]
struct MemoryState {
    films: BTreeMap<i64, Film>,
    users: BTreeMap<i64, User>,
    genres: BTreeMap<i64, Genre>,
    ratings: BTreeMap<i64, MpaRating>,
    last_film_id: i64,
    last_user_id: i64,
}

impl MemoryState {
    fn seeded() -> Self {
        let mut state = MemoryState::default();
        for (id, name) in GENRES {
            state.genres.insert(id, Genre { id, name: name.to_string() });
        }
        for (id, name) in MPA_RATINGS {
            state.ratings.insert(id, MpaRating { id, name: name.to_string() });
        }
        state
    }

    /// Genres in the given order, each id at most once
    fn resolve_genres(&self, ids: &[i64]) -> AppResult<Vec<Genre>> {
        let mut seen = BTreeSet::new();
        ids.iter()
            .filter(|id| seen.insert(**id))
            .map(|id| self.genres.get(id).cloned().ok_or_else(|| genre_not_found(*id)))
            .collect()
    }

    fn resolve_rating(&self, id: Option<i64>) -> AppResult<Option<MpaRating>> {
        id.map(|id| self.ratings.get(&id).cloned().ok_or_else(|| mpa_not_found(id)))
            .transpose()
    }

    fn film_mut(&mut self, id: i64) -> AppResult<&mut Film> {
        self.films.get_mut(&id).ok_or_else(|| film_not_found(id))
    }

    fn require_user(&self, id: i64) -> AppResult<&User> {
        self.users.get(&id).ok_or_else(|| user_not_found(id))
    }
}

/// Store backend keeping everything in process memory
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store with the reference genres and ratings loaded
    pub fn new() -> Self {
        MemoryStore {
            state: Arc::new(RwLock::new(MemoryState::seeded())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilmStore for MemoryStore {
    async fn create(&self, film: &FilmDraft) -> AppResult<Film> {
        let mut state = self.state.write().await;
        let genres = state.resolve_genres(&film.genre_ids)?;
        let mpa = state.resolve_rating(film.mpa_id)?;

        state.last_film_id += 1;
        let created = Film {
            id: state.last_film_id,
            name: film.name.clone(),
            description: film.description.clone(),
            release_date: film.release_date,
            duration: film.duration,
            genres,
            mpa,
            likes: BTreeSet::new(),
        };
        state.films.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, film: &FilmDraft) -> AppResult<Film> {
        let mut state = self.state.write().await;
        let genres = state.resolve_genres(&film.genre_ids)?;
        let mpa = state.resolve_rating(film.mpa_id)?;

        let stored = state.film_mut(id)?;
        if mpa.is_some() {
            stored.mpa = mpa;
        }
        stored.name = film.name.clone();
        stored.description = film.description.clone();
        stored.release_date = film.release_date;
        stored.duration = film.duration;
        stored.genres = genres;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.films.remove(&id).map(|_| ()).ok_or_else(|| film_not_found(id))
    }

    async fn get(&self, id: i64) -> AppResult<Film> {
        let state = self.state.read().await;
        state.films.get(&id).cloned().ok_or_else(|| film_not_found(id))
    }

    async fn list(&self) -> AppResult<Vec<Film>> {
        let state = self.state.read().await;
        Ok(state.films.values().cloned().collect())
    }

    async fn popular(&self, count: usize) -> AppResult<Vec<Film>> {
        let state = self.state.read().await;
        Ok(rank_by_likes(state.films.values().cloned().collect(), count))
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.film_mut(film_id)?.likes.insert(user_id);
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.film_mut(film_id)?.likes.remove(&user_id);
        Ok(())
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let state = self.state.read().await;
        if state.films.contains_key(&id) {
            Ok(())
        } else {
            Err(film_not_found(id))
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &UserDraft) -> AppResult<User> {
        let mut state = self.state.write().await;

        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            email: user.email.clone(),
            login: user.login.clone(),
            name: user.display_name().to_string(),
            birthday: user.birthday,
            friends: BTreeSet::new(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, user: &UserDraft) -> AppResult<User> {
        let mut state = self.state.write().await;
        let stored = state.users.get_mut(&id).ok_or_else(|| user_not_found(id))?;

        stored.email = user.email.clone();
        stored.login = user.login.clone();
        if user.has_name() {
            stored.name = user.display_name().to_string();
        }
        stored.birthday = user.birthday;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.users.remove(&id).ok_or_else(|| user_not_found(id))?;

        for other in state.users.values_mut() {
            other.friends.remove(&id);
        }
        for film in state.films.values_mut() {
            film.likes.remove(&id);
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<User> {
        let state = self.state.read().await;
        state.require_user(id).cloned()
    }

    async fn get_many(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        ids.iter().map(|id| state.require_user(*id).cloned()).collect()
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().cloned().collect())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.require_user(friend_id)?;

        if let Some(user) = state.users.get_mut(&user_id) {
            user.friends.insert(friend_id);
        }
        if let Some(friend) = state.users.get_mut(&friend_id) {
            friend.friends.insert(user_id);
        }
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.require_user(friend_id)?;

        if let Some(user) = state.users.get_mut(&user_id) {
            user.friends.remove(&friend_id);
        }
        if let Some(friend) = state.users.get_mut(&friend_id) {
            friend.friends.remove(&user_id);
        }
        Ok(())
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let state = self.state.read().await;
        state.require_user(id).map(|_| ())
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let state = self.state.read().await;
        Ok(state.genres.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> AppResult<Genre> {
        let state = self.state.read().await;
        state.genres.get(&id).cloned().ok_or_else(|| genre_not_found(id))
    }
}

#[async_trait]
impl MpaStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<MpaRating>> {
        let state = self.state.read().await;
        Ok(state.ratings.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> AppResult<MpaRating> {
        let state = self.state.read().await;
        state.ratings.get(&id).cloned().ok_or_else(|| mpa_not_found(id))
    }
}

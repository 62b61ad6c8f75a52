/// Request/response bodies and their mapping to the storage models.
/// Field names are camelCase on the wire; dates are `YYYY-MM-DD`.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::{Film, FilmDraft, Genre, MpaRating, User, UserDraft};
use crate::error::{AppError, AppResult};

/// Reference to a genre or rating by id; any other fields are ignored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i32,
    #[serde(default)]
    pub mpa: Option<IdRef>,
    #[serde(default)]
    pub genres: Option<Vec<IdRef>>,
}

impl FilmRequest {
    pub fn require_id(&self) -> AppResult<i64> {
        self.id.ok_or_else(|| {
            log::warn!("Rejected film update without id");
            AppError::Validation("Film id is required for update".to_string())
        })
    }

    pub fn into_draft(self) -> FilmDraft {
        let genre_ids = self.genres.unwrap_or_default().into_iter().map(|g| g.id);
        FilmDraft {
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            genre_ids: Vec::new(),
            mpa_id: self.mpa.map(|m| m.id),
        }
        .with_genres(genre_ids)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilmResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub mpa: Option<MpaRating>,
}

impl From<Film> for FilmResponse {
    fn from(film: Film) -> Self {
        FilmResponse {
            id: film.id,
            name: film.name,
            description: film.description,
            release_date: film.release_date,
            duration: film.duration,
            genres: film.genres,
            mpa: film.mpa,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

impl UserRequest {
    pub fn require_id(&self) -> AppResult<i64> {
        self.id.ok_or_else(|| {
            log::warn!("Rejected user update without id");
            AppError::Validation("User id is required for update".to_string())
        })
    }

    pub fn into_draft(self) -> UserDraft {
        UserDraft {
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            login: user.login,
            name: user.name,
            birthday: user.birthday,
        }
    }
}

pub fn film_responses(films: Vec<Film>) -> Vec<FilmResponse> {
    films.into_iter().map(FilmResponse::from).collect()
}

pub fn user_responses(users: Vec<User>) -> Vec<UserResponse> {
    users.into_iter().map(UserResponse::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<i64>,
}

pub const DEFAULT_POPULAR_COUNT: i64 = 10;

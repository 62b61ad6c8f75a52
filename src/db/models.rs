/// Data models for the storage layer.
/// Represents films, users and the genre / MPA reference entities, plus the
/// drafts services hand to stores on create and update.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MpaRating {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Film {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub mpa: Option<MpaRating>,
    pub likes: BTreeSet<i64>,
}

impl Film {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Film fields supplied by a client on create or update.
/// Genre ids are kept in request order with duplicates already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmDraft {
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub genre_ids: Vec<i64>,
    pub mpa_id: Option<i64>,
}

impl FilmDraft {
    /// Replace the genre list, dropping repeated ids but keeping first-seen order
    pub fn with_genres(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        let mut seen = BTreeSet::new();
        self.genre_ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
    pub friends: BTreeSet<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

impl UserDraft {
    /// Name to persist: the given name unless blank, then the login
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }

    /// Fill a blank or absent name with the login
    pub fn with_default_name(mut self) -> Self {
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            self.name = Some(self.login.clone());
        }
        self
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// HTTP handlers module
/// Provides the REST endpoints for films, users, genres and MPA ratings

pub mod catalog;
pub mod dto;
pub mod films;
pub mod users;

pub use catalog::{get_genre, get_mpa, list_genres, list_mpa};
pub use films::{
    add_like, create_film, delete_film, get_film, list_films, popular_films, remove_like,
    update_film,
};
pub use users::{
    add_friend, common_friends, create_user, delete_user, get_user, list_friends, list_users,
    remove_friend, update_user,
};

use actix_web::{HttpResponse, Result as ActixResult};
use serde_json::json;

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}

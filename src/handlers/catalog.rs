/// Read-only handlers for the genre and MPA rating vocabularies.
use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::service::{GenreService, MpaService};

/// GET /genres
pub async fn list_genres(service: web::Data<GenreService>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.list().await?))
}

/// GET /genres/:id
pub async fn get_genre(
    service: web::Data<GenreService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.get(id.into_inner()).await?))
}

/// GET /mpa
pub async fn list_mpa(service: web::Data<MpaService>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.list().await?))
}

/// GET /mpa/:id
pub async fn get_mpa(
    service: web::Data<MpaService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.get(id.into_inner()).await?))
}
